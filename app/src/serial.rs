/// An IRQ driven, transmit-only serial port
///
/// Bytes are queued by the writer and drained by the USART1 interrupt, so
/// logging from the scan loop never waits on the line.
pub mod uart1 {
    use core::cell::RefCell;
    use cortex_m::interrupt::Mutex;
    use heapless::spsc::{Consumer, Producer, Queue};

    use crate::interrupt;
    use crate::hal::{
        pac,
        prelude::*,
        serial::{
            Event,
            Serial,
        }
    };
    use stm32f0xx_hal::gpio::{
        gpiob,
        Alternate,
        AF0,
    };

    const TX_Q_SIZE: usize = 512;

    type TxPinType = gpiob::PB6<Alternate<AF0>>;
    type RxPinType = gpiob::PB7<Alternate<AF0>>;
    pub type Uart1 = Serial<pac::USART1, TxPinType, RxPinType>;

    struct Port {
        serial: Uart1,
        tx_producer: Producer<'static, u8, TX_Q_SIZE>,
        tx_consumer: Consumer<'static, u8, TX_Q_SIZE>,
    }

    static PORT: Mutex<RefCell<Option<Port>>> = Mutex::new(RefCell::new(None));

    pub struct Uart1Tx {}

    impl core::fmt::Write for Uart1Tx {
        fn write_str(&mut self, s: &str) -> Result<(), core::fmt::Error> {
            cortex_m::interrupt::free(|cs| {
                if let Some(port) = PORT.borrow(cs).borrow_mut().as_mut() {
                    for b in s.bytes() {
                        // Drop the rest of the string if the queue is full
                        if port.tx_producer.enqueue(b).is_err() {
                            break;
                        }
                    }
                    port.serial.listen(Event::Txe);
                }
            });
            Ok(())
        }
    }

    /// Must be called once during application initialization. Later calls are ignored.
    pub fn init(serial: Uart1, irq_prio: u8) {
        let queue = match cortex_m::singleton!(: Queue<u8, TX_Q_SIZE> = Queue::new()) {
            Some(q) => q,
            None => return,
        };
        let (tx_producer, tx_consumer) = queue.split();

        cortex_m::interrupt::free(|cs| {
            PORT.borrow(cs).replace(Some(Port {
                serial,
                tx_producer,
                tx_consumer,
            }));
        });

        let core = unsafe { pac::CorePeripherals::steal() };
        let mut nvic = core.NVIC;
        unsafe {
            nvic.set_priority(pac::Interrupt::USART1, irq_prio);
            pac::NVIC::unmask(pac::Interrupt::USART1);
        }
    }

    pub fn writer() -> Uart1Tx {
        Uart1Tx {}
    }

    #[interrupt]
    fn USART1() {
        cortex_m::interrupt::free(|cs| {
            let mut port_cell = PORT.borrow(cs).borrow_mut();
            let port = match port_cell.as_mut() {
                Some(port) => port,
                None => return,
            };
            let usart1 = unsafe { pac::Peripherals::steal().USART1 };

            // Check if there is room to transmit a byte
            if usart1.isr.read().txe().bit_is_set() {
                match port.tx_consumer.dequeue() {
                    Some(b) => {
                        port.serial.write(b).ok();
                    },
                    None => {
                        // Queue drained. TXE is unmasked again by the next write.
                        port.serial.unlisten(Event::Txe);
                    }
                }
            }
        });
    }
}
