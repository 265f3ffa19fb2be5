#![no_main]
#![no_std]

use core::sync::atomic::{AtomicU32, Ordering};
use cortex_m;
use cortex_m_rt::{entry, exception};
use log::{error, info, LevelFilter};
use panic_halt as _;

use stm32f0xx_hal as hal;

use keyscan::event::EventBuffer;
use keyscan::{KeyEventKind, ScanConfig, Scanner, DISCHARGE_CONFIG};

use crate::discharge::{DischargePads, Pad, Port};
use crate::hal::pac;
use crate::hal::pac::interrupt;
use crate::hal::prelude::*;

mod discharge;
mod logger;
mod serial;

const KEY_COUNT: usize = 12;

/// Scan period, in SysTick ms
const SCAN_PERIOD: u32 = 1;

/// Time for the pads to settle after power-on before the first calibration (~100 ms)
const POWER_ON_SETTLE_CYCLES: u32 = 4_800_000;

static KEY_PADS: [Pad; KEY_COUNT] = [
    Pad { port: Port::A, pin: 0 },  // Key 0
    Pad { port: Port::A, pin: 1 },  // Key 1
    Pad { port: Port::A, pin: 2 },  // Key 2
    Pad { port: Port::A, pin: 3 },  // Key 3
    Pad { port: Port::A, pin: 4 },  // Key 4
    Pad { port: Port::A, pin: 5 },  // Key 5
    Pad { port: Port::A, pin: 6 },  // Key 6
    Pad { port: Port::A, pin: 7 },  // Key 7
    Pad { port: Port::B, pin: 0 },  // Key 8
    Pad { port: Port::B, pin: 1 },  // Key 9
    Pad { port: Port::B, pin: 10 }, // Key 10
    Pad { port: Port::B, pin: 11 }, // Key 11
];

static SCAN_CONFIG: ScanConfig = DISCHARGE_CONFIG;

static TIME: AtomicU32 = AtomicU32::new(0);

#[entry]
fn main() -> ! {
    let dp = pac::Peripherals::take().unwrap();
    let cp = cortex_m::Peripherals::take().unwrap();

    let mut flash = dp.FLASH;
    let mut rcc = dp.RCC.configure().sysclk(48.mhz()).freeze(&mut flash);
    let gpioa = dp.GPIOA.split(&mut rcc);
    let gpiob = dp.GPIOB.split(&mut rcc);

    // A library requiring a critical section to set a gpio mode register is bad and I just won't.
    let fake_cs = unsafe { cortex_m::interrupt::CriticalSection::new() };

    // Key pads rest as floating inputs between measurements
    let _k0 = gpioa.pa0.into_floating_input(&fake_cs);
    let _k1 = gpioa.pa1.into_floating_input(&fake_cs);
    let _k2 = gpioa.pa2.into_floating_input(&fake_cs);
    let _k3 = gpioa.pa3.into_floating_input(&fake_cs);
    let _k4 = gpioa.pa4.into_floating_input(&fake_cs);
    let _k5 = gpioa.pa5.into_floating_input(&fake_cs);
    let _k6 = gpioa.pa6.into_floating_input(&fake_cs);
    let _k7 = gpioa.pa7.into_floating_input(&fake_cs);
    let _k8 = gpiob.pb0.into_floating_input(&fake_cs);
    let _k9 = gpiob.pb1.into_floating_input(&fake_cs);
    let _k10 = gpiob.pb10.into_floating_input(&fake_cs);
    let _k11 = gpiob.pb11.into_floating_input(&fake_cs);

    let tx_pin = gpiob.pb6.into_alternate_af0(&fake_cs);
    let rx_pin = gpiob.pb7.into_alternate_af0(&fake_cs);
    let uart = hal::serial::Serial::usart1(dp.USART1, (tx_pin, rx_pin), 115200.bps(), &mut rcc);
    serial::uart1::init(uart, 4);
    logger::init(LevelFilter::Info);

    let mut syst = hal::timers::Timer::syst(cp.SYST, 1.khz(), &mut rcc);
    syst.listen(&hal::timers::Event::TimeOut);

    cortex_m::asm::delay(POWER_ON_SETTLE_CYCLES);

    let pads = DischargePads::new(&KEY_PADS, SCAN_CONFIG.reading_ceiling);
    let mut scanner: Scanner<_, KEY_COUNT> = match Scanner::new(Some(&SCAN_CONFIG), pads) {
        Ok(scanner) => scanner,
        Err(e) => {
            error!("bad scan config: {}", e);
            panic!();
        }
    };
    info!("scanning {} keys", KEY_COUNT);

    let mut events: EventBuffer<KEY_COUNT> = EventBuffer::new();
    let mut last_scan = TIME.load(Ordering::Relaxed);

    loop {
        let time = TIME.load(Ordering::Relaxed);
        if time.wrapping_sub(last_scan) < SCAN_PERIOD {
            continue;
        }
        last_scan = time;

        events.clear();
        scanner.scan(&mut events);

        for event in events.iter() {
            match event.kind() {
                KeyEventKind::Press => info!("press {}", event.sensor.0),
                KeyEventKind::Release => info!("release {}", event.sensor.0),
            }
        }
    }
}

#[exception]
fn SysTick() {
    let time = TIME.load(Ordering::Relaxed);
    TIME.store(time.wrapping_add(1), Ordering::Relaxed);
}
