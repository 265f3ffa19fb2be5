//! Capacitance measurement by GPIO discharge timing.
//!
//! Each key is a bare copper pad on a GPIO pin. To measure it, the pin is
//! driven high long enough to charge the pad, then released to a floating
//! input, and the number of polling iterations until it reads low is the
//! measurement. A finger adds a path to ground and shortens the discharge.
//!
//! The HAL has no runtime mode switching for its typed pins, so the mode
//! register is written directly.

use cortex_m::asm;
use keyscan::{Measure, RawReading, SensorId};

use crate::hal::pac;

/// ~10 us at 48 MHz
const CHARGE_CYCLES: u32 = 480;
/// ~100 us at 48 MHz
const SETTLE_CYCLES: u32 = 4_800;

#[derive(Clone, Copy, Debug)]
pub enum Port {
    A,
    B,
}

#[derive(Clone, Copy, Debug)]
pub struct Pad {
    pub port: Port,
    pub pin: u8,
}

/// Run `$body` with `$regs` bound to the register block of `$port`
///
/// The PAC gives port A its own register block type, so each arm is typed
/// separately.
macro_rules! with_port {
    ($port:expr, $regs:ident => $body:expr) => {
        match $port {
            Port::A => {
                let $regs = unsafe { &*pac::GPIOA::ptr() };
                $body
            }
            Port::B => {
                let $regs = unsafe { &*pac::GPIOB::ptr() };
                $body
            }
        }
    };
}

pub struct DischargePads<const N: usize> {
    pads: &'static [Pad; N],
    timeout: RawReading,
}

impl<const N: usize> DischargePads<N> {
    /// `timeout` is the saturation count; a pad still high after that many
    /// polls reads as `timeout`.
    pub fn new(pads: &'static [Pad; N], timeout: RawReading) -> Self {
        Self { pads, timeout }
    }
}

impl<const N: usize> Measure for DischargePads<N> {
    fn measure(&mut self, sensor: SensorId) -> RawReading {
        let pad = match self.pads.get(sensor.index()) {
            Some(pad) => *pad,
            None => return self.timeout,
        };
        let bit: u32 = 1 << pad.pin;
        let mode_mask: u32 = 0b11 << (2 * pad.pin);
        let output_mode: u32 = 0b01 << (2 * pad.pin);
        let timeout = self.timeout;

        with_port!(pad.port, regs => {
            // Charge
            regs.moder.modify(|r, w| unsafe { w.bits((r.bits() & !mode_mask) | output_mode) });
            regs.bsrr.write(|w| unsafe { w.bits(bit) });
            asm::delay(CHARGE_CYCLES);

            // Release and time the discharge
            regs.moder.modify(|r, w| unsafe { w.bits(r.bits() & !mode_mask) });
            let mut count: RawReading = 0;
            while regs.idr.read().bits() & bit != 0 && count < timeout {
                count += 1;
                asm::nop();
                asm::nop();
                asm::nop();
                asm::nop();
            }
            count
        })
    }

    fn settle(&mut self) {
        asm::delay(SETTLE_CYCLES);
    }
}
