use crate::{RawReading, SensorId};

/// Source of raw capacitance measurements
///
/// Implementations drive the physical charge / discharge of a pad and must
/// return within bounded time, saturating rather than blocking when no
/// definite reading is obtained.
pub trait Measure {
    /// Take one measurement of `sensor`
    fn measure(&mut self, sensor: SensorId) -> RawReading;

    /// Wait between consecutive calibration samples of the same sensor
    fn settle(&mut self) {}
}

impl<M: Measure + ?Sized> Measure for &mut M {
    fn measure(&mut self, sensor: SensorId) -> RawReading {
        (**self).measure(sensor)
    }

    fn settle(&mut self) {
        (**self).settle()
    }
}
