#![cfg_attr(not(test), no_std)]

//! Capacitive key scanning.
//!
//! Turns per-sensor capacitance measurements into debounced press / release
//! events: baselines are calibrated at startup (and optionally on a fixed
//! cadence), every scan cycle each sensor is classified against its baseline,
//! and a run-length debounce filter confirms transitions before they are
//! reported.
//!
//! The platform supplies measurements through [`Measure`] and receives events
//! through [`EventSink`]; [`Scanner`] owns everything in between.

pub mod calibrate;
pub mod classify;
pub mod debounce;
pub mod event;
pub mod scanner;
pub mod schedule;
pub mod sensor;

pub use calibrate::Baseline;
pub use event::{EventSink, KeyEvent, KeyEventKind};
pub use scanner::Scanner;
pub use sensor::Measure;

/// A single capacitance measurement. Larger means longer charge / discharge time.
pub type RawReading = u16;

/// Index of a sensor, in physical scan order
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SensorId(pub u16);

impl SensorId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Which way a touch moves the measured value
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Polarity {
    /// Touching the pad shortens the measurement (e.g. faster discharge)
    DecreaseOnTouch,
    /// Touching the pad lengthens the measurement (e.g. more charge transfers)
    IncreaseOnTouch,
}

/// Fraction of the reference reading used as the detection threshold
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThresholdFraction {
    pub numerator: u16,
    pub denominator: u16,
}

impl ThresholdFraction {
    pub const fn new(numerator: u16, denominator: u16) -> Self {
        Self { numerator, denominator }
    }

    /// Scale `reference` by this fraction. Multiplies before dividing, in u32.
    pub fn of(&self, reference: RawReading) -> u32 {
        (reference as u32 * self.numerator as u32)
            .checked_div(self.denominator as u32)
            .unwrap_or(0)
    }
}

/// Whether a baseline has been established since power-on. Never reverts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CalibrationState {
    Uncalibrated,
    Calibrated,
}

/// Configuration for a sensor array
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScanConfig {
    /// Direction in which a touch moves the reading
    pub polarity: Polarity,
    /// Number of consecutive, consistent scan cycles required to confirm a press or release
    pub debounce_threshold_cycles: u8,
    /// Number of samples averaged per sensor to find its reference level
    pub calibration_sample_count: u16,
    /// Detection threshold as a fraction of the reference level
    pub threshold_fraction: ThresholdFraction,
    /// Minimum detection threshold. Keeps sensors with a low reference from
    /// triggering on noise.
    pub threshold_floor: RawReading,
    /// Recalibrate every this many scan cycles. `None` calibrates once, at startup.
    pub recalibration_period_cycles: Option<u32>,
    /// Saturation value of a measurement. Readings above it are clamped.
    pub reading_ceiling: RawReading,
}

/// Timeout count of the GPIO discharge measurement
pub const DEFAULT_READING_CEILING: RawReading = 2000;

impl ScanConfig {
    /// Discharge-timing pads: touch speeds up the discharge, and the baseline
    /// is refreshed roughly every 10 s at a 1 ms scan period.
    pub const fn discharge() -> Self {
        Self {
            polarity: Polarity::DecreaseOnTouch,
            debounce_threshold_cycles: 5,
            calibration_sample_count: 16,
            threshold_fraction: ThresholdFraction::new(3, 10),
            threshold_floor: 20,
            recalibration_period_cycles: Some(10_000),
            reading_ceiling: DEFAULT_READING_CEILING,
        }
    }

    /// Charge-timing pads: touch slows the measurement. Calibrated once, so a
    /// finger resting on a pad is never absorbed into the baseline.
    pub const fn charge() -> Self {
        Self {
            polarity: Polarity::IncreaseOnTouch,
            recalibration_period_cycles: None,
            ..Self::discharge()
        }
    }

    /// Check the configuration for an array of `sensor_count` sensors
    pub fn validate(&self, sensor_count: usize) -> Result<(), ConfigError> {
        if sensor_count == 0 {
            return Err(ConfigError::NoSensors);
        }
        if sensor_count > u16::MAX as usize + 1 {
            return Err(ConfigError::TooManySensors(sensor_count));
        }
        if self.debounce_threshold_cycles == 0 {
            return Err(ConfigError::ZeroDebounceThreshold);
        }
        if self.calibration_sample_count == 0 {
            return Err(ConfigError::ZeroCalibrationSamples);
        }
        if self.threshold_fraction.denominator == 0 {
            return Err(ConfigError::ZeroFractionDenominator);
        }
        if self.threshold_floor == 0 {
            return Err(ConfigError::ZeroThresholdFloor);
        }
        if self.recalibration_period_cycles == Some(0) {
            return Err(ConfigError::ZeroRecalibrationPeriod);
        }
        if self.reading_ceiling == 0 {
            return Err(ConfigError::ZeroReadingCeiling);
        }
        if self.threshold_floor > self.reading_ceiling {
            return Err(ConfigError::FloorAboveCeiling {
                floor: self.threshold_floor,
                ceiling: self.reading_ceiling,
            });
        }
        Ok(())
    }
}

pub const DISCHARGE_CONFIG: ScanConfig = ScanConfig::discharge();
pub const CHARGE_CONFIG: ScanConfig = ScanConfig::charge();
pub const DEFAULT_SCAN_CONFIG: ScanConfig = DISCHARGE_CONFIG;

/// Invalid scanner configuration. Detected once, at construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("sensor array is empty")]
    NoSensors,
    #[error("{0} sensors cannot be addressed by a 16-bit sensor id")]
    TooManySensors(usize),
    #[error("debounce threshold must be at least one cycle")]
    ZeroDebounceThreshold,
    #[error("calibration needs at least one sample")]
    ZeroCalibrationSamples,
    #[error("threshold fraction has a zero denominator")]
    ZeroFractionDenominator,
    #[error("threshold floor must be non-zero")]
    ZeroThresholdFloor,
    #[error("recalibration period must be non-zero; use None to calibrate once")]
    ZeroRecalibrationPeriod,
    #[error("reading ceiling must be non-zero")]
    ZeroReadingCeiling,
    #[error("threshold floor {floor} is above the reading ceiling {ceiling}")]
    FloorAboveCeiling { floor: RawReading, ceiling: RawReading },
}
