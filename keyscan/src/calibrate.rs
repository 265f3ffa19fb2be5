use crate::sensor::Measure;
use crate::{RawReading, ScanConfig, SensorId};

/// Rest-state reference level of one sensor, and the deviation from it that
/// counts as a touch
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Baseline {
    pub reference: RawReading,
    pub threshold: RawReading,
}

/// Detection threshold for a sensor with the given reference level
///
/// Never below `config.threshold_floor`, never above `config.reading_ceiling`.
pub fn derive_threshold(reference: RawReading, config: &ScanConfig) -> RawReading {
    let scaled = config.threshold_fraction.of(reference);
    let threshold = scaled
        .max(config.threshold_floor as u32)
        .min(config.reading_ceiling as u32) as RawReading;

    if scaled < config.threshold_floor as u32 {
        log::trace!("reference {} below useful range, threshold floored to {}", reference, threshold);
    }
    threshold
}

/// Average `config.calibration_sample_count` measurements of one sensor
pub fn measure_reference<M: Measure>(meter: &mut M, sensor: SensorId, config: &ScanConfig) -> RawReading {
    let samples = config.calibration_sample_count.max(1);
    let mut total: u32 = 0;
    for i in 0..samples {
        if i != 0 {
            meter.settle();
        }
        total += meter.measure(sensor).min(config.reading_ceiling) as u32;
    }
    (total / samples as u32) as RawReading
}

/// Recompute the baseline of every sensor in `baselines`
///
/// Entry `i` of the table belongs to `SensorId(i)`. The whole table is
/// rewritten.
pub fn calibrate<M: Measure>(meter: &mut M, baselines: &mut [Baseline], config: &ScanConfig) {
    for (i, baseline) in baselines.iter_mut().enumerate() {
        let reference = measure_reference(meter, SensorId(i as u16), config);
        *baseline = Baseline {
            reference,
            threshold: derive_threshold(reference, config),
        };
    }
    log::debug!("calibrated {} sensors", baselines.len());
}

#[cfg(test)]
pub mod test {
    use super::*;
    use crate::{ThresholdFraction, DEFAULT_SCAN_CONFIG};

    /// Each sensor reads `base + sensor` plus a rotating offset in 0..4
    struct Ramp {
        base: u16,
        tick: u16,
        settles: usize,
    }

    impl Measure for Ramp {
        fn measure(&mut self, sensor: SensorId) -> RawReading {
            self.tick = (self.tick + 1) % 4;
            self.base + sensor.0 + self.tick
        }

        fn settle(&mut self) {
            self.settles += 1;
        }
    }

    #[test]
    fn test_threshold_floor() {
        let config = &DEFAULT_SCAN_CONFIG;

        for r in [0, 1, 10, 66, 67, 100, 1000, 2000, u16::MAX] {
            assert!(derive_threshold(r, config) >= config.threshold_floor, "reference {}", r);
        }
        assert_eq!(derive_threshold(0, config), 20);
        assert_eq!(derive_threshold(66, config), 20);
        assert_eq!(derive_threshold(100, config), 30);
        assert_eq!(derive_threshold(1000, config), 300);
    }

    #[test]
    fn test_threshold_capped_at_ceiling() {
        let config = ScanConfig {
            threshold_fraction: ThresholdFraction::new(2, 1),
            ..DEFAULT_SCAN_CONFIG
        };
        assert_eq!(derive_threshold(1500, &config), config.reading_ceiling);
    }

    #[test]
    fn test_reference_is_integer_mean() {
        let config = &DEFAULT_SCAN_CONFIG;
        let mut meter = Ramp { base: 100, tick: 0, settles: 0 };

        // 16 samples cycling through offsets 1, 2, 3, 0: mean 1.5, truncated
        let reference = measure_reference(&mut meter, SensorId(0), config);
        assert_eq!(reference, 101);
        assert_eq!(meter.settles, 15);
    }

    #[test]
    fn test_saturated_samples_are_clamped() {
        let config = ScanConfig { reading_ceiling: 50, threshold_floor: 5, ..DEFAULT_SCAN_CONFIG };
        let mut meter = Ramp { base: 1000, tick: 0, settles: 0 };
        assert_eq!(measure_reference(&mut meter, SensorId(0), &config), 50);
    }

    #[test]
    fn test_calibrate_rewrites_table() {
        let config = &DEFAULT_SCAN_CONFIG;
        let mut meter = Ramp { base: 200, tick: 3, settles: 0 };
        let mut baselines = [Baseline { reference: 9, threshold: 9 }; 3];

        calibrate(&mut meter, &mut baselines, config);

        for (i, b) in baselines.iter().enumerate() {
            assert_eq!(b.reference, 201 + i as u16);
            assert_eq!(b.threshold, derive_threshold(b.reference, config));
        }
        assert_eq!(meter.settles, 3 * 15);
    }
}
