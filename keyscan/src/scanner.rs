use crate::calibrate::{calibrate, Baseline};
use crate::classify::classify;
use crate::debounce::Debouncer;
use crate::event::EventSink;
use crate::schedule::should_recalibrate;
use crate::sensor::Measure;
use crate::{CalibrationState, ConfigError, ScanConfig, SensorId, DEFAULT_SCAN_CONFIG};

/// Scan pipeline for an array of `N` capacitive keys
///
/// Owns the baseline table, the debounce state and the scan cycle counter.
/// Call [`Scanner::scan`] once per scan period.
pub struct Scanner<'a, M: Measure, const N: usize> {
    config: &'a ScanConfig,
    meter: M,
    baselines: [Baseline; N],
    debouncer: Debouncer<N>,
    state: CalibrationState,
    cycles: u32,
}

impl<'a, M: Measure, const N: usize> Scanner<'a, M, N> {
    /// Create a scanner. No measurement is taken until the first scan.
    pub fn new(config: Option<&'a ScanConfig>, meter: M) -> Result<Self, ConfigError> {
        let config = config.unwrap_or(&DEFAULT_SCAN_CONFIG);
        config.validate(N)?;

        Ok(Self {
            config,
            meter,
            baselines: [Baseline::default(); N],
            debouncer: Debouncer::new(config.debounce_threshold_cycles),
            state: CalibrationState::Uncalibrated,
            cycles: 0,
        })
    }

    /// Run one full scan cycle
    ///
    /// Recalibrates first if due, then measures and classifies every sensor
    /// and reports confirmed transitions to `sink`. Returns the number of
    /// transitions reported.
    pub fn scan<S: EventSink + ?Sized>(&mut self, sink: &mut S) -> usize {
        let touched = self.scan_raw();
        self.debouncer.push(&touched, sink)
    }

    /// Measure and classify every sensor without debouncing
    ///
    /// Counts as a scan cycle for the recalibration schedule. The debounce
    /// filter does not see these readings, so interleaving this with
    /// [`Scanner::scan`] leaves its record of the previous cycle stale.
    pub fn scan_raw(&mut self) -> [bool; N] {
        if should_recalibrate(self.cycles, self.state, self.config.recalibration_period_cycles) {
            self.force_calibrate();
        }

        let mut touched = [false; N];
        for (i, (t, baseline)) in touched.iter_mut().zip(self.baselines.iter()).enumerate() {
            let raw = self
                .meter
                .measure(SensorId(i as u16))
                .min(self.config.reading_ceiling);
            *t = classify(self.config.polarity, raw, baseline);
        }

        self.cycles = self.cycles.wrapping_add(1);
        touched
    }

    /// Recompute all baselines now, regardless of the schedule
    pub fn force_calibrate(&mut self) {
        calibrate(&mut self.meter, &mut self.baselines, self.config);
        self.state = CalibrationState::Calibrated;
    }

    pub fn baselines(&self) -> &[Baseline; N] {
        &self.baselines
    }

    pub fn calibration_state(&self) -> CalibrationState {
        self.state
    }

    /// Number of completed scan cycles, wrapping
    pub fn cycles(&self) -> u32 {
        self.cycles
    }

    /// Debounced state of `sensor`
    pub fn pressed(&self, sensor: SensorId) -> bool {
        self.debouncer.pressed(sensor)
    }

    pub fn config(&self) -> &ScanConfig {
        self.config
    }

    pub fn meter_mut(&mut self) -> &mut M {
        &mut self.meter
    }
}
