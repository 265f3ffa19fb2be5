use crate::CalibrationState;

/// Whether the baselines must be recomputed before scan cycle `cycle`
///
/// `cycle` is the number of scan cycles completed so far; it may wrap.
/// Always true until a first calibration has happened. After that, true on
/// every multiple of `period`, or never when `period` is `None`.
pub fn should_recalibrate(cycle: u32, state: CalibrationState, period: Option<u32>) -> bool {
    match state {
        CalibrationState::Uncalibrated => true,
        CalibrationState::Calibrated => match period {
            Some(p) if p != 0 => cycle % p == 0,
            _ => false,
        },
    }
}
