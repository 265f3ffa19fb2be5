use crate::calibrate::Baseline;
use crate::{Polarity, RawReading};

/// Decide whether a single reading indicates a touch
///
/// Strict comparison: a reading exactly `threshold` away from the reference
/// is not a touch. A saturated reading is classified like any other value.
pub fn classify(polarity: Polarity, raw: RawReading, baseline: &Baseline) -> bool {
    match polarity {
        Polarity::DecreaseOnTouch => match baseline.reference.checked_sub(baseline.threshold) {
            Some(limit) => raw < limit,
            // threshold above reference, nothing reads below zero
            None => false,
        },
        Polarity::IncreaseOnTouch => {
            (raw as u32) > baseline.reference as u32 + baseline.threshold as u32
        }
    }
}

#[cfg(test)]
pub mod test {
    use super::*;

    const BASE: Baseline = Baseline { reference: 100, threshold: 30 };

    #[test]
    fn test_decrease_on_touch() {
        let p = Polarity::DecreaseOnTouch;
        assert!(classify(p, 100 - 30 - 1, &BASE));
        assert!(classify(p, 0, &BASE));
        assert!(!classify(p, 100 - 30, &BASE), "boundary must not count as touched");
        assert!(!classify(p, 100, &BASE));
        assert!(!classify(p, 2000, &BASE));
    }

    #[test]
    fn test_increase_on_touch() {
        let p = Polarity::IncreaseOnTouch;
        assert!(classify(p, 100 + 30 + 1, &BASE));
        assert!(classify(p, 2000, &BASE));
        assert!(!classify(p, 100 + 30, &BASE), "boundary must not count as touched");
        assert!(!classify(p, 100, &BASE));
        assert!(!classify(p, 0, &BASE));
    }

    #[test]
    fn test_degenerate_baselines() {
        // Floor exceeds a tiny reference
        let small = Baseline { reference: 10, threshold: 20 };
        for raw in [0, 5, 10, 100] {
            assert!(!classify(Polarity::DecreaseOnTouch, raw, &small));
        }
        let equal = Baseline { reference: 20, threshold: 20 };
        assert!(!classify(Polarity::DecreaseOnTouch, 0, &equal));

        let top = Baseline { reference: u16::MAX, threshold: 20 };
        assert!(!classify(Polarity::IncreaseOnTouch, u16::MAX, &top));
        assert!(classify(Polarity::DecreaseOnTouch, 0, &top));
    }
}
