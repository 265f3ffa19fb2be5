use crate::event::EventSink;
use crate::SensorId;

/// Debounce state of a single sensor
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DebounceRecord {
    /// Last reported state
    pub confirmed_state: bool,
    /// Raw reading from the previous scan cycle
    pub previous_raw: bool,
    /// Length of the current run of readings that disagree with `confirmed_state`
    pub consecutive_count: u8,
}

impl DebounceRecord {
    pub const fn new() -> Self {
        Self {
            confirmed_state: false,
            previous_raw: false,
            consecutive_count: 0,
        }
    }

    /// Process the raw reading for one scan cycle
    ///
    /// Returns the new confirmed state on the cycle where `threshold`
    /// consecutive readings have disagreed with the old one.
    pub fn update(&mut self, raw: bool, threshold: u8) -> Option<bool> {
        let mut transition = None;

        if raw == self.confirmed_state {
            self.consecutive_count = 0;
        } else {
            self.consecutive_count = if raw != self.previous_raw {
                // A new run starts with this reading
                1
            } else {
                self.consecutive_count.saturating_add(1)
            };

            if self.consecutive_count >= threshold {
                self.confirmed_state = raw;
                self.consecutive_count = 0;
                transition = Some(raw);
            }
        }

        self.previous_raw = raw;
        transition
    }
}

/// Debounce filter for an array of `N` sensors
#[derive(Clone, Debug)]
pub struct Debouncer<const N: usize> {
    records: [DebounceRecord; N],
    threshold: u8,
}

impl<const N: usize> Debouncer<N> {
    pub const fn new(threshold: u8) -> Self {
        Self {
            records: [DebounceRecord::new(); N],
            threshold,
        }
    }

    /// Feed one scan cycle of raw readings, forwarding confirmed transitions
    /// to `sink` in ascending sensor order. Returns the number of transitions.
    pub fn push<S: EventSink + ?Sized>(&mut self, raw: &[bool; N], sink: &mut S) -> usize {
        let mut count = 0;
        for (i, (record, &reading)) in self.records.iter_mut().zip(raw.iter()).enumerate() {
            if let Some(pressed) = record.update(reading, self.threshold) {
                log::trace!("sensor {} {}", i, if pressed { "pressed" } else { "released" });
                sink.on_key_event(SensorId(i as u16), pressed);
                count += 1;
            }
        }
        count
    }

    /// Confirmed state of `sensor`; false for ids outside the array
    pub fn pressed(&self, sensor: SensorId) -> bool {
        self.records
            .get(sensor.index())
            .map_or(false, |r| r.confirmed_state)
    }

    pub fn records(&self) -> &[DebounceRecord; N] {
        &self.records
    }
}
