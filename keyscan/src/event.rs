use core::ops::Deref;

use heapless::Vec;

use crate::SensorId;

/// A confirmed change of a sensor's state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    pub sensor: SensorId,
    pub pressed: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyEventKind {
    Press,
    Release,
}

impl KeyEvent {
    pub const fn press(sensor: SensorId) -> Self {
        Self { sensor, pressed: true }
    }

    pub const fn release(sensor: SensorId) -> Self {
        Self { sensor, pressed: false }
    }

    pub const fn kind(&self) -> KeyEventKind {
        if self.pressed {
            KeyEventKind::Press
        } else {
            KeyEventKind::Release
        }
    }
}

/// Receiver of confirmed key transitions
///
/// Called at most once per sensor per scan cycle, in ascending sensor order.
pub trait EventSink {
    fn on_key_event(&mut self, sensor: SensorId, pressed: bool);
}

impl<F: FnMut(KeyEvent)> EventSink for F {
    fn on_key_event(&mut self, sensor: SensorId, pressed: bool) {
        self(KeyEvent { sensor, pressed })
    }
}

/// Fixed-capacity event buffer, for draining events after the scan completes
///
/// Events beyond `CAP` in a single fill are dropped.
#[derive(Clone, Debug, Default)]
pub struct EventBuffer<const CAP: usize> {
    events: Vec<KeyEvent, CAP>,
}

impl<const CAP: usize> EventBuffer<CAP> {
    pub const fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl<const CAP: usize> Deref for EventBuffer<CAP> {
    type Target = [KeyEvent];

    fn deref(&self) -> &[KeyEvent] {
        &self.events
    }
}

impl<const CAP: usize> EventSink for EventBuffer<CAP> {
    fn on_key_event(&mut self, sensor: SensorId, pressed: bool) {
        if self.events.push(KeyEvent { sensor, pressed }).is_err() {
            log::warn!("event buffer full, dropped event for sensor {}", sensor.0);
        }
    }
}

#[cfg(test)]
pub mod test {
    use super::*;

    #[test]
    fn test_closure_sink() {
        let mut seen = std::vec::Vec::new();
        let mut sink = |e: KeyEvent| seen.push(e);
        sink.on_key_event(SensorId(2), true);
        sink.on_key_event(SensorId(7), false);

        assert_eq!(seen, [KeyEvent::press(SensorId(2)), KeyEvent::release(SensorId(7))]);
        assert_eq!(seen[0].kind(), KeyEventKind::Press);
        assert_eq!(seen[1].kind(), KeyEventKind::Release);
    }

    #[test]
    fn test_buffer_drops_overflow() {
        let mut buf: EventBuffer<2> = EventBuffer::new();
        for i in 0..4 {
            buf.on_key_event(SensorId(i), true);
        }
        assert_eq!(buf.len(), 2);
        assert_eq!(buf[1], KeyEvent::press(SensorId(1)));

        buf.clear();
        assert!(buf.is_empty());
    }
}
