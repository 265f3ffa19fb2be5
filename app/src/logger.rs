use core::fmt::Write;

use log::{LevelFilter, Log, Metadata, Record};

use crate::serial::uart1;

/// `log` backend writing one line per record to USART1
struct UartLogger;

impl Log for UartLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let mut w = uart1::writer();
            write!(w, "{} {}: {}\r\n", record.level(), record.target(), record.args()).ok();
        }
    }

    fn flush(&self) {}
}

static LOGGER: UartLogger = UartLogger;

/// Install the UART logger. Call once, before interrupts that log are enabled.
pub fn init(level: LevelFilter) {
    // Cortex-M0 has no compare-and-swap, so the racy setters are the only option.
    // Nothing else runs yet, so nothing can race.
    unsafe {
        log::set_logger_racy(&LOGGER).ok();
        log::set_max_level_racy(level);
    }
}
