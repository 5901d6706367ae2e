//! Serial port console.
//!
//! This module provides the console sink used by the task table (process
//! table dumps, exit notices, scheduler traces) and the `log` backend, both
//! on top of the 16550 UART at COM1.
//!
//! Until [`init`] runs, output is discarded.

use core::fmt;
use core::fmt::Write;
use log::{LevelFilter, Log, Metadata, Record};
use spin::Mutex;

#[cfg(target_arch = "x86_64")]
use uart_16550::SerialPort;

/// COM1 base address.
#[cfg(target_arch = "x86_64")]
const COM1_BASE: u16 = 0x3F8;

/// Global serial port (COM1).
#[cfg(target_arch = "x86_64")]
static SERIAL1: Mutex<Option<SerialPort>> = Mutex::new(None);

/// Initialize COM1.
///
/// Must only be called on bare metal, where port I/O is permitted.
#[cfg(target_arch = "x86_64")]
pub fn init() {
    // SAFETY: COM1 is a standard port on every PC-compatible machine and
    // nothing else in the kernel drives it.
    let mut port = unsafe { SerialPort::new(COM1_BASE) };
    port.init();
    *SERIAL1.lock() = Some(port);
}

#[cfg(not(target_arch = "x86_64"))]
pub fn init() {}

/// Write a string to COM1.
#[cfg(target_arch = "x86_64")]
pub fn write_str(s: &str) {
    if let Some(ref mut serial) = *SERIAL1.lock() {
        for byte in s.bytes() {
            serial.send(byte);
        }
    }
}

#[cfg(not(target_arch = "x86_64"))]
pub fn write_str(_s: &str) {}

/// Serial writer for formatting.
///
/// This is the console the global task table writes to.
#[derive(Debug, Default, Clone, Copy)]
pub struct SerialWriter;

impl fmt::Write for SerialWriter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        write_str(s);
        Ok(())
    }
}

/// Print macro for serial output.
#[macro_export]
macro_rules! serial_print {
    ($($arg:tt)*) => {
        $crate::serial::_print(format_args!($($arg)*));
    };
}

/// Println macro for serial output.
#[macro_export]
macro_rules! serial_println {
    () => ($crate::serial_print!("\n"));
    ($($arg:tt)*) => {
        $crate::serial_print!("{}\n", format_args!($($arg)*));
    };
}

/// Internal print function.
///
/// Interrupts are disabled around the write to prevent deadlock on the port
/// lock. That is only possible in ring 0, so hosted builds write directly.
#[doc(hidden)]
#[cfg(all(target_arch = "x86_64", target_os = "none"))]
pub fn _print(args: fmt::Arguments) {
    x86_64::instructions::interrupts::without_interrupts(|| {
        let _ = SerialWriter.write_fmt(args);
    });
}

#[doc(hidden)]
#[cfg(not(all(target_arch = "x86_64", target_os = "none")))]
pub fn _print(args: fmt::Arguments) {
    let _ = SerialWriter.write_fmt(args);
}

/// `log` backend writing `[LEVEL] target: message` lines to COM1.
struct SerialLogger;

impl Log for SerialLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        serial_println!(
            "{} {}: {}",
            level_prefix(record.level()),
            record.target(),
            record.args()
        );
    }

    fn flush(&self) {}
}

static LOGGER: SerialLogger = SerialLogger;

fn level_prefix(level: log::Level) -> &'static str {
    match level {
        log::Level::Trace => "[TRACE]",
        log::Level::Debug => "[DEBUG]",
        log::Level::Info => "[INFO ]",
        log::Level::Warn => "[WARN ]",
        log::Level::Error => "[ERROR]",
    }
}

/// Install the serial logger. A second call only adjusts the level.
pub fn init_logger(level: LevelFilter) {
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(level);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_prefix_width() {
        for level in [
            log::Level::Trace,
            log::Level::Debug,
            log::Level::Info,
            log::Level::Warn,
            log::Level::Error,
        ] {
            assert_eq!(level_prefix(level).len(), 7);
        }
    }

    #[test]
    fn test_logger_filters_by_max_level() {
        init_logger(LevelFilter::Debug);
        assert_eq!(log::max_level(), LevelFilter::Debug);

        let debug = Metadata::builder()
            .level(log::Level::Debug)
            .target("taskcore")
            .build();
        let trace = Metadata::builder().level(log::Level::Trace).build();
        assert!(LOGGER.enabled(&debug));
        assert!(!LOGGER.enabled(&trace));

        // With COM1 absent the record is formatted and dropped.
        LOGGER.log(
            &Record::builder()
                .metadata(debug)
                .args(format_args!("pid {} admitted", 1))
                .build(),
        );
        log::debug!("logger installed");
    }

    #[test]
    fn test_writer_before_init_discards() {
        // COM1 is never initialized on the host; writes must be silent no-ops.
        let mut writer = SerialWriter;
        assert!(write!(writer, "pid {}", 3).is_ok());
    }
}
