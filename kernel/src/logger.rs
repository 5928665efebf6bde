//! Kernel `log` backend
//!
//! Records are buffered in memory until an output sink (serial console,
//! framebuffer, host test harness) is registered with [`set_sink`], which
//! replays the buffer once and forwards every later record.

use conquer_once::spin::OnceCell;
use core::fmt::{self, Write};
use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};
use spin::Mutex;

const BUFFER_SIZE: usize = 8192;
const LINE_SIZE: usize = 256;

/// Output function receiving one formatted line (without trailing newline)
pub type LogSink = fn(&str);

/// Buffer for storing log messages before a sink is registered
struct LogBuffer {
    buffer: [u8; BUFFER_SIZE],
    position: usize,
}

impl LogBuffer {
    const fn new() -> Self {
        Self {
            buffer: [0; BUFFER_SIZE],
            position: 0,
        }
    }

    fn write_str(&mut self, s: &str) -> fmt::Result {
        let bytes = s.as_bytes();
        let remaining = BUFFER_SIZE - self.position;

        if bytes.len() > remaining {
            // Buffer is full: keep what is already there, drop the rest
            return Ok(());
        }

        self.buffer[self.position..self.position + bytes.len()].copy_from_slice(bytes);
        self.position += bytes.len();

        Ok(())
    }

    fn contents(&self) -> &str {
        core::str::from_utf8(&self.buffer[..self.position]).unwrap_or("<invalid UTF-8>")
    }

    fn clear(&mut self) {
        self.position = 0;
    }
}

impl Write for LogBuffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.write_str(s)
    }
}

/// One formatted record; longer lines are truncated
struct LineBuffer {
    bytes: [u8; LINE_SIZE],
    len: usize,
}

impl LineBuffer {
    const fn new() -> Self {
        LineBuffer {
            bytes: [0; LINE_SIZE],
            len: 0,
        }
    }

    fn as_str(&self) -> &str {
        match core::str::from_utf8(&self.bytes[..self.len]) {
            Ok(s) => s,
            // Truncation may split a multi-byte character
            Err(e) => core::str::from_utf8(&self.bytes[..e.valid_up_to()]).unwrap_or(""),
        }
    }
}

impl Write for LineBuffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let n = s.len().min(LINE_SIZE - self.len);
        self.bytes[self.len..self.len + n].copy_from_slice(&s.as_bytes()[..n]);
        self.len += n;
        Ok(())
    }
}

fn emit_line(sink: LogSink, record: &Record) {
    let mut line = LineBuffer::new();
    let _ = write!(line, "[{:>5}] {}: {}", record.level(), record.target(), record.args());
    sink(line.as_str());
}

pub struct KernelLogger {
    buffer: Mutex<LogBuffer>,
    sink: OnceCell<LogSink>,
}

impl Default for KernelLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl KernelLogger {
    pub const fn new() -> Self {
        KernelLogger {
            buffer: Mutex::new(LogBuffer::new()),
            sink: OnceCell::uninit(),
        }
    }

    /// Register the output sink and replay buffered records into it.
    ///
    /// Only the first registration takes effect; returns false otherwise.
    /// The sink is published only after the replay, with the buffer lock
    /// still held, so buffered records always reach it first.
    pub fn set_sink(&self, sink: LogSink) -> bool {
        let mut buffer = self.buffer.lock();
        if self.sink.is_initialized() {
            return false;
        }
        for line in buffer.contents().lines() {
            sink(line);
        }
        buffer.clear();
        self.sink.try_init_once(|| sink).is_ok()
    }

    /// Records buffered while no sink is registered
    pub fn with_buffered<R>(&self, f: impl FnOnce(&str) -> R) -> R {
        f(self.buffer.lock().contents())
    }
}

impl Log for KernelLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        if let Some(sink) = self.sink.get() {
            emit_line(*sink, record);
            return;
        }
        let mut buffer = self.buffer.lock();
        // The sink may have been registered while we waited for the lock,
        // in which case the buffer has already been replayed.
        match self.sink.get() {
            Some(sink) => emit_line(*sink, record),
            None => {
                let _ = writeln!(
                    &mut *buffer,
                    "[{:>5}] {}: {}",
                    record.level(),
                    record.target(),
                    record.args()
                );
            }
        }
    }

    fn flush(&self) {}
}

pub static KERNEL_LOGGER: KernelLogger = KernelLogger::new();

/// Install the kernel logger as the `log` backend
pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_logger(&KERNEL_LOGGER)?;
    log::set_max_level(level);
    Ok(())
}

/// Register the output sink of the kernel logger
pub fn set_sink(sink: LogSink) -> bool {
    KERNEL_LOGGER.set_sink(sink)
}
