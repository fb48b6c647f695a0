//! Monitored Call Records
//!
//! Every logged invocation of a monitored syscall becomes one fixed-width
//! `LogRecord` handed to a `LogSink`.
//!
//! # Sink Contract
//! - Append-only, no acknowledgement
//! - Must never block the calling thread
//! - Failures are reported but callers are free to drop them

use alloc::vec::Vec;
use core::fmt;

use spin::Mutex;

use crate::syscall::{Pid, SYSCALL_ARGS};

/// One logged syscall invocation.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogRecord {
    pub pid: Pid,
    pub syscall: usize,
    pub args: [u64; SYSCALL_ARGS],
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a0, a1, a2, a3, a4, a5] = self.args;
        write!(
            f,
            "[{:x}]{:x}({:x},{:x},{:x},{:x},{:x},{:x})",
            self.pid, self.syscall, a0, a1, a2, a3, a4, a5
        )
    }
}

/// Error type for sink writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkError {
    /// No room for another record.
    Full,
    /// Another writer holds the sink.
    Busy,
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => write!(f, "log sink full"),
            Self::Busy => write!(f, "log sink busy"),
        }
    }
}

/// Destination for monitored call records.
pub trait LogSink: Send + Sync {
    /// Append a record without blocking.
    fn log_message(&self, record: &LogRecord) -> Result<(), SinkError>;
}

/// Sink that writes records to the kernel log at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct KernelLog;

impl LogSink for KernelLog {
    fn log_message(&self, record: &LogRecord) -> Result<(), SinkError> {
        log::debug!(target: "syscall", "{}", record);
        Ok(())
    }
}

/// Bounded in-memory sink.
///
/// Records past `capacity` are refused with `Full`; a contended buffer
/// refuses with `Busy` instead of spinning.
#[derive(Debug)]
pub struct MemorySink {
    records: Mutex<Vec<LogRecord>>,
    capacity: usize,
}

impl MemorySink {
    pub const fn new(capacity: usize) -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            capacity,
        }
    }

    /// Remove and return everything recorded so far.
    pub fn drain(&self) -> Vec<LogRecord> {
        core::mem::take(&mut *self.records.lock())
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl LogSink for MemorySink {
    fn log_message(&self, record: &LogRecord) -> Result<(), SinkError> {
        let mut records = self.records.try_lock().ok_or(SinkError::Busy)?;
        if records.len() >= self.capacity {
            return Err(SinkError::Full);
        }
        records.try_reserve(1).map_err(|_| SinkError::Full)?;
        records.push(*record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pid: Pid) -> LogRecord {
        LogRecord {
            pid,
            syscall: 7,
            args: [1, 2, 3, 0xff, 0, 0],
        }
    }

    #[test]
    fn test_record_format() {
        assert_eq!(record(0x2a).to_string(), "[2a]7(1,2,3,ff,0,0)");
    }

    #[test]
    fn test_memory_sink_capacity() {
        let sink = MemorySink::new(2);
        assert!(sink.log_message(&record(1)).is_ok());
        assert!(sink.log_message(&record(2)).is_ok());
        assert_eq!(sink.log_message(&record(3)), Err(SinkError::Full));
        assert_eq!(sink.len(), 2);
        assert_eq!(sink.drain().len(), 2);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_memory_sink_never_blocks() {
        let sink = MemorySink::new(4);
        let _held = sink.records.lock();
        assert_eq!(sink.log_message(&record(1)), Err(SinkError::Busy));
    }

    #[test]
    fn test_kernel_log_accepts_records() {
        assert!(KernelLog.log_message(&record(1)).is_ok());
    }
}
