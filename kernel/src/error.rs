//! Error type shared by the signal subsystem.

use core::fmt;

use crate::syscall::errno::{EFAULT, EINVAL, ESRCH};

/// Failures reported by signal operations.
///
/// Every variant is recoverable by the caller and leaves kernel state
/// unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalError {
    /// Signal number outside `SIGMIN..=SIGMAX`
    InvalidSignal(i64),
    /// Unknown sigprocmask policy
    InvalidHow(i32),
    /// Pid does not resolve to a live process
    NoSuchProcess(i64),
    /// User address range is not accessible
    BadAddress(u64),
}

impl SignalError {
    /// POSIX errno for this error.
    pub const fn errno(self) -> u64 {
        match self {
            SignalError::InvalidSignal(_) | SignalError::InvalidHow(_) => EINVAL as u64,
            SignalError::NoSuchProcess(_) => ESRCH as u64,
            SignalError::BadAddress(_) => EFAULT as u64,
        }
    }
}

impl fmt::Display for SignalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalError::InvalidSignal(sig) => write!(f, "invalid signal number {}", sig),
            SignalError::InvalidHow(how) => write!(f, "invalid sigprocmask how {}", how),
            SignalError::NoSuchProcess(pid) => write!(f, "no such process {}", pid),
            SignalError::BadAddress(addr) => write!(f, "bad user address {:#x}", addr),
        }
    }
}
