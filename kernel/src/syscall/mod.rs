//! System call infrastructure for the signal subsystem
//!
//! Arguments arrive in a0..a2 of the saved [`TrapFrame`](crate::task::TrapFrame),
//! the syscall number in a7. The result goes back in a0, negative errno on
//! failure.

pub mod dispatcher;
pub mod errno;
pub mod signal;
pub mod userptr;

pub use dispatcher::{dispatch_syscall, handle_syscall};

/// System call numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u64)]
pub enum SyscallNumber {
    Alarm = 37,
    Kill = 129,
    SigAction = 134,
    SigProcMask = 135,
    SigPending = 136,
    SigReturn = 139,
}

impl SyscallNumber {
    /// Try to convert a u64 to a SyscallNumber
    pub fn from_u64(value: u64) -> Option<Self> {
        match value {
            37 => Some(Self::Alarm),
            129 => Some(Self::Kill),
            134 => Some(Self::SigAction),
            135 => Some(Self::SigProcMask),
            136 => Some(Self::SigPending),
            139 => Some(Self::SigReturn),
            _ => None,
        }
    }
}

/// System call result type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyscallResult {
    Ok(u64),
    /// Positive errno
    Err(u64),
}

impl SyscallResult {
    /// Value placed in the return register: the result, or the negated errno
    pub fn into_raw(self) -> u64 {
        match self {
            SyscallResult::Ok(value) => value,
            SyscallResult::Err(errno) => (errno as i64).wrapping_neg() as u64,
        }
    }
}
