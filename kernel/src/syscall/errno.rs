//! POSIX errno values
//!
//! Error codes returned by the signal system calls.

/// No such process
pub const ESRCH: i32 = 3;

/// Bad address
pub const EFAULT: i32 = 14;

/// Invalid argument
pub const EINVAL: i32 = 22;

/// Function not implemented
pub const ENOSYS: i32 = 38;
