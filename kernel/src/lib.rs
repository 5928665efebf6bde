//! Signal delivery for the teaching kernel.
//!
//! The crate is `no_std` so it links into the kernel image; under `cfg(test)`
//! the standard library is available so the unit tests run on the host.
//!
//! Layout:
//! - [`signal`]: signal sets, dispositions, per-process signal state, the
//!   delivery engine, handler frames and signal injection
//! - [`process`]: the process model and the directory/scheduler seams
//! - [`time`]: the monotonic tick clock and the per-process alarm timer
//! - [`syscall`]: the signal syscalls, user memory access and dispatch
//! - [`logger`]: the kernel `log` backend

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod config;
pub mod error;
pub mod logger;
pub mod process;
pub mod signal;
pub mod syscall;
pub mod task;
pub mod time;

pub use error::SignalError;
