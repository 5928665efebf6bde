//! Signal handling infrastructure
//!
//! This module implements the kernel side of signals:
//! - Signal constants (SIGKILL, SIGTERM, etc.)
//! - Per-process signal state (pending, blocked, dispositions, metadata)
//! - Delivery to userspace handlers through frames on the user stack
//! - Injection by other processes and by the kernel
//!
//! Signal delivery occurs at the return-to-userspace boundary, see
//! [`delivery::do_signal`].

pub mod constants;
pub mod delivery;
pub mod frame;
pub mod send;
pub mod state;
pub mod types;

pub use delivery::{do_signal, Delivery};
pub use send::{send_kernel_signal, send_signal};
pub use state::SignalState;
pub use types::*;
