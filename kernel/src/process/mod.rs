//! Process model used by the signal subsystem
//!
//! The signal code never walks a global process pool. It resolves pids,
//! enumerates children and wakes processes through [`ProcessDirectory`], and
//! gives up the CPU through [`Scheduler`]. [`ProcessTable`] is the in-kernel
//! implementation of both.

use alloc::sync::Arc;
use alloc::vec::Vec;

pub mod manager;
pub mod process;

pub use manager::ProcessTable;
pub use process::{Process, ProcessId, ProcessState};

/// Pid resolution and run-queue access.
pub trait ProcessDirectory {
    /// Resolve a pid to a process that has not been reaped yet
    fn lookup(&self, pid: ProcessId) -> Option<Arc<Process>>;

    /// Children of `parent`, in ascending pid order
    fn children(&self, parent: ProcessId) -> Vec<Arc<Process>>;

    /// Every process that has not been reaped yet, in ascending pid order
    fn processes(&self) -> Vec<Arc<Process>>;

    /// Put a runnable process back on the run queue
    fn enqueue(&self, process: &Arc<Process>);
}

/// Voluntary scheduling point.
pub trait Scheduler {
    /// Give up the current turn of `current`.
    ///
    /// Returns once the scheduler runs `current` again.
    fn yield_current(&self, current: &Process);
}

/// Everything the delivery engine needs from the rest of the kernel
pub trait SignalHost: ProcessDirectory + Scheduler {}

impl<T: ProcessDirectory + Scheduler + ?Sized> SignalHost for T {}
