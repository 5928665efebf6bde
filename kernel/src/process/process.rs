//! Process representation

use alloc::boxed::Box;
use alloc::string::String;
use core::sync::atomic::{AtomicI32, Ordering};

use spin::{Mutex, MutexGuard};

use crate::signal::SignalState;
use crate::syscall::userptr::UserMemory;
use crate::task::TrapFrame;
use crate::time::AlarmTimer;

/// Process ID type
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProcessId(u64);

impl ProcessId {
    pub const fn new(id: u64) -> Self {
        ProcessId(id)
    }

    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Pid as carried in signal metadata
    pub const fn as_i32(self) -> i32 {
        self.0 as i32
    }
}

impl core::fmt::Display for ProcessId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Process run-state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    /// Ready to run, waiting on the run queue
    Runnable,
    /// Currently running
    Running,
    /// Blocked waiting for something other than a signal
    Sleeping,
    /// Suspended by SIGSTOP until a SIGCONT is sent
    Stopped,
    /// Exited, waiting for the parent to reap it
    Zombie,
}

/// A process as seen by the signal subsystem
///
/// Lock order is `state`, then `trapframe`, then `mm`.
pub struct Process {
    /// Unique process identifier
    pub id: ProcessId,

    /// Parent process ID (if any)
    pub parent: Option<ProcessId>,

    /// Process name (for debugging)
    pub name: String,

    /// Run-state, guarded by the per-process state lock
    state: Mutex<ProcessState>,

    /// Saved user context, rewritten by signal delivery and sigreturn
    pub trapframe: Mutex<TrapFrame>,

    /// User address space; every user copy happens with this lock held
    pub mm: Mutex<Box<dyn UserMemory>>,

    /// Signal dispositions, mask, pending set and metadata
    pub signals: SignalState,

    /// alarm() timer
    pub alarm: Mutex<AlarmTimer>,

    /// Voluntary exit code
    exit_code: AtomicI32,

    /// Killed-by-signal status, 0 while alive
    killed: AtomicI32,
}

impl Process {
    pub fn new(
        id: ProcessId,
        parent: Option<ProcessId>,
        name: String,
        trapframe: TrapFrame,
        mm: Box<dyn UserMemory>,
        signals: SignalState,
    ) -> Self {
        Process {
            id,
            parent,
            name,
            state: Mutex::new(ProcessState::Runnable),
            trapframe: Mutex::new(trapframe),
            mm: Mutex::new(mm),
            signals,
            alarm: Mutex::new(AlarmTimer::new()),
            exit_code: AtomicI32::new(0),
            killed: AtomicI32::new(0),
        }
    }

    /// Current run-state
    pub fn state(&self) -> ProcessState {
        *self.state.lock()
    }

    /// Take the per-process state lock
    pub fn lock_state(&self) -> MutexGuard<'_, ProcessState> {
        self.state.lock()
    }

    pub fn set_state(&self, state: ProcessState) {
        *self.state.lock() = state;
    }

    pub fn is_zombie(&self) -> bool {
        self.state() == ProcessState::Zombie
    }

    pub fn is_stopped(&self) -> bool {
        self.state() == ProcessState::Stopped
    }

    /// Mark the process killed with a killed-by-signal status.
    ///
    /// The trap path checks [`Process::killed`] before returning to user mode
    /// and exits the process with that status.
    pub fn set_killed(&self, status: i32) {
        self.killed.store(status, Ordering::Release);
    }

    /// Killed-by-signal status, if the process was killed
    pub fn killed(&self) -> Option<i32> {
        match self.killed.load(Ordering::Acquire) {
            0 => None,
            status => Some(status),
        }
    }

    /// Terminate the process and leave it for the parent to reap.
    pub fn exit(&self, code: i32) {
        self.exit_code.store(code, Ordering::Release);
        self.alarm.lock().disarm();
        *self.state.lock() = ProcessState::Zombie;
        log::info!("Process {} ({}) exited with {}", self.id, self.name, self.exit_status());
    }

    /// Status reported to the parent: the killed status if the process was
    /// killed by a signal, otherwise its exit code.
    pub fn exit_status(&self) -> i32 {
        self.killed().unwrap_or_else(|| self.exit_code.load(Ordering::Acquire))
    }
}
