//! Process table - pid allocation, fork/exec/reap and the run queue

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicU64, Ordering};

use crossbeam_queue::ArrayQueue;
use spin::Mutex;

use super::{Process, ProcessDirectory, ProcessId, ProcessState, Scheduler};
use crate::config::{RUN_QUEUE_CAPACITY, USER_STACK_SIZE, USER_STACK_TOP};
use crate::signal::delivery::{do_signal, Delivery};
use crate::signal::SignalState;
use crate::syscall::userptr::UserStackMemory;
use crate::task::TrapFrame;

/// All live and zombie processes, indexed by pid
pub struct ProcessTable {
    /// All processes indexed by PID
    processes: Mutex<BTreeMap<ProcessId, Arc<Process>>>,

    /// Next available PID
    next_pid: AtomicU64,

    /// Queue of runnable processes
    run_queue: ArrayQueue<ProcessId>,

    /// Number of voluntary yields taken
    yields: AtomicU64,
}

impl Default for ProcessTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessTable {
    pub fn new() -> Self {
        ProcessTable {
            processes: Mutex::new(BTreeMap::new()),
            next_pid: AtomicU64::new(1), // PIDs start at 1 (0 is kernel)
            run_queue: ArrayQueue::new(RUN_QUEUE_CAPACITY),
            yields: AtomicU64::new(0),
        }
    }

    fn alloc_pid(&self) -> ProcessId {
        ProcessId::new(self.next_pid.fetch_add(1, Ordering::SeqCst))
    }

    fn insert(&self, process: Process) -> Arc<Process> {
        let process = Arc::new(process);
        self.processes.lock().insert(process.id, process.clone());
        self.enqueue(&process);
        process
    }

    /// Create a parentless process with a fresh user stack
    pub fn spawn(&self, name: &str, entry: u64) -> Arc<Process> {
        let pid = self.alloc_pid();
        let process = Process::new(
            pid,
            None,
            String::from(name),
            TrapFrame::new_user(entry, USER_STACK_TOP),
            Box::new(UserStackMemory::below(USER_STACK_TOP, USER_STACK_SIZE)),
            SignalState::new(),
        );
        log::info!("Created process {} ({})", pid, name);
        self.insert(process)
    }

    /// Fork `parent`
    ///
    /// The child gets a copy of the saved context and address space, inherits
    /// dispositions and the blocked mask, and starts with nothing pending.
    /// The child sees 0 as the fork return value.
    pub fn fork(&self, parent: &Arc<Process>) -> Arc<Process> {
        let pid = self.alloc_pid();
        let mut trapframe = *parent.trapframe.lock();
        trapframe.set_return(0);
        let mm = parent.mm.lock().duplicate();
        let child = Process::new(
            pid,
            Some(parent.id),
            parent.name.clone(),
            trapframe,
            mm,
            parent.signals.fork(),
        );
        log::info!("Process {} forked child {}", parent.id, pid);
        self.insert(child)
    }

    /// Replace the program image of `process`
    ///
    /// Caught signals revert to their default action; ignored signals stay
    /// ignored. Pending signals and the blocked mask survive.
    pub fn exec(&self, process: &Process, entry: u64) {
        process.signals.exec_reset();
        *process.trapframe.lock() = TrapFrame::new_user(entry, USER_STACK_TOP);
        log::info!("Process {} exec at {:#x}", process.id, entry);
    }

    /// Reap a zombie child of `parent`; returns the child's exit status
    pub fn reap(&self, parent: ProcessId, child: ProcessId) -> Option<i32> {
        let mut processes = self.processes.lock();
        let status = match processes.get(&child) {
            Some(p) if p.parent == Some(parent) && p.is_zombie() => p.exit_status(),
            _ => return None,
        };
        processes.remove(&child);
        log::debug!("Process {} reaped child {} (status {})", parent, child, status);
        Some(status)
    }

    /// Pop the next runnable process off the run queue and mark it running
    pub fn next_runnable(&self) -> Option<Arc<Process>> {
        while let Some(pid) = self.run_queue.pop() {
            let Some(process) = self.lookup(pid) else {
                continue;
            };
            let mut state = process.lock_state();
            if *state == ProcessState::Runnable {
                *state = ProcessState::Running;
                drop(state);
                return Some(process);
            }
        }
        None
    }

    /// Kernel-exit path: run the delivery check and retire a killed process.
    pub fn return_to_user(&self, process: &Arc<Process>) -> Delivery {
        let delivery = do_signal(self, process);
        if let Some(status) = process.killed() {
            if !process.is_zombie() {
                process.exit(status);
            }
        }
        delivery
    }

    /// Number of voluntary yields taken so far
    pub fn yield_count(&self) -> u64 {
        self.yields.load(Ordering::Acquire)
    }

    /// Pids currently on the run queue, in queue order
    pub fn queued(&self) -> Vec<ProcessId> {
        let mut pids = Vec::with_capacity(self.run_queue.len());
        while let Some(pid) = self.run_queue.pop() {
            pids.push(pid);
        }
        for &pid in &pids {
            let _ = self.run_queue.push(pid);
        }
        pids
    }
}

impl ProcessDirectory for ProcessTable {
    fn lookup(&self, pid: ProcessId) -> Option<Arc<Process>> {
        self.processes.lock().get(&pid).cloned()
    }

    fn children(&self, parent: ProcessId) -> Vec<Arc<Process>> {
        self.processes
            .lock()
            .values()
            .filter(|p| p.parent == Some(parent))
            .cloned()
            .collect()
    }

    fn processes(&self) -> Vec<Arc<Process>> {
        self.processes.lock().values().cloned().collect()
    }

    fn enqueue(&self, process: &Arc<Process>) {
        if self.run_queue.push(process.id).is_err() {
            log::warn!("Run queue full, process {} not queued", process.id);
        }
    }
}

impl Scheduler for ProcessTable {
    fn yield_current(&self, current: &Process) {
        self.yields.fetch_add(1, Ordering::AcqRel);
        log::debug!("Process {} yielded ({:?})", current.id, current.state());
    }
}
