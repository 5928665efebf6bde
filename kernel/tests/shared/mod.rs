//! Shared harness for the signal scenario tests
//!
//! A [`World`] is one kernel instance: a process table, a tick clock and the
//! syscall entry point, driven the way the trap path drives them.

#![allow(dead_code)]

use std::sync::{Arc, Once};

use kernel::config::{USER_STACK_SIZE, USER_STACK_TOP};
use kernel::process::{Process, ProcessId, ProcessTable};
use kernel::signal::constants::SIG_DFL;
use kernel::signal::{Delivery, SigAction, SigInfo, SigSet};
use kernel::syscall::userptr::{copy_from_user, copy_to_user, UserCopy};
use kernel::syscall::{handle_syscall, SyscallNumber};
use kernel::time::{check_alarms, TickClock};
use log::LevelFilter;

/// Handler entry point used by the scenarios
pub const HANDLER_ENTRY: u64 = 0x2000;
/// Restorer (trampoline) address used by the scenarios
pub const RESTORER: u64 = 0x3000;
/// Program entry for spawned processes
pub const PROGRAM_ENTRY: u64 = 0x1000;

/// Scratch user memory at the low end of the stack region, away from frames
pub const SCRATCH: u64 = USER_STACK_TOP - USER_STACK_SIZE as u64 + 0x100;

static LOGGER: Once = Once::new();

fn print_line(line: &str) {
    println!("{}", line);
}

pub fn init_logging() {
    LOGGER.call_once(|| {
        if kernel::logger::init(LevelFilter::Debug).is_ok() {
            kernel::logger::set_sink(print_line);
        }
    });
}

pub struct World {
    pub table: ProcessTable,
    pub clock: TickClock,
}

impl World {
    pub fn new() -> Self {
        init_logging();
        World {
            table: ProcessTable::new(),
            clock: TickClock::new(),
        }
    }

    pub fn spawn(&self, name: &str) -> Arc<Process> {
        self.table.spawn(name, PROGRAM_ENTRY)
    }

    /// Issue a syscall from `p` and return the raw a0 result
    pub fn syscall(&self, p: &Process, num: SyscallNumber, args: [u64; 3]) -> i64 {
        {
            let mut tf = p.trapframe.lock();
            tf.a7 = num as u64;
            tf.a0 = args[0];
            tf.a1 = args[1];
            tf.a2 = args[2];
        }
        handle_syscall(&self.table, &self.clock, p).into_raw() as i64
    }

    pub fn kill(&self, sender: &Process, pid: ProcessId, sig: u32, code: i32) -> i64 {
        self.syscall(
            sender,
            SyscallNumber::Kill,
            [pid.as_u64(), sig as u64, code as u32 as u64],
        )
    }

    /// Install a user handler for `sig` through sigaction
    pub fn install_handler(&self, p: &Process, sig: u32, mask: SigSet) -> i64 {
        let act = SigAction {
            handler: HANDLER_ENTRY,
            mask: mask.bits(),
            restorer: RESTORER,
        };
        self.set_action(p, sig, act)
    }

    pub fn set_action(&self, p: &Process, sig: u32, act: SigAction) -> i64 {
        put(p, SCRATCH, &act);
        self.syscall(p, SyscallNumber::SigAction, [sig as u64, SCRATCH, 0])
    }

    pub fn reset_action(&self, p: &Process, sig: u32) -> i64 {
        self.set_action(p, sig, SigAction { handler: SIG_DFL, mask: 0, restorer: 0 })
    }

    pub fn sigprocmask(&self, p: &Process, how: i32, set: SigSet) -> (i64, SigSet) {
        put(p, SCRATCH, &set);
        let ret = self.syscall(
            p,
            SyscallNumber::SigProcMask,
            [how as u32 as u64, SCRATCH, SCRATCH + 8],
        );
        (ret, get(p, SCRATCH + 8))
    }

    pub fn sigpending(&self, p: &Process) -> SigSet {
        assert_eq!(self.syscall(p, SyscallNumber::SigPending, [SCRATCH, 0, 0]), 0);
        get(p, SCRATCH)
    }

    pub fn alarm(&self, p: &Process, secs: u64) -> i64 {
        self.syscall(p, SyscallNumber::Alarm, [secs, 0, 0])
    }

    /// The handler returning through its restorer
    pub fn sigreturn(&self, p: &Process) -> i64 {
        assert_eq!(p.trapframe.lock().ra, RESTORER);
        self.syscall(p, SyscallNumber::SigReturn, [0; 3])
    }

    /// Kernel-exit path of `p`
    pub fn return_to_user(&self, p: &Arc<Process>) -> Delivery {
        self.table.return_to_user(p)
    }

    /// Advance the clock one tick at a time, running the alarm check each tick
    pub fn run_ticks(&self, n: u64) -> usize {
        let mut fired = 0;
        for _ in 0..n {
            self.clock.tick();
            fired += check_alarms(&self.table, &self.clock);
        }
        fired
    }
}

pub fn put<T: UserCopy>(p: &Process, addr: u64, value: &T) {
    copy_to_user(&mut **p.mm.lock(), addr, value).expect("user write");
}

pub fn get<T: UserCopy>(p: &Process, addr: u64) -> T {
    copy_from_user(&**p.mm.lock(), addr).expect("user read")
}

/// SigInfo the running handler sees through its second argument
pub fn handler_info(p: &Process) -> SigInfo {
    let tf = *p.trapframe.lock();
    assert_eq!(tf.epc, HANDLER_ENTRY);
    get(p, tf.a1)
}
