//! System call dispatcher
//!
//! Routes system calls to their appropriate handlers based on the syscall number.

use super::errno::ENOSYS;
use super::signal;
use super::{SyscallNumber, SyscallResult};
use crate::process::{Process, SignalHost};
use crate::time::Clock;

/// Dispatch a system call to the appropriate handler
pub fn dispatch_syscall<H, C>(
    host: &H,
    clock: &C,
    current: &Process,
    syscall_num: u64,
    args: [u64; 3],
) -> SyscallResult
where
    H: SignalHost + ?Sized,
    C: Clock + ?Sized,
{
    // Convert syscall number
    let syscall = match SyscallNumber::from_u64(syscall_num) {
        Some(s) => s,
        None => {
            log::warn!("Invalid syscall number: {}", syscall_num);
            return SyscallResult::Err(ENOSYS as u64);
        }
    };
    let [arg1, arg2, arg3] = args;

    // Dispatch to appropriate handler
    match syscall {
        SyscallNumber::SigAction => signal::sys_sigaction(host, current, arg1 as i64, arg2, arg3),
        SyscallNumber::SigProcMask => signal::sys_sigprocmask(current, arg1 as i32, arg2, arg3),
        SyscallNumber::SigPending => signal::sys_sigpending(current, arg1),
        SyscallNumber::SigReturn => signal::sys_sigreturn(current),
        SyscallNumber::Kill => signal::sys_sigkill(host, current, arg1 as i64, arg2 as i64, arg3 as i32),
        SyscallNumber::Alarm => signal::sys_alarm(clock, current, arg1),
    }
}

/// Trap-path entry: decode the syscall from the saved context, run it and
/// store the result in a0.
pub fn handle_syscall<H, C>(host: &H, clock: &C, current: &Process) -> SyscallResult
where
    H: SignalHost + ?Sized,
    C: Clock + ?Sized,
{
    let (num, args) = {
        let tf = current.trapframe.lock();
        (tf.syscall_num(), tf.args())
    };
    let result = dispatch_syscall(host, clock, current, num, args);
    current.trapframe.lock().set_return(result.into_raw());
    result
}
