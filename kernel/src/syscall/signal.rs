//! Signal-related system calls
//!
//! Implements: sigaction, sigprocmask, sigpending, sigreturn, kill, alarm
//!
//! User pointers are exchanged through the process's address space with the
//! address-space lock held; a null pointer means "not requested".

use super::userptr::{copy_from_user, copy_to_user};
use super::SyscallResult;
use crate::error::SignalError;
use crate::process::{Process, ProcessDirectory, ProcessId};
use crate::signal::delivery::set_action;
use crate::signal::frame::pop_signal_frame;
use crate::signal::send::send_signal;
use crate::signal::types::{parse_signal, Disposition, MaskHow, SigAction, SigSet};
use crate::time::Clock;

fn finish(name: &str, current: &Process, result: Result<u64, SignalError>) -> SyscallResult {
    match result {
        Ok(value) => SyscallResult::Ok(value),
        Err(e) => {
            log::warn!("sys_{}: process {}: {}", name, current.id, e);
            SyscallResult::Err(e.errno())
        }
    }
}

/// sigaction(sig, act, oldact) - examine and change a signal action
///
/// # Arguments
/// * `sig` - Signal number
/// * `act` - Pointer to the new SigAction (0 to leave it unchanged)
/// * `oldact` - Pointer that receives the previous SigAction (0 to skip)
///
/// # Returns
/// * 0 on success
/// * -EINVAL for an invalid signal number
/// * -EFAULT for an inaccessible pointer; nothing is changed
pub fn sys_sigaction<D: ProcessDirectory + ?Sized>(
    dir: &D,
    current: &Process,
    sig: i64,
    act: u64,
    oldact: u64,
) -> SyscallResult {
    finish("sigaction", current, sigaction(dir, current, sig, act, oldact))
}

fn sigaction<D: ProcessDirectory + ?Sized>(
    dir: &D,
    current: &Process,
    sig: i64,
    act: u64,
    oldact: u64,
) -> Result<u64, SignalError> {
    let sig = parse_signal(sig)?;

    let new = {
        let mut mm = current.mm.lock();
        let new = if act != 0 {
            Some(Disposition::from(copy_from_user::<SigAction>(&**mm, act)?))
        } else {
            None
        };
        if oldact != 0 {
            let old = SigAction::from(current.signals.disposition(sig)?);
            copy_to_user(&mut **mm, oldact, &old)?;
        }
        new
    };

    if let Some(disposition) = new {
        set_action(dir, current, sig, disposition)?;
    }
    Ok(0)
}

/// sigprocmask(how, set, oldset) - examine and change blocked signals
///
/// SIGKILL, SIGSTOP and SIGCONT are silently removed from `set`.
///
/// # Returns
/// * 0 on success
/// * -EINVAL for an unknown `how` when `set` is given
/// * -EFAULT for an inaccessible pointer; nothing is changed
pub fn sys_sigprocmask(current: &Process, how: i32, set: u64, oldset: u64) -> SyscallResult {
    finish("sigprocmask", current, sigprocmask(current, how, set, oldset))
}

fn sigprocmask(current: &Process, how: i32, set: u64, oldset: u64) -> Result<u64, SignalError> {
    let how = if set != 0 {
        Some(MaskHow::try_from(how)?)
    } else {
        None
    };

    let mut mm = current.mm.lock();
    let new: Option<SigSet> = if set != 0 {
        Some(copy_from_user(&**mm, set)?)
    } else {
        None
    };
    if oldset != 0 {
        copy_to_user(&mut **mm, oldset, &current.signals.blocked())?;
    }
    if let (Some(how), Some(new)) = (how, new) {
        let old = current.signals.apply_mask(how, new);
        log::debug!(
            "Process {} sigprocmask {:?} {:#x}: {:#x} -> {:#x}",
            current.id,
            how,
            new.bits(),
            old.bits(),
            current.signals.blocked().bits()
        );
    }
    Ok(0)
}

/// sigpending(set) - examine pending signals
pub fn sys_sigpending(current: &Process, set: u64) -> SyscallResult {
    let result = {
        let mut mm = current.mm.lock();
        copy_to_user(&mut **mm, set, &current.signals.pending()).map(|()| 0)
    };
    finish("sigpending", current, result)
}

/// sigreturn() - return from a signal handler
///
/// Restores the context and blocked mask saved in the handler frame at the
/// current user stack pointer. The returned value is the restored a0, so
/// writing it back as the syscall result leaves the interrupted context
/// intact.
pub fn sys_sigreturn(current: &Process) -> SyscallResult {
    finish("sigreturn", current, sigreturn(current))
}

fn sigreturn(current: &Process) -> Result<u64, SignalError> {
    let mut tf = current.trapframe.lock();
    let mask = {
        let mm = current.mm.lock();
        pop_signal_frame(&**mm, &mut *tf)?
    };
    current.signals.set_blocked(mask);
    log::debug!(
        "Process {} sigreturn to {:#x}, blocked {:#x}",
        current.id,
        tf.epc,
        current.signals.blocked().bits()
    );
    Ok(tf.a0)
}

/// kill(pid, sig, code) - send a signal to a process
///
/// # Returns
/// * 0 on success
/// * -EINVAL for an invalid signal number
/// * -ESRCH if no live process has that pid
pub fn sys_sigkill<D: ProcessDirectory + ?Sized>(
    dir: &D,
    current: &Process,
    pid: i64,
    sig: i64,
    code: i32,
) -> SyscallResult {
    finish("sigkill", current, sigkill(dir, current, pid, sig, code))
}

fn sigkill<D: ProcessDirectory + ?Sized>(
    dir: &D,
    current: &Process,
    pid: i64,
    sig: i64,
    code: i32,
) -> Result<u64, SignalError> {
    let sig = if sig == 0 { 0 } else { parse_signal(sig)? };
    if pid <= 0 {
        return Err(SignalError::NoSuchProcess(pid));
    }
    send_signal(dir, Some(current.id), ProcessId::new(pid as u64), sig, code)?;
    Ok(0)
}

/// alarm(secs) - arm (or with 0 disarm) the SIGALRM timer
///
/// Returns the duration of the previously armed alarm, 0 if none.
pub fn sys_alarm<C: Clock + ?Sized>(clock: &C, current: &Process, secs: u64) -> SyscallResult {
    let previous = current.alarm.lock().set(clock.ticks(), secs);
    log::debug!("Process {} alarm({}) previous {}", current.id, secs, previous);
    SyscallResult::Ok(previous)
}
