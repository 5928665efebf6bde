//! Signal delivery to userspace
//!
//! This module handles delivering pending signals to processes when they
//! return to userspace from syscalls or interrupts.

use super::constants::*;
use super::frame::push_signal_frame;
use super::types::*;
use crate::error::SignalError;
use crate::process::{Process, ProcessDirectory, ProcessState, SignalHost};

/// Outcome of one delivery check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// No deliverable signal changed the process
    Nothing,
    /// The process was marked killed; the trap path must exit it with `status`
    Killed { sig: u32, status: i32 },
    /// The process stopped and later resumed from the scheduler
    Stopped,
    /// A handler frame was installed; user mode resumes at `entry`
    Handler { sig: u32, entry: u64 },
}

/// Synthesize SIGCHLD for the first zombie child of `process`.
///
/// Does nothing while a SIGCHLD is already pending. The metadata carries the
/// child's exit status as the code and the child's pid as the sender.
/// Returns true if a SIGCHLD was raised.
pub fn check_sigchld<D: ProcessDirectory + ?Sized>(dir: &D, process: &Process) -> bool {
    if process.signals.is_pending(SIGCHLD) {
        return false;
    }
    let Some(child) = dir.children(process.id).into_iter().find(|c| c.is_zombie()) else {
        return false;
    };
    let status = child.exit_status();
    process
        .signals
        .raise(SIGCHLD, SigInfo::new(SIGCHLD, status, child.id.as_i32()));
    log::debug!(
        "SIGCHLD raised for process {}: child {} status {}",
        process.id,
        child.id,
        status
    );
    true
}

/// Deliver pending signals to a process
///
/// Called on the kernel-exit path before returning to userspace. SIGCHLD is
/// synthesized first, then pending unblocked signals are scanned in
/// ascending order. At most one handler frame is installed per call.
pub fn do_signal<H: SignalHost + ?Sized>(host: &H, process: &Process) -> Delivery {
    check_sigchld(host, process);

    // Process all deliverable signals in a loop (avoids unbounded recursion)
    loop {
        let sig = match process.signals.next_deliverable() {
            Some(s) => s,
            None => return Delivery::Nothing,
        };

        match sig {
            SIGKILL => {
                process.signals.clear_pending(sig);
                return kill(process, sig);
            }
            SIGSTOP => {
                process.signals.clear_pending(sig);
                if stop(host, process) {
                    return Delivery::Stopped;
                }
                continue;
            }
            SIGCONT => {
                // Resumption already happened at send time
                process.signals.clear_pending(sig);
                continue;
            }
            _ => {}
        }

        let (action, info, blocked) = process.signals.take_for_dispatch(sig);

        log::debug!(
            "Delivering signal {} ({}) to process {}, action={:?}",
            sig,
            signal_name(sig),
            process.id,
            action
        );

        match action {
            Disposition::Ignore => {
                // Signal ignored - continue loop to check for more signals
            }
            Disposition::Default => return kill(process, sig),
            Disposition::Handler { entry, mask, restorer } => {
                return deliver_to_user_handler(process, sig, info, blocked, entry, mask, restorer);
            }
        }
    }
}

fn kill(process: &Process, sig: u32) -> Delivery {
    let status = killed_status(sig);
    process.set_killed(status);
    log::info!(
        "Process {} terminated by signal {} ({})",
        process.id,
        sig,
        signal_name(sig)
    );
    Delivery::Killed { sig, status }
}

/// Suspend `process` and yield. Returns false if a SIGCONT arrived since the
/// SIGSTOP was taken; that SIGCONT is consumed and the process keeps running.
///
/// Senders of SIGCONT check the run-state under the same lock, so a continue
/// either sees `Stopped` and resumes the process or is pending here.
fn stop<H: SignalHost + ?Sized>(host: &H, process: &Process) -> bool {
    {
        let mut state = process.lock_state();
        if process.signals.is_pending(SIGCONT) {
            process.signals.clear_pending(SIGCONT);
            drop(state);
            log::info!("Process {} SIGSTOP cancelled by pending SIGCONT", process.id);
            return false;
        }
        *state = ProcessState::Stopped;
    }
    log::info!("Process {} stopped by SIGSTOP", process.id);
    host.yield_current(process);
    true
}

/// Push a handler frame and redirect the saved context into the handler.
///
/// A frame that cannot be written to the user stack means the signal cannot
/// be delivered; the process is killed by it instead.
fn deliver_to_user_handler(
    process: &Process,
    sig: u32,
    info: SigInfo,
    blocked: SigSet,
    entry: u64,
    mask: SigSet,
    restorer: u64,
) -> Delivery {
    let info = SigInfo {
        signo: sig as i32,
        status: 0,
        addr: 0,
        ..info
    };

    let pushed: Result<u64, SignalError> = {
        let mut tf = process.trapframe.lock();
        let mut mm = process.mm.lock();
        push_signal_frame(&mut **mm, &mut *tf, blocked, &info, entry, restorer)
    };

    match pushed {
        Ok(new_sp) => {
            process
                .signals
                .set_blocked(blocked | mask | SigSet::single(sig));
            log::debug!(
                "Signal {} frame for process {} at {:#x}, handler {:#x}",
                sig,
                process.id,
                new_sp,
                entry
            );
            Delivery::Handler { sig, entry }
        }
        Err(e) => {
            log::error!(
                "Process {}: cannot push frame for signal {} ({}): {}",
                process.id,
                sig,
                signal_name(sig),
                e
            );
            kill(process, sig)
        }
    }
}

/// Install a disposition for `sig` and return the previous one.
///
/// Installing a SIGCHLD handler rescans the children so a child that exited
/// earlier is still reported. The rescan takes other processes' state locks,
/// so callers must not hold this process's address-space lock.
pub fn set_action<D: ProcessDirectory + ?Sized>(
    dir: &D,
    process: &Process,
    sig: u32,
    disposition: Disposition,
) -> Result<Disposition, SignalError> {
    let old = process.signals.set_disposition(sig, disposition)?;
    log::info!(
        "Process {} set {} ({}) to {:?}",
        process.id,
        sig,
        signal_name(sig),
        disposition
    );
    if sig == SIGCHLD && disposition.is_user_handler() {
        check_sigchld(dir, process);
    }
    Ok(old)
}
