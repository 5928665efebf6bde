//! Signal injection: directed sends and kernel-raised signals

use super::constants::*;
use super::types::SigInfo;
use crate::error::SignalError;
use crate::process::{Process, ProcessDirectory, ProcessId, ProcessState};

/// Send `sig` to process `pid` on behalf of `sender` (None for the kernel).
///
/// Signal 0 only checks that the target exists. SIGCONT to a stopped target
/// resumes it right away and leaves nothing pending.
pub fn send_signal<D: ProcessDirectory + ?Sized>(
    dir: &D,
    sender: Option<ProcessId>,
    pid: ProcessId,
    sig: u32,
    code: i32,
) -> Result<(), SignalError> {
    if sig != 0 && !is_valid_signal(sig) {
        return Err(SignalError::InvalidSignal(sig as i64));
    }

    let target = match dir.lookup(pid) {
        Some(p) if !p.is_zombie() => p,
        _ => return Err(SignalError::NoSuchProcess(pid.as_u64() as i64)),
    };

    if sig == 0 {
        return Ok(());
    }

    let sender_pid = sender.map_or(KERNEL_SENDER, ProcessId::as_i32);
    let info = SigInfo::new(sig, code, sender_pid);

    if sig == SIGCONT {
        // The run-state lock is held until SIGCONT is either applied or
        // pending, so a concurrent stop cannot miss it.
        let mut state = target.lock_state();
        if *state == ProcessState::Stopped {
            *state = ProcessState::Runnable;
            drop(state);
            dir.enqueue(&target);
            log::info!("Process {} continued by SIGCONT", target.id);
            return Ok(());
        }
        target.signals.raise(sig, info);
    } else {
        target.signals.raise(sig, info);
    }
    log::debug!(
        "Signal {} ({}) sent to process {} by {}",
        sig,
        signal_name(sig),
        target.id,
        sender_pid
    );
    Ok(())
}

/// Raise `sig` on `target` from inside the kernel
pub fn send_kernel_signal(target: &Process, sig: u32, code: i32) {
    target.signals.raise(sig, SigInfo::from_kernel(sig, code));
    log::debug!(
        "Kernel raised signal {} ({}) on process {}",
        sig,
        signal_name(sig),
        target.id
    );
}
