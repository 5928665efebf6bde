//! Signal handler frames on the user stack
//!
//! Delivering a signal to a user handler pushes one [`SignalFrameLayout`]
//! record below the interrupted stack pointer:
//!
//! ```text
//!   new_sp + CONTEXT_OFFSET  saved TrapFrame (interrupted context)
//!   new_sp + MASK_OFFSET     blocked mask before the handler ran
//!   new_sp + INFO_OFFSET     SigInfo handed to the handler in a1
//! ```
//!
//! The handler returns into its restorer, which issues sigreturn with the
//! stack pointer still at `new_sp`; [`pop_signal_frame`] reads the record back.

use core::mem::size_of;

use super::types::{SigInfo, SigSet};
use crate::config::SIGNAL_FRAME_ALIGN;
use crate::error::SignalError;
use crate::syscall::userptr::{copy_from_user, copy_to_user, UserMemory};
use crate::task::TrapFrame;

/// Offsets of the handler frame fields relative to the frame base
pub struct SignalFrameLayout;

impl SignalFrameLayout {
    pub const CONTEXT_OFFSET: u64 = 0;
    pub const MASK_OFFSET: u64 = Self::CONTEXT_OFFSET + size_of::<TrapFrame>() as u64;
    pub const INFO_OFFSET: u64 = Self::MASK_OFFSET + size_of::<SigSet>() as u64;
    pub const SIZE: u64 = Self::INFO_OFFSET + size_of::<SigInfo>() as u64;

    /// Frame base for a signal interrupting a context with stack pointer `sp`
    pub fn frame_base(sp: u64) -> Result<u64, SignalError> {
        let base = sp
            .checked_sub(Self::SIZE)
            .ok_or(SignalError::BadAddress(sp))?;
        Ok(base & !(SIGNAL_FRAME_ALIGN - 1))
    }
}

#[inline]
fn field(base: u64, offset: u64) -> Result<u64, SignalError> {
    base.checked_add(offset).ok_or(SignalError::BadAddress(base))
}

/// Push a handler frame and redirect `tf` into the handler.
///
/// Nothing in `tf` changes unless every copy to user memory succeeded.
/// Returns the new stack pointer.
pub fn push_signal_frame(
    mm: &mut dyn UserMemory,
    tf: &mut TrapFrame,
    old_mask: SigSet,
    info: &SigInfo,
    entry: u64,
    restorer: u64,
) -> Result<u64, SignalError> {
    let new_sp = SignalFrameLayout::frame_base(tf.sp)?;

    copy_to_user(mm, new_sp + SignalFrameLayout::CONTEXT_OFFSET, &*tf)?;
    copy_to_user(mm, new_sp + SignalFrameLayout::MASK_OFFSET, &old_mask)?;
    copy_to_user(mm, new_sp + SignalFrameLayout::INFO_OFFSET, info)?;

    tf.epc = entry;
    tf.sp = new_sp;
    tf.a0 = info.signo as u64;
    tf.a1 = new_sp + SignalFrameLayout::INFO_OFFSET;
    tf.ra = restorer;

    Ok(new_sp)
}

/// Read the frame at `tf.sp` back into `tf` and return the saved mask.
///
/// On failure `tf` is left untouched.
pub fn pop_signal_frame(mm: &dyn UserMemory, tf: &mut TrapFrame) -> Result<SigSet, SignalError> {
    let base = tf.sp;
    let saved: TrapFrame = copy_from_user(mm, field(base, SignalFrameLayout::CONTEXT_OFFSET)?)?;
    let mask: SigSet = copy_from_user(mm, field(base, SignalFrameLayout::MASK_OFFSET)?)?;
    *tf = saved;
    Ok(mask)
}
