//! Signal-related data structures

use core::ops::{BitAnd, BitOr, Not, Sub};

use super::constants::*;
use crate::error::SignalError;
use crate::syscall::userptr::UserCopy;

/// Fixed-width set of signal numbers in `SIGMIN..=SIGMAX`.
///
/// Bit `n - 1` stands for signal `n`. Bits outside the valid range are never
/// set by any constructor or operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct SigSet(u64);

impl SigSet {
    /// Every valid signal number
    pub const FULL: SigSet = SigSet(sig_mask(SIGMAX) | (sig_mask(SIGMAX) - 1));

    /// SIGKILL and SIGSTOP
    pub const UNCATCHABLE: SigSet = SigSet(UNCATCHABLE_SIGNALS);

    /// Signals no mask may hold: the uncatchable pair plus SIGCONT
    pub const UNBLOCKABLE: SigSet = SigSet(Self::UNCATCHABLE.0 | sig_mask(SIGCONT));

    pub const fn empty() -> Self {
        SigSet(0)
    }

    /// Build a set from a raw mask, dropping bits outside the valid range.
    pub const fn from_bits(bits: u64) -> Self {
        SigSet(bits & Self::FULL.0)
    }

    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Set containing only `sig` (empty for an invalid number).
    pub const fn single(sig: u32) -> Self {
        SigSet(sig_mask(sig))
    }

    #[inline]
    pub fn add(&mut self, sig: u32) {
        self.0 |= sig_mask(sig);
    }

    #[inline]
    pub fn remove(&mut self, sig: u32) {
        self.0 &= !sig_mask(sig);
    }

    #[inline]
    pub const fn contains(self, sig: u32) -> bool {
        let bit = sig_mask(sig);
        bit != 0 && (self.0 & bit) != 0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn union(self, other: SigSet) -> SigSet {
        SigSet(self.0 | other.0)
    }

    pub const fn intersection(self, other: SigSet) -> SigSet {
        SigSet(self.0 & other.0)
    }

    pub const fn difference(self, other: SigSet) -> SigSet {
        SigSet(self.0 & !other.0)
    }

    /// Same set with SIGKILL, SIGSTOP and SIGCONT removed, as stored in a
    /// blocked mask.
    pub const fn blockable(self) -> SigSet {
        self.difference(Self::UNBLOCKABLE)
    }

    /// Lowest signal number in the set
    pub const fn lowest(self) -> Option<u32> {
        if self.0 == 0 {
            None
        } else {
            Some(self.0.trailing_zeros() + 1)
        }
    }

    /// Signal numbers in ascending order
    pub fn iter(self) -> impl Iterator<Item = u32> {
        (SIGMIN..=SIGMAX).filter(move |&sig| self.contains(sig))
    }
}

impl BitOr for SigSet {
    type Output = SigSet;
    fn bitor(self, rhs: SigSet) -> SigSet {
        self.union(rhs)
    }
}

impl BitAnd for SigSet {
    type Output = SigSet;
    fn bitand(self, rhs: SigSet) -> SigSet {
        self.intersection(rhs)
    }
}

impl Sub for SigSet {
    type Output = SigSet;
    fn sub(self, rhs: SigSet) -> SigSet {
        self.difference(rhs)
    }
}

/// Complement within the valid signal range
impl Not for SigSet {
    type Output = SigSet;
    fn not(self) -> SigSet {
        SigSet::FULL.difference(self)
    }
}

impl FromIterator<u32> for SigSet {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        let mut set = SigSet::empty();
        for sig in iter {
            set.add(sig);
        }
        set
    }
}

// SAFETY: repr(transparent) over u64; every bit pattern is a valid value.
unsafe impl UserCopy for SigSet {}

/// How a signal is handled when it is delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Disposition {
    /// Kernel decides: terminate, except for the control signals
    #[default]
    Default,
    /// Discard on delivery
    Ignore,
    /// Enter `entry` in user mode with `mask` additionally blocked; the
    /// handler returns to `restorer`, which calls sigreturn
    Handler { entry: u64, mask: SigSet, restorer: u64 },
}

impl Disposition {
    #[inline]
    pub fn is_default(&self) -> bool {
        matches!(self, Disposition::Default)
    }

    #[inline]
    pub fn is_ignore(&self) -> bool {
        matches!(self, Disposition::Ignore)
    }

    #[inline]
    pub fn is_user_handler(&self) -> bool {
        matches!(self, Disposition::Handler { .. })
    }
}

/// Signal handler configuration as exchanged with user space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(C)]
pub struct SigAction {
    /// Handler address (SIG_DFL, SIG_IGN, or user function pointer)
    pub handler: u64,
    /// Signals to block during handler execution
    pub mask: u64,
    /// Trampoline the handler returns to
    pub restorer: u64,
}

// SAFETY: repr(C), three u64 fields, no padding.
unsafe impl UserCopy for SigAction {}

impl From<SigAction> for Disposition {
    /// Unblockable bits in the handler mask are dropped here, so applying the
    /// mask at dispatch can never block SIGKILL, SIGSTOP or SIGCONT.
    fn from(action: SigAction) -> Self {
        match action.handler {
            SIG_DFL => Disposition::Default,
            SIG_IGN => Disposition::Ignore,
            entry => Disposition::Handler {
                entry,
                mask: SigSet::from_bits(action.mask).blockable(),
                restorer: action.restorer,
            },
        }
    }
}

impl From<Disposition> for SigAction {
    fn from(disposition: Disposition) -> Self {
        match disposition {
            Disposition::Default => SigAction { handler: SIG_DFL, ..SigAction::default() },
            Disposition::Ignore => SigAction { handler: SIG_IGN, ..SigAction::default() },
            Disposition::Handler { entry, mask, restorer } => SigAction {
                handler: entry,
                mask: mask.bits(),
                restorer,
            },
        }
    }
}

/// Delivery metadata for the latest occurrence of a signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(C)]
pub struct SigInfo {
    /// Signal number
    pub signo: i32,
    /// Cause code supplied by the sender (exit code for SIGCHLD)
    pub code: i32,
    /// Sender pid, or `KERNEL_SENDER`
    pub pid: i32,
    /// Status word
    pub status: i32,
    /// Faulting address, when relevant
    pub addr: u64,
}

// SAFETY: repr(C), four i32 followed by a u64, no padding.
unsafe impl UserCopy for SigInfo {}

impl SigInfo {
    pub const fn new(sig: u32, code: i32, pid: i32) -> Self {
        SigInfo {
            signo: sig as i32,
            code,
            pid,
            status: 0,
            addr: 0,
        }
    }

    /// Metadata for a signal the kernel raises on its own behalf
    pub const fn from_kernel(sig: u32, code: i32) -> Self {
        Self::new(sig, code, KERNEL_SENDER)
    }
}

/// sigprocmask policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskHow {
    /// blocked |= set
    Block,
    /// blocked &= !set
    Unblock,
    /// blocked = set
    SetMask,
}

impl TryFrom<i32> for MaskHow {
    type Error = SignalError;

    fn try_from(how: i32) -> Result<Self, Self::Error> {
        match how {
            SIG_BLOCK => Ok(MaskHow::Block),
            SIG_UNBLOCK => Ok(MaskHow::Unblock),
            SIG_SETMASK => Ok(MaskHow::SetMask),
            other => Err(SignalError::InvalidHow(other)),
        }
    }
}

/// Validate a raw signal number from user space
pub fn parse_signal(raw: i64) -> Result<u32, SignalError> {
    if raw >= SIGMIN as i64 && raw <= SIGMAX as i64 {
        Ok(raw as u32)
    } else {
        Err(SignalError::InvalidSignal(raw))
    }
}
