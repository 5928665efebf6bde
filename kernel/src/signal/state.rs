//! Per-process signal state
//!
//! `pending` is a single atomic word, so pending and deliverable queries never
//! take a lock. Dispositions, the blocked mask and the metadata slots sit
//! behind a short spin lock. Every change to a pending bit that goes with a
//! metadata slot (a raise, or the delivery engine taking a signal) happens
//! inside that lock, so an occurrence is never cleared without its metadata
//! having been handed out.

use core::sync::atomic::{AtomicU64, Ordering};

use spin::Mutex;

use super::constants::*;
use super::types::{Disposition, MaskHow, SigInfo, SigSet};
use crate::error::SignalError;

struct SignalTables {
    /// Indexed by signal number - 1
    actions: [Disposition; NSIG],
    blocked: SigSet,
    /// Latest metadata per signal; overwritten on every raise
    infos: [SigInfo; NSIG],
}

impl SignalTables {
    const fn new() -> Self {
        SignalTables {
            actions: [Disposition::Default; NSIG],
            blocked: SigSet::empty(),
            infos: [SigInfo::new(0, 0, 0); NSIG],
        }
    }
}

#[inline]
fn slot(sig: u32) -> usize {
    (sig - SIGMIN) as usize
}

/// Signal dispositions, blocked mask, pending set and metadata of one process
pub struct SignalState {
    pending: AtomicU64,
    tables: Mutex<SignalTables>,
}

impl Default for SignalState {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalState {
    /// All dispositions default, nothing blocked or pending
    pub const fn new() -> Self {
        SignalState {
            pending: AtomicU64::new(0),
            tables: Mutex::new(SignalTables::new()),
        }
    }

    /// Signal state for a forked child
    ///
    /// Dispositions and the blocked mask are inherited. Pending signals and
    /// their metadata are not.
    pub fn fork(&self) -> Self {
        let parent = self.tables.lock();
        let mut tables = SignalTables::new();
        tables.actions = parent.actions;
        tables.blocked = parent.blocked;
        SignalState {
            pending: AtomicU64::new(0),
            tables: Mutex::new(tables),
        }
    }

    /// Reset handlers after exec
    ///
    /// Caught signals go back to the default action; ignored signals stay
    /// ignored.
    pub fn exec_reset(&self) {
        let mut tables = self.tables.lock();
        for action in tables.actions.iter_mut() {
            if !action.is_ignore() {
                *action = Disposition::Default;
            }
        }
    }

    /// Pending signals bitmap
    #[inline]
    pub fn pending(&self) -> SigSet {
        SigSet::from_bits(self.pending.load(Ordering::Acquire))
    }

    #[inline]
    pub fn is_pending(&self, sig: u32) -> bool {
        self.pending().contains(sig)
    }

    /// Record `info` for `sig` and mark it pending.
    ///
    /// A raise of an already pending signal overwrites its metadata and
    /// leaves a single pending occurrence.
    pub fn raise(&self, sig: u32, info: SigInfo) {
        if !is_valid_signal(sig) {
            return;
        }
        let mut tables = self.tables.lock();
        tables.infos[slot(sig)] = info;
        self.pending.fetch_or(sig_mask(sig), Ordering::AcqRel);
        drop(tables);
        #[cfg(feature = "trace_pending")]
        log::debug!("pending += {} ({})", sig, signal_name(sig));
    }

    /// Clear a pending signal that carries no metadata for delivery
    /// (SIGKILL, SIGSTOP, SIGCONT)
    #[inline]
    pub fn clear_pending(&self, sig: u32) {
        self.pending.fetch_and(!sig_mask(sig), Ordering::AcqRel);
        #[cfg(feature = "trace_pending")]
        log::debug!("pending -= {} ({})", sig, signal_name(sig));
    }

    /// Blocked signals bitmap (sigprocmask)
    #[inline]
    pub fn blocked(&self) -> SigSet {
        self.tables.lock().blocked
    }

    #[inline]
    pub fn is_blocked(&self, sig: u32) -> bool {
        self.blocked().contains(sig)
    }

    /// Apply `set` to the blocked mask according to `how` and return the
    /// previous mask. SIGKILL, SIGSTOP and SIGCONT are never blocked.
    pub fn apply_mask(&self, how: MaskHow, set: SigSet) -> SigSet {
        let set = set.blockable();
        let mut tables = self.tables.lock();
        let old = tables.blocked;
        tables.blocked = match how {
            MaskHow::Block => old | set,
            MaskHow::Unblock => old - set,
            MaskHow::SetMask => set,
        };
        old
    }

    /// Replace the blocked mask (used when a handler frame is installed or
    /// unwound)
    pub fn set_blocked(&self, mask: SigSet) {
        self.tables.lock().blocked = mask.blockable();
    }

    /// Get the disposition for a signal
    pub fn disposition(&self, sig: u32) -> Result<Disposition, SignalError> {
        if !is_valid_signal(sig) {
            return Err(SignalError::InvalidSignal(sig as i64));
        }
        Ok(self.tables.lock().actions[slot(sig)])
    }

    /// Install a disposition and return the previous one
    pub fn set_disposition(
        &self,
        sig: u32,
        disposition: Disposition,
    ) -> Result<Disposition, SignalError> {
        if !is_valid_signal(sig) {
            return Err(SignalError::InvalidSignal(sig as i64));
        }
        let mut tables = self.tables.lock();
        Ok(core::mem::replace(&mut tables.actions[slot(sig)], disposition))
    }

    /// Latest metadata recorded for `sig`
    pub fn info(&self, sig: u32) -> Option<SigInfo> {
        if !is_valid_signal(sig) {
            return None;
        }
        Some(self.tables.lock().infos[slot(sig)])
    }

    /// Take `sig` for dispatch: clear its pending bit and return its
    /// disposition, metadata and the blocked mask, all in one locked step.
    ///
    /// A raise that lands after this call leaves the signal pending again
    /// with the newer metadata.
    pub(crate) fn take_for_dispatch(&self, sig: u32) -> (Disposition, SigInfo, SigSet) {
        let tables = self.tables.lock();
        self.pending.fetch_and(!sig_mask(sig), Ordering::AcqRel);
        #[cfg(feature = "trace_pending")]
        log::debug!("pending -= {} ({}) for dispatch", sig, signal_name(sig));
        (tables.actions[slot(sig)], tables.infos[slot(sig)], tables.blocked)
    }

    /// Get the next deliverable signal (lowest number first)
    ///
    /// Returns None if no signals are pending and unblocked
    pub fn next_deliverable(&self) -> Option<u32> {
        let blocked = self.blocked();
        (self.pending() - blocked).lowest()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HANDLER: Disposition = Disposition::Handler {
        entry: 0x4000,
        mask: SigSet::empty(),
        restorer: 0x5000,
    };

    #[test]
    fn test_new_state_is_default() {
        let state = SignalState::new();
        assert!(state.pending().is_empty());
        assert!(state.blocked().is_empty());
        for sig in SIGMIN..=SIGMAX {
            assert_eq!(state.disposition(sig), Ok(Disposition::Default));
            assert_eq!(state.info(sig), Some(SigInfo::default()));
        }
    }

    #[test]
    fn test_raise_coalesces_and_keeps_last_metadata() {
        let state = SignalState::new();
        state.raise(SIGUSR1, SigInfo::new(SIGUSR1, 1, 100));
        state.raise(SIGUSR1, SigInfo::new(SIGUSR1, 2, 200));
        assert_eq!(state.pending(), SigSet::single(SIGUSR1));
        let info = state.info(SIGUSR1).unwrap();
        assert_eq!((info.code, info.pid), (2, 200));
    }

    #[test]
    fn test_mask_policies_never_block_kill_or_stop() {
        for how in [MaskHow::Block, MaskHow::Unblock, MaskHow::SetMask] {
            let state = SignalState::new();
            state.apply_mask(how, SigSet::FULL);
            assert!(!state.is_blocked(SIGKILL));
            assert!(!state.is_blocked(SIGSTOP));
        }
    }

    #[test]
    fn test_mask_policies() {
        let state = SignalState::new();
        let old = state.apply_mask(MaskHow::Block, SigSet::single(SIGUSR1) | SigSet::single(SIGUSR2));
        assert!(old.is_empty());
        let old = state.apply_mask(MaskHow::Unblock, SigSet::single(SIGUSR1));
        assert_eq!(old.iter().count(), 2);
        assert_eq!(state.blocked(), SigSet::single(SIGUSR2));
        state.apply_mask(MaskHow::SetMask, SigSet::single(SIGINT));
        assert_eq!(state.blocked(), SigSet::single(SIGINT));
    }

    #[test]
    fn test_next_deliverable_skips_blocked() {
        let state = SignalState::new();
        state.raise(SIGINT, SigInfo::from_kernel(SIGINT, 0));
        state.raise(SIGTERM, SigInfo::from_kernel(SIGTERM, 0));
        state.apply_mask(MaskHow::Block, SigSet::single(SIGINT));
        assert_eq!(state.next_deliverable(), Some(SIGTERM));
        state.clear_pending(SIGTERM);
        assert_eq!(state.next_deliverable(), None);
        assert!(state.is_pending(SIGINT));
    }

    #[test]
    fn test_mask_never_holds_sigcont() {
        let state = SignalState::new();
        state.apply_mask(MaskHow::Block, SigSet::single(SIGCONT) | SigSet::single(SIGUSR1));
        assert_eq!(state.blocked(), SigSet::single(SIGUSR1));
        state.set_blocked(SigSet::FULL);
        assert!(!state.is_blocked(SIGCONT));
        state.raise(SIGCONT, SigInfo::from_kernel(SIGCONT, 0));
        assert_eq!(state.next_deliverable(), Some(SIGCONT));
    }

    #[test]
    fn test_raise_after_take_stays_pending_with_new_metadata() {
        let state = SignalState::new();
        state.set_disposition(SIGUSR1, HANDLER).unwrap();
        state.raise(SIGUSR1, SigInfo::new(SIGUSR1, 1, 10));

        let (action, info, _) = state.take_for_dispatch(SIGUSR1);
        assert_eq!(action, HANDLER);
        assert_eq!(info.code, 1);
        assert!(!state.is_pending(SIGUSR1));

        state.raise(SIGUSR1, SigInfo::new(SIGUSR1, 2, 20));
        assert!(state.is_pending(SIGUSR1));
        let (_, info, _) = state.take_for_dispatch(SIGUSR1);
        assert_eq!((info.code, info.pid), (2, 20));
    }

    #[test]
    fn test_concurrent_raise_never_loses_last_occurrence() {
        const RAISES: i32 = 2000;
        let state = SignalState::new();
        let mut last_taken = 0;
        std::thread::scope(|s| {
            s.spawn(|| {
                for code in 1..=RAISES {
                    state.raise(SIGUSR1, SigInfo::new(SIGUSR1, code, 7));
                }
            });
            for _ in 0..RAISES {
                if state.is_pending(SIGUSR1) {
                    let (_, info, _) = state.take_for_dispatch(SIGUSR1);
                    assert!(info.code > last_taken);
                    last_taken = info.code;
                }
            }
        });
        // The final raise is either still pending or was the last one taken.
        if state.is_pending(SIGUSR1) {
            assert_eq!(state.take_for_dispatch(SIGUSR1).1.code, RAISES);
        } else {
            assert_eq!(last_taken, RAISES);
        }
    }

    #[test]
    fn test_fork_inherits_actions_and_mask_not_pending() {
        let parent = SignalState::new();
        parent.set_disposition(SIGUSR1, HANDLER).unwrap();
        parent.set_disposition(SIGTERM, Disposition::Ignore).unwrap();
        parent.apply_mask(MaskHow::Block, SigSet::single(SIGINT));
        parent.raise(SIGUSR2, SigInfo::new(SIGUSR2, 5, 1));

        let child = parent.fork();
        assert_eq!(child.disposition(SIGUSR1), Ok(HANDLER));
        assert_eq!(child.disposition(SIGTERM), Ok(Disposition::Ignore));
        assert_eq!(child.blocked(), parent.blocked());
        assert!(child.pending().is_empty());
        assert_eq!(child.info(SIGUSR2), Some(SigInfo::default()));
    }

    #[test]
    fn test_exec_reset_keeps_only_ignore() {
        let state = SignalState::new();
        state.set_disposition(SIGUSR1, HANDLER).unwrap();
        state.set_disposition(SIGPIPE, Disposition::Ignore).unwrap();
        state.exec_reset();
        assert_eq!(state.disposition(SIGUSR1), Ok(Disposition::Default));
        assert_eq!(state.disposition(SIGPIPE), Ok(Disposition::Ignore));
    }

    #[test]
    fn test_out_of_range_disposition_rejected() {
        let state = SignalState::new();
        assert_eq!(
            state.set_disposition(0, Disposition::Ignore),
            Err(SignalError::InvalidSignal(0))
        );
        assert_eq!(state.disposition(SIGMAX + 1), Err(SignalError::InvalidSignal(32)));
    }
}
