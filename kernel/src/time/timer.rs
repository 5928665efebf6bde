//! Monotonic tick counter driven by the timer interrupt.
//!
//! The kernel owns one `TickClock`, advances it from its timer interrupt
//! handler and passes it as a [`Clock`] to the alarm checks and syscalls.

use core::sync::atomic::{AtomicU64, Ordering};

/// Source of monotonic time in timer ticks.
pub trait Clock {
    /// Raw tick counter
    fn ticks(&self) -> u64;
}

/// Tick counter incremented by the timer interrupt
pub struct TickClock {
    ticks: AtomicU64,
}

impl Default for TickClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TickClock {
    pub const fn new() -> Self {
        TickClock {
            ticks: AtomicU64::new(0),
        }
    }

    /// Invoked from the timer interrupt once per tick; returns the new count.
    #[inline]
    pub fn tick(&self) -> u64 {
        self.ticks.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Advance by `n` ticks at once
    pub fn advance(&self, n: u64) -> u64 {
        self.ticks.fetch_add(n, Ordering::Relaxed) + n
    }
}

impl Clock for TickClock {
    #[inline]
    fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }
}
