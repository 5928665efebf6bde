//! Per-process alarm timer raising SIGALRM

use super::timer::Clock;
use crate::config::TICKS_PER_SECOND;
use crate::process::{ProcessDirectory, ProcessState};
use crate::signal::constants::SIGALRM;
use crate::signal::send_kernel_signal;

/// alarm() state of one process
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlarmTimer {
    /// Tick at which SIGALRM is raised, if armed
    deadline: Option<u64>,
    /// Seconds requested by the call that armed the timer
    duration: u64,
}

impl AlarmTimer {
    pub const fn new() -> Self {
        AlarmTimer {
            deadline: None,
            duration: 0,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<u64> {
        self.deadline
    }

    /// Arm for `secs` seconds from `now`; returns the previous duration.
    pub fn arm(&mut self, now: u64, secs: u64) -> u64 {
        let previous = self.disarm();
        self.deadline = Some(now.saturating_add(secs.saturating_mul(TICKS_PER_SECOND)));
        self.duration = secs;
        previous
    }

    /// Disarm; returns the previous duration (0 if none). Idempotent.
    pub fn disarm(&mut self) -> u64 {
        let previous = if self.deadline.is_some() { self.duration } else { 0 };
        self.deadline = None;
        self.duration = 0;
        previous
    }

    /// alarm(secs): 0 disarms, anything else re-arms
    pub fn set(&mut self, now: u64, secs: u64) -> u64 {
        if secs == 0 {
            self.disarm()
        } else {
            self.arm(now, secs)
        }
    }

    /// True once `now` has reached the deadline
    pub fn expired(&self, now: u64) -> bool {
        matches!(self.deadline, Some(deadline) if now >= deadline)
    }
}

/// Raise SIGALRM on every process whose alarm has expired and disarm it.
///
/// Called from the timer path after the tick counter advanced. Returns the
/// number of alarms that fired.
pub fn check_alarms<D, C>(dir: &D, clock: &C) -> usize
where
    D: ProcessDirectory + ?Sized,
    C: Clock + ?Sized,
{
    let now = clock.ticks();
    let mut fired = 0;
    for process in dir.processes() {
        if process.state() == ProcessState::Zombie {
            continue;
        }
        let expired = {
            let mut alarm = process.alarm.lock();
            if alarm.expired(now) {
                alarm.disarm();
                true
            } else {
                false
            }
        };
        if expired {
            log::debug!("Alarm expired for process {} at tick {}", process.id, now);
            send_kernel_signal(&process, SIGALRM, 0);
            fired += 1;
        }
    }
    fired
}
