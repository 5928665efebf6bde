//! alarm(): SIGALRM raised by the kernel once the deadline passes.

mod shared;

use kernel::config::TICKS_PER_SECOND;
use kernel::signal::constants::*;
use kernel::signal::{Delivery, SigSet};
use shared::{handler_info, World, HANDLER_ENTRY};

#[test]
fn alarm_fires_after_deadline() {
    let w = World::new();
    let p = w.spawn("p");
    w.install_handler(&p, SIGALRM, SigSet::empty());

    assert_eq!(w.alarm(&p, 1), 0);
    assert_eq!(w.run_ticks(TICKS_PER_SECOND - 1), 0);
    assert!(!p.signals.is_pending(SIGALRM));

    assert_eq!(w.run_ticks(1), 1);
    assert!(p.signals.is_pending(SIGALRM));
    assert_eq!(
        w.return_to_user(&p),
        Delivery::Handler { sig: SIGALRM, entry: HANDLER_ENTRY }
    );
    assert_eq!(handler_info(&p).pid, KERNEL_SENDER);

    // One-shot: nothing more fires
    w.sigreturn(&p);
    assert_eq!(w.run_ticks(3 * TICKS_PER_SECOND), 0);
    assert_eq!(w.alarm(&p, 0), 0);
}

#[test]
fn rearm_and_cancel_return_previous_duration() {
    let w = World::new();
    let p = w.spawn("p");
    assert_eq!(w.alarm(&p, 5), 0);
    assert_eq!(w.alarm(&p, 2), 5);
    assert_eq!(w.alarm(&p, 0), 2);
    assert_eq!(w.alarm(&p, 0), 0);
    assert_eq!(w.run_ticks(10 * TICKS_PER_SECOND), 0);
}

#[test]
fn default_alarm_action_terminates() {
    let w = World::new();
    let p = w.spawn("p");
    w.alarm(&p, 1);
    w.run_ticks(TICKS_PER_SECOND);
    assert_eq!(
        w.return_to_user(&p),
        Delivery::Killed { sig: SIGALRM, status: killed_status(SIGALRM) }
    );
}

#[test]
fn alarms_fire_per_process() {
    let w = World::new();
    let early = w.spawn("early");
    let late = w.spawn("late");
    w.alarm(&early, 1);
    w.alarm(&late, 2);
    assert_eq!(w.run_ticks(TICKS_PER_SECOND), 1);
    assert!(early.signals.is_pending(SIGALRM));
    assert!(!late.signals.is_pending(SIGALRM));
    assert_eq!(w.run_ticks(TICKS_PER_SECOND), 1);
    assert!(late.signals.is_pending(SIGALRM));
}

#[test]
fn exited_process_alarm_is_dropped() {
    let w = World::new();
    let p = w.spawn("p");
    w.alarm(&p, 1);
    p.exit(0);
    assert_eq!(w.run_ticks(2 * TICKS_PER_SECOND), 0);
}
