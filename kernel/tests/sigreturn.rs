//! Handler dispatch and sigreturn: the handler's mask holds for exactly the
//! handler's duration and the interrupted context comes back bit for bit.

mod shared;

use kernel::signal::constants::*;
use kernel::signal::frame::SignalFrameLayout;
use kernel::signal::{Delivery, SigSet};
use shared::{World, HANDLER_ENTRY, RESTORER};

#[test]
fn handler_mask_applies_until_sigreturn() {
    let w = World::new();
    let sender = w.spawn("sender");
    let p = w.spawn("p");
    w.sigprocmask(&p, SIG_BLOCK, SigSet::single(SIGHUP));
    w.install_handler(&p, SIGUSR1, SigSet::single(SIGUSR2) | SigSet::single(SIGKILL));

    w.kill(&sender, p.id, SIGUSR1, 0);
    assert_eq!(
        w.return_to_user(&p),
        Delivery::Handler { sig: SIGUSR1, entry: HANDLER_ENTRY }
    );
    let during = p.signals.blocked();
    assert_eq!(
        during,
        SigSet::single(SIGHUP) | SigSet::single(SIGUSR1) | SigSet::single(SIGUSR2)
    );

    // A second SIGUSR1 and a SIGUSR2 wait while the handler runs.
    w.kill(&sender, p.id, SIGUSR1, 0);
    w.kill(&sender, p.id, SIGUSR2, 0);
    assert_eq!(w.return_to_user(&p), Delivery::Nothing);

    assert_eq!(w.sigreturn(&p), 0);
    assert_eq!(p.signals.blocked(), SigSet::single(SIGHUP));
    // Now the queued SIGUSR1 runs; SIGUSR2 still has the default action.
    assert_eq!(
        w.return_to_user(&p),
        Delivery::Handler { sig: SIGUSR1, entry: HANDLER_ENTRY }
    );
}

#[test]
fn dispatch_and_sigreturn_round_trip_is_exact() {
    let w = World::new();
    let sender = w.spawn("sender");
    let p = w.spawn("p");
    w.install_handler(&p, SIGUSR2, SigSet::single(SIGINT));
    w.kill(&sender, p.id, SIGUSR2, 0);

    // Interrupted user context with every register distinct
    let original = {
        let mut tf = p.trapframe.lock();
        tf.epc = 0x1_2344;
        tf.ra = 0x1_0010;
        tf.sp = kernel::config::USER_STACK_TOP - 0x18;
        tf.a0 = 0x1111;
        tf.a1 = 0x2222;
        tf.a5 = 0x5555;
        tf.a7 = 0x7777;
        tf.s0 = 0xa0a0;
        tf.s11 = 0xb1b1;
        tf.t6 = 0xc6c6;
        *tf
    };
    let mask_before = p.signals.blocked();

    assert!(matches!(w.return_to_user(&p), Delivery::Handler { sig: SIGUSR2, .. }));
    let entered = *p.trapframe.lock();
    assert_eq!(entered.epc, HANDLER_ENTRY);
    assert_eq!(entered.ra, RESTORER);
    assert_eq!(entered.a0, SIGUSR2 as u64);
    assert_eq!(entered.sp % 16, 0);
    assert!(entered.sp + SignalFrameLayout::SIZE <= original.sp);
    assert_eq!(entered.a1, entered.sp + SignalFrameLayout::INFO_OFFSET);

    // The handler uses caller-saved registers and returns.
    {
        let mut tf = p.trapframe.lock();
        tf.t0 = 0xdead;
        tf.a2 = 0xbeef;
    }
    assert_eq!(w.sigreturn(&p), original.a0 as i64);
    assert_eq!(*p.trapframe.lock(), original);
    assert_eq!(p.signals.blocked(), mask_before);
}

#[test]
fn sigreturn_never_restores_uncatchable_bits() {
    let w = World::new();
    let sender = w.spawn("sender");
    let p = w.spawn("p");
    w.install_handler(&p, SIGUSR1, SigSet::empty());
    w.kill(&sender, p.id, SIGUSR1, 0);
    w.return_to_user(&p);

    // The handler scribbles SIGKILL | SIGSTOP into the saved mask.
    let sp = p.trapframe.lock().sp;
    shared::put(&p, sp + SignalFrameLayout::MASK_OFFSET, &SigSet::UNCATCHABLE);
    w.sigreturn(&p);
    assert!(p.signals.blocked().is_empty());
}

#[test]
fn unwritable_stack_kills_instead_of_delivering() {
    let w = World::new();
    let sender = w.spawn("sender");
    let p = w.spawn("p");
    w.install_handler(&p, SIGUSR1, SigSet::empty());
    w.kill(&sender, p.id, SIGUSR1, 0);
    p.trapframe.lock().sp = 0x40;

    assert_eq!(
        w.return_to_user(&p),
        Delivery::Killed { sig: SIGUSR1, status: killed_status(SIGUSR1) }
    );
    assert!(p.is_zombie());
}
