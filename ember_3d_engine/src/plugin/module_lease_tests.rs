/// Tests for ModuleLease

use super::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

#[test]
fn test_run_while_alive() {
    let lease = ModuleLease::new();

    assert!(lease.is_alive());
    assert_eq!(lease.run(|| 7), Some(7));
}

#[test]
fn test_retired_lease_refuses_calls() {
    let lease = ModuleLease::new();
    let mut released = 0;

    lease.retire(|| released += 1);
    lease.retire(|| released += 1);

    assert!(!lease.is_alive());
    assert_eq!(lease.run(|| 7), None);
    assert_eq!(released, 1);
}

#[test]
fn test_clones_share_liveness() {
    let lease = ModuleLease::new();
    let registered = lease.clone();

    lease.retire(|| {});

    assert!(!registered.is_alive());
}

#[test]
fn test_current_lease_is_scoped() {
    let outer = ModuleLease::new();
    let inner = ModuleLease::new();
    assert!(ModuleLease::current().is_none());

    outer.run(|| {
        inner.run(|| {
            let current = ModuleLease::current().unwrap();
            assert!(Arc::ptr_eq(&current.alive, &inner.alive));
        });
        let current = ModuleLease::current().unwrap();
        assert!(Arc::ptr_eq(&current.alive, &outer.alive));
    });

    assert!(ModuleLease::current().is_none());
}

#[test]
fn test_retire_waits_for_call_in_flight() {
    let lease = ModuleLease::new();
    let in_call = lease.clone();
    let freed = Arc::new(AtomicBool::new(false));
    let seen_freed = freed.clone();
    let (started_tx, started_rx) = mpsc::channel();

    let caller = thread::spawn(move || {
        in_call.run(|| {
            started_tx.send(()).unwrap();
            thread::sleep(Duration::from_millis(200));
            seen_freed.load(Ordering::SeqCst)
        })
    });

    started_rx.recv().unwrap();
    lease.retire(|| freed.store(true, Ordering::SeqCst));

    assert_eq!(caller.join().unwrap(), Some(false));
    assert!(freed.load(Ordering::SeqCst));
}
