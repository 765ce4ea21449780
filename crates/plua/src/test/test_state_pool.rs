// Tests for the consumer slot pool
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crate::*;

#[test]
fn test_acquire_distinct_slots() {
    let pool = StatePool::new(2);
    let a = pool.acquire();
    let b = pool.acquire();
    assert_ne!(a.slot(), b.slot());
    assert_eq!(pool.available(), 0);
    assert!(pool.try_acquire().is_none());

    drop(a);
    assert_eq!(pool.available(), 1);
    assert!(pool.try_acquire().is_some());
}

#[test]
fn test_zero_size_pool_has_one_slot() {
    let pool = StatePool::new(0);
    assert_eq!(pool.size(), 1);
}

#[test]
fn test_default_pool_follows_option() {
    let pool = StatePool::default();
    assert_eq!(pool.size(), MetatableOption::default().pool_size);

    let option = MetatableOption {
        pool_size: 7,
        ..Default::default()
    };
    assert_eq!(StatePool::from_option(&option).size(), 7);
}

#[test]
fn test_acquire_blocks_until_release() {
    super::init_logger();

    let pool = StatePool::new(1);
    let held = pool.acquire();
    let (tx, rx) = mpsc::channel();

    let waiter = {
        let pool = pool.clone();
        thread::spawn(move || {
            let guard = pool.acquire();
            tx.send(guard.slot()).unwrap();
        })
    };

    assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
    let slot = held.slot();
    drop(held);
    assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), slot);
    waiter.join().unwrap();
}

#[test]
fn test_deferred_release_on_clear() {
    let pool = StatePool::new(1);
    let t = Metatable::new();
    t.set("k", 1).unwrap();

    let mut state = pool.acquire();
    state.defer_release(t.share());
    state.defer_release(t.share());
    assert_eq!(state.deferred_count(), 2);
    assert_eq!(t.ref_count(), 3);

    drop(state);
    assert_eq!(t.ref_count(), 1);
}

#[test]
fn test_cancel_release_keeps_handle() {
    let pool = StatePool::new(1);
    let t = Metatable::new();

    let mut state = pool.acquire();
    state.defer_release(t.share());
    let handle = state.cancel_release(&t).unwrap();
    assert!(state.cancel_release(&t).is_none());
    drop(state);

    assert_eq!(t.ref_count(), 2);
    assert!(handle.ptr_eq(&t));
}

#[test]
fn test_clear_forgets_slot_cursor() {
    let pool = StatePool::new(1);
    let t = Metatable::new();
    t.push("a").unwrap();
    t.push("b").unwrap();

    let mut state = pool.acquire();
    let slot = state.slot();
    t.begin_iteration(slot);
    t.next_entry(slot);
    state.defer_release(t.share());
    drop(state);

    // a fresh state on the same slot starts from the first cell
    assert_eq!(t.next_entry(slot).map(|(_, v)| v), Some(Value::String("a".into())));
}

#[test]
fn test_deferred_release_frees_last_handle() {
    let pool = StatePool::new(1);
    let mut state = pool.acquire();
    let t = Metatable::new();
    let child = Metatable::new();
    t.set("child", child).unwrap();
    let nested = Metatable::from_value(t.get("child").unwrap()).unwrap();

    state.defer_release(t);
    drop(state);
    // the parent is gone, only our handle keeps the child alive
    assert_eq!(nested.ref_count(), 1);
}
