use super::*;
use pretty_assertions::assert_eq;
use std::sync::atomic::AtomicUsize;

#[test]
fn unlimited_by_default() {
    let env = Env::new();
    env.alloc(i64::MAX).unwrap();
    assert_eq!(env.free_memory(), None);
}

#[test]
fn quota() {
    let env = Env::builder().memory_limit(100).build();
    env.alloc(60).unwrap();
    env.alloc(-10).unwrap();
    assert_eq!(env.free_memory(), Some(50));
    assert_eq!(env.alloc(51).unwrap_err(), VmError::OutOfMemory);
    assert_eq!(env.free_memory(), Some(-1));
    // Releasing memory does not revive an exhausted quota.
    assert!(env.alloc(-100).is_err());
    assert_eq!(env.free_memory(), Some(-1));
}

#[test]
fn quota_as_evaluator_budget() {
    let env = Env::builder().memory_limit(8).build();
    let quota: &dyn MemoryQuota = &env;
    quota.alloc(8).unwrap();
    let err = quota.alloc(1).unwrap_err();
    assert_eq!(err.message, "out of memory");
}

#[test]
fn cancellation() {
    let token = CancelToken::new();
    let env = Env::builder().cancel_token(token.clone()).build();
    env.check().unwrap();
    token.cancel();
    assert_eq!(env.check().unwrap_err(), VmError::Cancelled);
    assert!(env.cancel_token().is_cancelled());
}

#[test]
fn deadline() {
    let env = Env::builder().deadline(Instant::now()).build();
    assert_eq!(env.check().unwrap_err(), VmError::DeadlineExceeded);
    assert!(env.check().unwrap_err().is_fatal());

    let env = Env::builder().timeout(Duration::from_secs(3600)).build();
    env.check().unwrap();
    assert!(env.deadline().is_some());
}

#[test]
fn exit_callbacks_run_once_in_order() {
    let order = Arc::new(Mutex::new(Vec::new()));
    let log = |tag: &'static str| {
        let order = Arc::clone(&order);
        move || order.lock().push(tag)
    };
    let env = Env::builder().exit_func(log("built")).build();
    env.exit_func(log("registered"));
    assert!(order.lock().is_empty());

    env.exit();
    env.exit();
    assert_eq!(*order.lock(), ["built", "registered"]);
    assert!(env.is_exited());

    env.exit_func(log("late"));
    assert_eq!(*order.lock(), ["built", "registered", "late"]);
}

#[test]
fn shared_across_threads() {
    let env = Arc::new(Env::builder().memory_limit(1000).build());
    let calls = Arc::new(AtomicUsize::new(0));
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let env = Arc::clone(&env);
            let calls = Arc::clone(&calls);
            std::thread::spawn(move || {
                for _ in 0..25 {
                    env.alloc(10).unwrap();
                    calls.fetch_add(1, Ordering::Relaxed);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(calls.load(Ordering::Relaxed), 100);
    assert_eq!(env.free_memory(), Some(0));
}
