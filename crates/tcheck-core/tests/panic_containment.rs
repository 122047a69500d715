//! A panicking check is recorded without reaching the process panic hook.
//!
//! Kept in its own test binary: it replaces the global panic hook.

use std::panic;
use std::sync::{Arc, Mutex};
use std::thread;

use tcheck_core::{Scheduler, SchedulerConfig, TaskStatus};

fn payload_text(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_default()
}

#[test]
fn check_panic_stays_off_the_previous_hook() {
    let seen: Arc<Mutex<Vec<String>>> = Arc::default();
    {
        let seen = Arc::clone(&seen);
        panic::set_hook(Box::new(move |info| {
            seen.lock().unwrap().push(payload_text(info.payload()));
        }));
    }

    let scheduler = Scheduler::new(SchedulerConfig::default().with_concurrency(2));
    scheduler.register("kaboom", |_| panic!("kaboom"));
    scheduler.register("fine", |_| Ok(()));
    scheduler.run_all().wait();

    let tasks = scheduler.snapshot();
    assert_eq!(tasks[0].status(), TaskStatus::Failed);
    assert_eq!(
        tasks[0].error().map(|e| e.to_string()).as_deref(),
        Some("panicked: kaboom")
    );
    assert_eq!(tasks[1].status(), TaskStatus::Completed);
    let reported = seen.lock().unwrap().clone();
    assert!(reported.is_empty(), "{reported:?}");

    // Panics outside a running check still go through.
    let outside = thread::spawn(|| panic!("outside a check")).join();
    assert!(outside.is_err());
    assert_eq!(*seen.lock().unwrap(), vec!["outside a check".to_string()]);

    drop(panic::take_hook());
}
