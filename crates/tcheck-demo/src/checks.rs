#![forbid(unsafe_code)]

//! Simulated preflight checks.
//!
//! Every check sleeps to fake work. Durations are expressed in ticks so tests
//! can run the whole set quickly; the binary uses [`TICK`].

use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tcheck::{BoxError, Reporter, Scheduler};

/// Wall-clock length of one tick in the interactive demo.
pub const TICK: Duration = Duration::from_millis(100);

/// Register the ten demo checks on `scheduler`, in display order.
pub fn register_all(scheduler: &Scheduler, tick: Duration) {
    scheduler.register("Checking Network Connectivity", move |r| network(r, tick));
    scheduler.register("Verifying File Permissions", move |r| successful(r, tick));
    scheduler.register("Checking Database Connection", move |r| failing(r, tick));
    scheduler.register("System Resource Check", move |r| resources(r, tick));
    scheduler.register("External API Availability", move |r| long_silent(r, tick));
    scheduler.register("Configuration File Syntax", move |r| quick(r, tick));
    scheduler.register("Disk Space Check", move |r| disk_space(r, tick));
    scheduler.register("Another Successful Check", move |r| successful(r, tick));
    scheduler.register("Yet Another Failing Check", move |r| failing(r, tick));
    scheduler.register("Quick Pass", move |r| quick(r, tick));
}

fn pause(tick: Duration, ticks: u32) {
    thread::sleep(tick * ticks);
}

/// Succeeds or fails depending on the parity of the current second.
fn network(reporter: Reporter, tick: Duration) -> Result<(), BoxError> {
    reporter.report(0, "Pinging gateway...");
    pause(tick, 10);
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    if secs % 2 == 0 {
        reporter.report(100, "Gateway reachable");
        Ok(())
    } else {
        reporter.report(100, "Gateway ping failed");
        Err("gateway not reachable".into())
    }
}

fn successful(reporter: Reporter, tick: Duration) -> Result<(), BoxError> {
    reporter.report(0, "Starting...");
    pause(tick, 5);
    reporter.report(30, "Doing step 1/3");
    pause(tick, 10);
    reporter.report(60, "Doing step 2/3");
    pause(tick, 10);
    reporter.report(90, "Almost done with step 3/3");
    pause(tick, 5);
    Ok(())
}

fn failing(reporter: Reporter, tick: Duration) -> Result<(), BoxError> {
    reporter.report(0, "Attempting critical operation...");
    pause(tick, 10);
    reporter.report(50, "Operation in progress...");
    pause(tick, 10);
    Err("simulated failure: resource not available".into())
}

fn resources(reporter: Reporter, tick: Duration) -> Result<(), BoxError> {
    reporter.report(10, "Checking CPU...");
    pause(tick, 3);
    reporter.report(50, "Checking Memory...");
    pause(tick, 5);
    reporter.report(100, "Resources OK");
    Ok(())
}

/// Long-running with a single initial report.
fn long_silent(reporter: Reporter, tick: Duration) -> Result<(), BoxError> {
    reporter.report(0, "Performing lengthy operation...");
    pause(tick, 30);
    Ok(())
}

fn quick(reporter: Reporter, tick: Duration) -> Result<(), BoxError> {
    reporter.report(50, "Verifying...");
    pause(tick, 2);
    Ok(())
}

fn disk_space(reporter: Reporter, tick: Duration) -> Result<(), BoxError> {
    const STEPS: i32 = 5;
    for i in 0..=STEPS {
        reporter.report(i * 100 / STEPS, format!("Analyzing partition {i}/{STEPS}"));
        pause(tick, 3);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tcheck::{SchedulerConfig, TaskStatus};

    #[test]
    fn demo_set_runs_to_completion() {
        let scheduler = Scheduler::new(SchedulerConfig::default().with_concurrency(3));
        register_all(&scheduler, Duration::from_micros(100));
        assert_eq!(scheduler.len(), 10);

        scheduler.run_all().wait();
        assert!(scheduler.overall_progress().is_finished());

        let failed: Vec<String> = scheduler
            .failed()
            .iter()
            .map(|t| t.name().to_string())
            .collect();
        assert!(failed.contains(&"Checking Database Connection".to_string()));
        assert!(failed.contains(&"Yet Another Failing Check".to_string()));
        assert!(failed.len() == 2 || failed[0] == "Checking Network Connectivity");

        let disk = &scheduler.snapshot()[6];
        assert_eq!(disk.status(), TaskStatus::Completed);
        assert_eq!(disk.sub_progress(), 100);
    }
}
