#![forbid(unsafe_code)]

//! tcheck demo binary entry point.

use std::process;
use std::thread;
use std::time::Duration;

use tcheck::prelude::*;
use tcheck_demo::{checks, cli, logging};

fn main() {
    let opts = cli::Opts::parse();

    if let Err(err) = logging::init() {
        eprintln!("Failed to open log file: {err}");
        process::exit(1);
    }

    let scheduler = Scheduler::new(SchedulerConfig::default().with_concurrency(opts.concurrency));
    checks::register_all(&scheduler, checks::TICK);

    let options = SessionOptions {
        alternate_screen: opts.alt_screen,
        ..SessionOptions::default()
    };
    let (screen, events) = match tcheck::open_terminal(options) {
        Ok(pair) => pair,
        Err(err) => {
            eprintln!("{err}");
            process::exit(1);
        }
    };
    let view = TaskListView::new(screen, scheduler.clone());

    if opts.exit_after_ms > 0 {
        let view = view.clone();
        let delay = Duration::from_millis(opts.exit_after_ms);
        let spawned = thread::Builder::new()
            .name("tcheck-demo-exit".into())
            .spawn(move || {
                thread::sleep(delay);
                view.stop();
            });
        if let Err(err) = spawned {
            tracing::warn!(error = %err, "auto-exit timer not started");
        }
    }

    if let Err(err) = tcheck::run_checks(&view, events) {
        eprintln!("Runtime error: {err}");
        process::exit(1);
    }
    println!("Application quit.");

    let failed = scheduler.failed();
    if !failed.is_empty() {
        println!("❌ Exiting due to failed checks:");
        for task in &failed {
            match task.error() {
                Some(err) => println!(" - {}: {err}", task.name()),
                None => println!(" - {}", task.name()),
            }
        }
        process::exit(1);
    }

    println!("✅ All checks passed! Moving to the next step...");
}
