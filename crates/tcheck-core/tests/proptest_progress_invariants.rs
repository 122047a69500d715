//! Property-based invariant tests for progress reporting and aggregation.
//!
//! 1. Stored sub-progress is always within 0..=100 for any report sequence.
//! 2. On success sub-progress ends at 100; on failure it keeps the last
//!    clamped report.
//! 3. Overall percent is floor(done * 100 / total) and never exceeds 100.

use proptest::prelude::*;
use tcheck_core::{OverallProgress, Scheduler, SchedulerConfig, Task, TaskStatus};

use std::sync::Arc;

proptest! {
    #[test]
    fn sub_progress_stays_clamped(reports in prop::collection::vec(any::<i32>(), 1..20), fail in any::<bool>()) {
        let task = {
            let reports = reports.clone();
            Arc::new(Task::new(1, "prop", move |r| {
                for p in reports {
                    r.report(p, "step");
                }
                if fail { Err("failed".into()) } else { Ok(()) }
            }))
        };
        task.run();

        let state = task.state();
        prop_assert!(state.sub_progress <= 100);
        let last = *reports.last().unwrap();
        if fail {
            prop_assert_eq!(state.status, TaskStatus::Failed);
            prop_assert_eq!(i32::from(state.sub_progress), last.clamp(0, 100));
        } else {
            prop_assert_eq!(state.status, TaskStatus::Completed);
            prop_assert_eq!(state.sub_progress, 100);
        }
    }
}

proptest! {
    #[test]
    fn overall_percent_is_truncated_ratio(total in 0usize..500, done_seed in any::<usize>()) {
        let done = if total == 0 { 0 } else { done_seed % (total + 1) };
        let p = OverallProgress::from_counts(done, total);
        if total == 0 {
            prop_assert_eq!(p, OverallProgress { done: 0, total: 0, percent: 0 });
        } else {
            prop_assert_eq!(p.percent, done * 100 / total);
            prop_assert!(p.percent <= 100);
            prop_assert_eq!(p.percent == 100, done == total);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn scheduler_progress_matches_outcomes(outcomes in prop::collection::vec(any::<bool>(), 0..12)) {
        let scheduler = Scheduler::new(SchedulerConfig::default().with_concurrency(3));
        for (i, ok) in outcomes.iter().copied().enumerate() {
            scheduler.register(format!("t{i}"), move |_| {
                if ok { Ok(()) } else { Err("no".into()) }
            });
        }
        scheduler.run_all().wait();

        let p = scheduler.overall_progress();
        prop_assert_eq!(p.done, outcomes.len());
        prop_assert_eq!(p.total, outcomes.len());
        prop_assert_eq!(scheduler.failed().len(), outcomes.iter().filter(|ok| !**ok).count());
    }
}
