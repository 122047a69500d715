//! Task list view driven through the headless backend.

use std::io;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use tcheck_core::{Scheduler, SchedulerConfig, TaskStatus};
use tcheck_render::{
    Event, EventSource, HeadlessProbe, HeadlessScreen, KeyCode, KeyEvent, Modifiers, PackedRgba,
    ScriptedEvents,
};
use tcheck_view::{TaskListView, ViewConfig, ViewStyles};

const WAIT: Duration = Duration::from_secs(5);

fn scheduler() -> Scheduler {
    Scheduler::new(
        SchedulerConfig::default()
            .with_concurrency(2)
            .with_refresh_interval(Duration::from_millis(5)),
    )
}

fn view(
    scheduler: &Scheduler,
    width: u16,
    height: u16,
) -> (std::sync::Arc<TaskListView<HeadlessScreen>>, HeadlessProbe) {
    let screen = HeadlessScreen::new(width, height);
    let probe = screen.probe();
    let config = ViewConfig {
        poll_interval: Duration::from_millis(5),
    };
    let view = TaskListView::with_options(screen, scheduler.clone(), ViewStyles::default(), config);
    (view, probe)
}

#[test]
fn renders_one_line_per_status() {
    let s = scheduler();
    s.register("Network connectivity", |_| Ok(()));
    s.register("Database connection", |_| Err("Database connection failed".into()));
    let (started_tx, started_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel::<()>();
    s.register("External API", move |r| {
        r.report(40, "Waiting for API response");
        started_tx.send(()).unwrap();
        release_rx.recv().unwrap();
        Ok(())
    });
    s.register("Disk space", |_| Ok(()));

    let tasks = s.snapshot();
    tasks[0].run();
    tasks[1].run();
    let runner = {
        let task = tasks[2].clone();
        thread::spawn(move || task.run())
    };
    started_rx.recv().unwrap();

    let (view, probe) = view(&s, 60, 6);
    view.redraw().unwrap();

    assert_eq!(probe.row_text(0), "✅ Network connectivity");
    assert_eq!(
        probe.row_text(1),
        "❌ Database connection (Database connection failed)"
    );
    assert_eq!(
        probe.row_text(2),
        "⏳ External API (40% - Waiting for API response)"
    );
    assert_eq!(probe.row_text(3), "- Disk space");
    assert_eq!(probe.row_text(4), "");

    let frame = probe.frame();
    assert_eq!(frame.get(0, 0).unwrap().style.fg, PackedRgba::GREEN);
    assert_eq!(frame.get(0, 1).unwrap().style.fg, PackedRgba::RED);
    assert_eq!(frame.get(0, 2).unwrap().style.fg, PackedRgba::YELLOW);
    assert_eq!(frame.get(0, 3).unwrap().style.fg, PackedRgba::SILVER);

    let bottom = probe.row_text(5);
    assert!(bottom.contains("Overall Progress: 2/4 (50%)"), "{bottom}");
    assert!(bottom.starts_with("[="));

    release_tx.send(()).unwrap();
    runner.join().unwrap();
}

#[test]
fn too_small_screen_shows_message_only() {
    let s = scheduler();
    s.register("hidden", |_| Ok(()));
    let (view, probe) = view(&s, 30, 2);
    view.redraw().unwrap();
    assert_eq!(probe.text(), "Screen too small!\n");
    assert_eq!(probe.frame().get(0, 0).unwrap().style.fg, PackedRgba::RED);
}

#[test]
fn overflow_draws_arrows_and_scrollbar() {
    let s = scheduler();
    for i in 0..20 {
        s.register(format!("check {i:02}"), |_| Ok(()));
    }
    // 11 rows: 10 list rows, track 8, thumb 4, max scroll 10.
    let (view, probe) = view(&s, 30, 11);
    view.redraw().unwrap();

    let col = |probe: &HeadlessProbe| -> String {
        let frame = probe.frame();
        (0..10).map(|y| frame.get(29, y).unwrap().ch).collect()
    };
    assert_eq!(col(&probe), " ████││││▼");
    assert_eq!(probe.row_text(0), "- check 00");

    for _ in 0..5 {
        view.handle_event(KeyCode::Down.into()).unwrap();
    }
    assert_eq!(view.scroll_top(), 5);
    assert_eq!(col(&probe), "▲││████││▼");
    assert!(probe.row_text(0).starts_with("- check 05"));

    for _ in 0..20 {
        view.handle_event(KeyCode::Down.into()).unwrap();
    }
    assert_eq!(view.scroll_top(), 10);
    assert_eq!(col(&probe), "▲││││████ ");
    assert!(probe.row_text(9).starts_with("- check 19"));
}

#[test]
fn growing_the_terminal_clamps_scroll() {
    let s = scheduler();
    for i in 0..8 {
        s.register(format!("t{i}"), |_| Ok(()));
    }
    let (view, probe) = view(&s, 20, 5);
    for _ in 0..10 {
        view.handle_event(KeyCode::Down.into()).unwrap();
    }
    assert_eq!(view.scroll_top(), 4);

    probe.resize(20, 7);
    view.handle_event(Event::Resize {
        width: 20,
        height: 7,
    })
    .unwrap();
    assert_eq!(probe.syncs(), 1);
    assert_eq!(probe.frame().height(), 7);
    assert_eq!(view.scroll_top(), 2);
    assert!(probe.row_text(0).starts_with("- t2 "));
}

#[test]
fn quit_key_ends_run_and_releases_screen() {
    let s = scheduler();
    s.register("only", |_| Ok(()));
    let (view, probe) = view(&s, 30, 5);

    let events = ScriptedEvents::from_events([
        Event::from(KeyCode::Down),
        Event::Key(KeyEvent::new(KeyCode::Char('q'))),
    ]);
    view.run(events).unwrap();

    assert!(view.is_quit());
    assert!(probe.is_released());
    assert!(probe.shows() >= 1);
    // Later notifications are harmless.
    view.redraw().unwrap();
    view.stop();
}

#[test]
fn ctrl_c_and_escape_quit() {
    for key in [
        KeyEvent::new(KeyCode::Char('c')).with_modifiers(Modifiers::CTRL),
        KeyEvent::new(KeyCode::Escape),
    ] {
        let s = scheduler();
        let (view, probe) = view(&s, 30, 5);
        view.run(ScriptedEvents::from_events([Event::Key(key)])).unwrap();
        assert!(probe.is_released());
    }
}

#[test]
fn stop_from_another_thread_ends_run() {
    let s = scheduler();
    let (view, probe) = view(&s, 30, 5);
    let (_feeder, events) = ScriptedEvents::channel();

    let stopper = {
        let view = view.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(30));
            view.stop();
            view.stop();
        })
    };
    view.run(events).unwrap();
    stopper.join().unwrap();
    assert!(probe.wait_for_shows(1, WAIT));
    assert!(probe.wait_for_release(WAIT));
}

#[test]
fn scheduler_notifications_redraw_live() {
    let s = scheduler();
    let (release_tx, release_rx) = mpsc::channel::<()>();
    s.register("quick", |_| Ok(()));
    s.register("gated", move |r| {
        r.report(75, "almost");
        release_rx.recv().unwrap();
        Ok(())
    });
    let (view, probe) = view(&s, 50, 5);
    view.attach().unwrap();

    let (feeder, events) = ScriptedEvents::channel();
    let runner = {
        let view = view.clone();
        thread::spawn(move || view.run(events))
    };

    let handle = s.run_all();
    assert!(probe.wait_for_frame(WAIT, |f| f.row_text(1) == "⏳ gated (75% - almost)"));
    release_tx.send(()).unwrap();
    handle.wait();
    assert!(probe.wait_for_frame(WAIT, |f| f
        .row_text(4)
        .contains("Overall Progress: 2/2 (100%)")));
    assert!(probe.wait_for_frame(WAIT, |f| f.row_text(1) == "✅ gated"));

    feeder.send(KeyCode::Escape);
    runner.join().unwrap().unwrap();
    assert!(probe.is_released());
    assert_eq!(s.snapshot()[1].status(), TaskStatus::Completed);
}

struct BrokenInput;

impl EventSource for BrokenInput {
    fn poll_event(&mut self, _timeout: Duration) -> io::Result<Option<Event>> {
        Err(io::Error::other("input closed"))
    }
}

#[test]
fn input_error_is_returned_after_release() {
    let s = scheduler();
    let (view, probe) = view(&s, 30, 5);
    let err = view.run(BrokenInput).unwrap_err();
    assert_eq!(err.to_string(), "input closed");
    assert!(probe.is_released());
    assert!(view.is_quit());
}
