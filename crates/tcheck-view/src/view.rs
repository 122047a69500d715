#![forbid(unsafe_code)]

//! Live task list view.
//!
//! [`TaskListView`] owns a [`Screen`] and renders the scheduler's tasks as a
//! scrollable list with an aggregate bar on the last row. It is driven from
//! two directions:
//!
//! - the scheduler's change notifications call [`TaskListView::redraw`]
//!   through the listener returned by [`TaskListView::listener`];
//! - [`TaskListView::run`] starts an input thread that turns key and resize
//!   events into scrolling, redraws and quit.
//!
//! Every redraw and every scroll change happens under one view lock, so a
//! frame never mixes two scroll positions. The lock is taken before any
//! scheduler or task lock and never the other way round.

use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::thread;
use std::time::Duration;

use tcheck_core::{ChangeListener, ListenerAlreadySet, Scheduler};
use tcheck_render::{Event, EventSource, KeyCode, KeyEvent, KeyEventKind, Screen};

use crate::progress_bar;
use crate::quit::QuitSignal;
use crate::scrollbar::{self, ScrollMetrics};
use crate::status_line::{emit_str, format_line};
use crate::styles::ViewStyles;

/// Message shown instead of the list when the terminal is too short.
pub const TOO_SMALL_MESSAGE: &str = "Screen too small!";

/// Minimum terminal height for the list layout.
pub const MIN_HEIGHT: u16 = 3;

/// View configuration.
#[derive(Debug, Clone)]
pub struct ViewConfig {
    /// How long the input thread waits for an event before re-checking the
    /// quit signal. Bounds how quickly `stop()` takes effect.
    pub poll_interval: Duration,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(50),
        }
    }
}

/// What the input loop should do after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

struct ViewState<S> {
    /// `None` once the view has released the screen.
    screen: Option<S>,
    scroll_top: usize,
}

/// Scrollable live list of a scheduler's tasks.
pub struct TaskListView<S: Screen> {
    scheduler: Scheduler,
    styles: ViewStyles,
    config: ViewConfig,
    quit: QuitSignal,
    state: Mutex<ViewState<S>>,
}

impl<S: Screen + 'static> TaskListView<S> {
    /// Create a view with the default styles and configuration.
    pub fn new(screen: S, scheduler: Scheduler) -> Arc<Self> {
        Self::with_options(screen, scheduler, ViewStyles::default(), ViewConfig::default())
    }

    pub fn with_options(
        screen: S,
        scheduler: Scheduler,
        styles: ViewStyles,
        config: ViewConfig,
    ) -> Arc<Self> {
        Arc::new(Self {
            scheduler,
            styles,
            config,
            quit: QuitSignal::new(),
            state: Mutex::new(ViewState {
                screen: Some(screen),
                scroll_top: 0,
            }),
        })
    }

    /// A change listener that redraws this view.
    ///
    /// It holds the view weakly, so installing it on the scheduler the view
    /// reads from does not keep either alive. Redraw errors are logged and
    /// dropped; the next notification simply tries again.
    pub fn listener(self: &Arc<Self>) -> Arc<dyn ChangeListener> {
        Arc::new(RedrawListener {
            view: Arc::downgrade(self),
        })
    }

    /// Install [`listener`](Self::listener) on the view's scheduler.
    pub fn attach(self: &Arc<Self>) -> Result<(), ListenerAlreadySet> {
        self.scheduler.set_listener(self.listener())
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn styles(&self) -> &ViewStyles {
        &self.styles
    }

    /// Index of the first visible task.
    pub fn scroll_top(&self) -> usize {
        self.lock().scroll_top
    }

    /// Returns true once quit has been signalled.
    pub fn is_quit(&self) -> bool {
        self.quit.is_set()
    }

    /// Render a full frame and commit it. Does nothing after the screen has
    /// been released.
    pub fn redraw(&self) -> io::Result<()> {
        let mut guard = self.lock();
        let ViewState { screen, scroll_top } = &mut *guard;
        match screen.as_mut() {
            Some(screen) => self.draw(screen, scroll_top),
            None => Ok(()),
        }
    }

    fn draw(&self, screen: &mut S, scroll_top: &mut usize) -> io::Result<()> {
        screen.clear();
        let (width, height) = screen.size();

        if height < MIN_HEIGHT {
            emit_str(screen, 0, 0, self.styles.failure, TOO_SMALL_MESSAGE);
            return screen.show();
        }

        let tasks = self.scheduler.snapshot();
        let rows = usize::from(height - 1);
        *scroll_top = (*scroll_top).min(tasks.len().saturating_sub(rows));

        for (y, task) in tasks.iter().skip(*scroll_top).take(rows).enumerate() {
            let state = task.state();
            let line = format_line(task.name(), &state);
            emit_str(screen, 0, y as u16, self.styles.for_status(state.status), &line);
        }

        if let Some(metrics) = ScrollMetrics::compute(tasks.len(), rows, *scroll_top) {
            scrollbar::draw(screen, width, &metrics, &self.styles);
        }

        let progress = self.scheduler.overall_progress();
        progress_bar::draw(screen, height - 1, width, &progress, &self.styles);

        screen.show()
    }

    /// Apply one input event.
    ///
    /// Resize resyncs the screen and redraws; Up and Down scroll by one row
    /// and redraw; Escape, Ctrl+C and `q` signal quit. Key releases and
    /// other keys are ignored.
    pub fn handle_event(&self, event: Event) -> io::Result<Flow> {
        match event {
            Event::Resize { .. } => {
                if let Some(screen) = self.lock().screen.as_mut() {
                    screen.sync()?;
                }
                self.redraw()?;
            }
            Event::Key(key) if key.kind != KeyEventKind::Release => {
                if is_quit_key(&key) {
                    if self.quit.signal() {
                        tcheck_core::debug!("quit requested from keyboard");
                    }
                    return Ok(Flow::Quit);
                }
                match key.code {
                    KeyCode::Down => {
                        self.scroll_down();
                        self.redraw()?;
                    }
                    KeyCode::Up => {
                        self.scroll_up();
                        self.redraw()?;
                    }
                    _ => {}
                }
            }
            Event::Key(_) => {}
        }
        Ok(Flow::Continue)
    }

    fn scroll_down(&self) {
        let mut state = self.lock();
        let Some(screen) = state.screen.as_ref() else {
            return;
        };
        let rows = usize::from(screen.size().1.saturating_sub(1));
        let count = self.scheduler.len();
        if count > rows && state.scroll_top < count - rows {
            state.scroll_top += 1;
        }
    }

    fn scroll_up(&self) {
        let mut state = self.lock();
        state.scroll_top = state.scroll_top.saturating_sub(1);
    }

    /// Draw, process input until quit, then release the screen.
    ///
    /// Blocks the calling thread. Input is read on a separate thread so the
    /// caller only waits on the quit signal, which either a quit key or
    /// [`stop`](Self::stop) sets. An input error also ends the loop and is
    /// returned once the screen has been released.
    pub fn run<E>(self: &Arc<Self>, mut events: E) -> io::Result<()>
    where
        E: EventSource + 'static,
    {
        let initial = self.redraw();
        if initial.is_err() {
            self.release_screen();
            return initial;
        }

        let view = Arc::clone(self);
        let input = thread::Builder::new()
            .name("tcheck-input".into())
            .spawn(move || -> io::Result<()> {
                let result = view.input_loop(&mut events);
                // Whatever ended the loop, the owner must stop waiting.
                view.quit.signal();
                result
            });
        let input = match input {
            Ok(handle) => handle,
            Err(err) => {
                self.release_screen();
                return Err(err);
            }
        };

        self.quit.wait();
        let result = match input.join() {
            Ok(result) => result,
            Err(_) => Err(io::Error::other("input thread panicked")),
        };
        self.release_screen();
        tcheck_core::debug!("task list view closed");
        result
    }

    fn input_loop(&self, events: &mut impl EventSource) -> io::Result<()> {
        while !self.quit.is_set() {
            let Some(event) = events.poll_event(self.config.poll_interval)? else {
                continue;
            };
            if self.handle_event(event)? == Flow::Quit {
                break;
            }
        }
        Ok(())
    }

    /// Ask a running view to exit without a key press. Calling it again, or
    /// after a quit key, has no effect.
    pub fn stop(&self) {
        if self.quit.signal() {
            tcheck_core::debug!("quit requested by stop()");
        }
    }

    fn release_screen(&self) {
        let screen = self.lock().screen.take();
        drop(screen);
    }

    fn lock(&self) -> MutexGuard<'_, ViewState<S>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn is_quit_key(key: &KeyEvent) -> bool {
    key.code == KeyCode::Escape || key.is_ctrl('c') || key.is_char('q')
}

struct RedrawListener<S: Screen> {
    view: Weak<TaskListView<S>>,
}

impl<S: Screen + 'static> ChangeListener for RedrawListener<S> {
    fn notify(&self) {
        if let Some(view) = self.view.upgrade()
            && let Err(_err) = view.redraw()
        {
            #[cfg(feature = "tracing")]
            tracing::warn!(error = %_err, "redraw failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tcheck_core::SchedulerConfig;
    use tcheck_render::{HeadlessScreen, Modifiers, PackedRgba, Style};

    fn view_with(tasks: usize, width: u16, height: u16) -> (Arc<TaskListView<HeadlessScreen>>, tcheck_render::HeadlessProbe) {
        let scheduler = Scheduler::new(SchedulerConfig::default());
        for i in 0..tasks {
            scheduler.register(format!("Task {i}"), |_| Ok(()));
        }
        let screen = HeadlessScreen::new(width, height);
        let probe = screen.probe();
        (TaskListView::new(screen, scheduler), probe)
    }

    #[test]
    fn quit_keys() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c')).with_modifiers(Modifiers::CTRL);
        assert!(is_quit_key(&ctrl_c));
        assert!(is_quit_key(&KeyEvent::new(KeyCode::Escape)));
        assert!(is_quit_key(&KeyEvent::new(KeyCode::Char('q'))));
        assert!(!is_quit_key(&KeyEvent::new(KeyCode::Char('c'))));
        assert!(!is_quit_key(&KeyEvent::new(KeyCode::Enter)));
    }

    #[test]
    fn lines_use_the_configured_styles() {
        let scheduler = Scheduler::new(SchedulerConfig::default());
        scheduler.register("done", |_| Ok(()));
        scheduler.snapshot()[0].run();
        let styles = ViewStyles {
            success: Style::new().fg(PackedRgba::WHITE),
            ..ViewStyles::default()
        };
        let screen = HeadlessScreen::new(20, 4);
        let probe = screen.probe();
        let view = TaskListView::with_options(screen, scheduler, styles, ViewConfig::default());
        view.redraw().unwrap();
        assert_eq!(probe.frame().get(0, 0).unwrap().style, view.styles().success);
        assert_eq!(view.styles().success.fg, PackedRgba::WHITE);
    }

    #[test]
    fn scroll_is_bounded() {
        let (view, _) = view_with(6, 30, 4);
        // 3 list rows, 6 tasks: max scroll 3.
        for _ in 0..10 {
            view.handle_event(KeyCode::Down.into()).unwrap();
        }
        assert_eq!(view.scroll_top(), 3);
        for _ in 0..10 {
            view.handle_event(KeyCode::Up.into()).unwrap();
        }
        assert_eq!(view.scroll_top(), 0);
    }

    #[test]
    fn no_scroll_when_everything_fits() {
        let (view, _) = view_with(2, 30, 10);
        view.handle_event(KeyCode::Down.into()).unwrap();
        assert_eq!(view.scroll_top(), 0);
    }

    #[test]
    fn key_release_is_ignored() {
        let (view, _) = view_with(6, 30, 4);
        let release = KeyEvent::new(KeyCode::Down).with_kind(KeyEventKind::Release);
        view.handle_event(Event::Key(release)).unwrap();
        assert_eq!(view.scroll_top(), 0);
        let q_release = KeyEvent::new(KeyCode::Char('q')).with_kind(KeyEventKind::Release);
        assert_eq!(view.handle_event(Event::Key(q_release)).unwrap(), Flow::Continue);
        assert!(!view.is_quit());
    }

    #[test]
    fn redraw_after_release_is_a_noop() {
        let (view, probe) = view_with(1, 30, 4);
        view.redraw().unwrap();
        assert_eq!(probe.shows(), 1);
        view.release_screen();
        assert!(probe.is_released());
        view.redraw().unwrap();
        assert_eq!(probe.shows(), 1);
    }

    #[test]
    fn listener_does_not_keep_view_alive() {
        let (view, probe) = view_with(1, 30, 4);
        let listener = view.listener();
        listener.notify();
        assert_eq!(probe.shows(), 1);
        drop(view);
        assert!(probe.is_released());
        listener.notify();
    }
}
