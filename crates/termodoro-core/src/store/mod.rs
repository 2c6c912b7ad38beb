//! Authoritative timer store.
//!
//! A single task owns the [`TimerEngine`], the tick source and the window
//! registry. Window contexts talk to it through a cloneable [`StoreHandle`];
//! messages are applied one at a time in arrival order, so the engine has
//! exactly one writer and needs no lock. Every change is pushed to all
//! attached windows as a `timer-state-update` event.

mod registry;

pub use registry::WindowRegistry;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::error::{CoreError, Result};
use crate::events::{Event, TimerCommand};
use crate::storage::Config;
use crate::timer::{Debounce, TickOutcome, Ticker, TimerEngine, TimerSnapshot};
use crate::window::{WindowChannel, WindowRole};

/// Delay between a session reaching zero and the next session starting.
pub const DEFAULT_TRANSITION_DEBOUNCE: Duration = Duration::from_millis(100);

/// Messages accepted by the store task.
pub enum StoreMessage {
    Dispatch(TimerCommand),
    /// Push the current snapshot to one window.
    RequestSnapshot(WindowRole),
    /// Reply with the current snapshot.
    Query(oneshot::Sender<TimerSnapshot>),
    Attach(Arc<dyn WindowChannel>),
    Detach(WindowRole),
    /// Deliver a non-timer event to one window.
    Notify { role: WindowRole, event: Event },
    Shutdown,
}

/// Cloneable entry point handed to every window-handling component.
#[derive(Clone)]
pub struct StoreHandle {
    tx: mpsc::UnboundedSender<StoreMessage>,
}

impl StoreHandle {
    fn send(&self, message: StoreMessage) -> Result<()> {
        self.tx.send(message).map_err(|_| CoreError::StoreClosed)
    }

    pub fn dispatch(&self, command: TimerCommand) -> Result<()> {
        self.send(StoreMessage::Dispatch(command))
    }

    pub fn request_snapshot(&self, role: WindowRole) -> Result<()> {
        self.send(StoreMessage::RequestSnapshot(role))
    }

    pub fn attach(&self, channel: Arc<dyn WindowChannel>) -> Result<()> {
        self.send(StoreMessage::Attach(channel))
    }

    pub fn detach(&self, role: WindowRole) -> Result<()> {
        self.send(StoreMessage::Detach(role))
    }

    pub fn notify(&self, role: WindowRole, event: Event) -> Result<()> {
        self.send(StoreMessage::Notify { role, event })
    }

    pub fn shutdown(&self) -> Result<()> {
        self.send(StoreMessage::Shutdown)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Current snapshot, read through the store task.
    pub async fn snapshot(&self) -> Result<TimerSnapshot> {
        let (reply, rx) = oneshot::channel();
        self.send(StoreMessage::Query(reply))?;
        rx.await.map_err(|_| CoreError::StoreClosed)
    }
}

enum Wake {
    Message(Option<StoreMessage>),
    Tick,
    TransitionDue,
}

/// Single owner and only writer of the timer state.
pub struct TimerStore {
    engine: TimerEngine,
    windows: WindowRegistry,
    ticker: Ticker,
    debounce: Debounce,
    debounce_delay: Duration,
}

impl TimerStore {
    pub fn new(engine: TimerEngine) -> Self {
        Self {
            engine,
            windows: WindowRegistry::default(),
            ticker: Ticker::idle(),
            debounce: Debounce::default(),
            debounce_delay: DEFAULT_TRANSITION_DEBOUNCE,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let engine = TimerEngine::new(config.timer_settings(), config.speed_presets());
        Self::new(engine).with_debounce(config.transition_debounce())
    }

    pub fn with_debounce(mut self, delay: Duration) -> Self {
        self.debounce_delay = delay;
        self
    }

    /// Start the store task on the current runtime.
    pub fn spawn(self) -> (StoreHandle, JoinHandle<()>) {
        let (handle, task) = self.into_task();
        (handle, tokio::spawn(task))
    }

    /// Split into a handle and the store task, for hosts that spawn on an
    /// executor of their own.
    pub fn into_task(self) -> (StoreHandle, impl Future<Output = ()> + Send + 'static) {
        let (tx, rx) = mpsc::unbounded_channel();
        (StoreHandle { tx }, self.run(rx))
    }

    /// Process messages, ticks and transitions until shutdown or until every
    /// handle is dropped.
    pub async fn run(mut self, mut rx: mpsc::UnboundedReceiver<StoreMessage>) {
        tracing::info!(
            mode = %self.engine.mode(),
            remaining = self.engine.time_remaining(),
            "timer store started"
        );
        loop {
            let wake = tokio::select! {
                message = rx.recv() => Wake::Message(message),
                _ = self.ticker.tick() => Wake::Tick,
                _ = self.debounce.fired() => Wake::TransitionDue,
            };
            match wake {
                Wake::Message(Some(StoreMessage::Shutdown)) | Wake::Message(None) => break,
                Wake::Message(Some(message)) => self.handle(message),
                Wake::Tick => self.on_tick(),
                Wake::TransitionDue => self.on_transition_due(),
            }
        }
        self.ticker.cancel();
        tracing::info!("timer store stopped");
    }

    fn handle(&mut self, message: StoreMessage) {
        match message {
            StoreMessage::Dispatch(command) => self.dispatch(command),
            StoreMessage::RequestSnapshot(role) => self.request_snapshot(role),
            StoreMessage::Query(reply) => {
                let _ = reply.send(self.snapshot());
            }
            StoreMessage::Attach(channel) => self.attach(channel),
            StoreMessage::Detach(role) => self.detach(role),
            StoreMessage::Notify { role, event } => {
                self.windows.send_to(role, &event);
            }
            StoreMessage::Shutdown => {}
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn snapshot(&self) -> TimerSnapshot {
        self.engine.snapshot()
    }

    pub fn engine(&self) -> &TimerEngine {
        &self.engine
    }

    pub fn windows(&self) -> &WindowRegistry {
        &self.windows
    }

    pub fn is_ticking(&self) -> bool {
        self.ticker.is_active()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Attach a window and bring it up to date immediately.
    pub fn attach(&mut self, channel: Arc<dyn WindowChannel>) {
        let role = channel.role();
        self.windows.attach(channel);
        tracing::info!(window = %role, attached = self.windows.len(), "window attached");
        self.request_snapshot(role);
    }

    pub fn detach(&mut self, role: WindowRole) {
        if self.windows.detach(role) {
            tracing::info!(window = %role, attached = self.windows.len(), "window detached");
        }
    }

    /// Apply a command to the engine, keep the tick source in step with the
    /// running flag and speed, then broadcast the result.
    pub fn dispatch(&mut self, command: TimerCommand) {
        match command {
            TimerCommand::Toggle => {
                let running = self.engine.toggle_running();
                tracing::info!(running, remaining = self.engine.time_remaining(), "timer toggled");
                self.sync_ticker();
            }
            TimerCommand::Skip => match self.engine.skip() {
                Some(transition) => {
                    tracing::info!(
                        to = %transition.mode,
                        completed = transition.completed_pomodoros,
                        "session skipped"
                    );
                    self.sync_ticker();
                }
                None => tracing::debug!("skip ignored, transition already pending"),
            },
            TimerCommand::ToggleSpeed => {
                let speed = self.engine.toggle_speed();
                tracing::info!(%speed, "speed changed");
                self.sync_ticker();
            }
            TimerCommand::UpdateSettings(settings) => {
                if self.engine.apply_settings(settings) {
                    tracing::warn!(?settings, "settings had zero fields, clamped to 1");
                }
                tracing::info!(settings = ?self.engine.settings(), "settings applied");
            }
        }
        self.broadcast(None);
    }

    /// Push the current snapshot to one window.
    pub fn request_snapshot(&mut self, role: WindowRole) {
        let event = Event::TimerStateUpdate(self.snapshot());
        self.windows.send_to(role, &event);
    }

    /// Push the current snapshot to every attached window except `exclude`.
    /// Returns the number of windows reached.
    pub fn broadcast(&mut self, exclude: Option<WindowRole>) -> usize {
        let event = Event::TimerStateUpdate(self.snapshot());
        self.windows.send_all(&event, exclude)
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// (Re)start the tick source at the engine's current period while
    /// running, cancel it otherwise. Restarting replaces the old interval, so
    /// two sources never coexist.
    fn sync_ticker(&mut self) {
        if self.engine.is_running() {
            let period = self.engine.tick_period();
            self.ticker.start(period);
            tracing::debug!(?period, "tick source started");
        } else if self.ticker.is_active() {
            self.ticker.cancel();
            tracing::debug!("tick source cancelled");
        }
    }

    fn on_tick(&mut self) {
        match self.engine.tick() {
            TickOutcome::Ignored => {}
            TickOutcome::Counted => {
                tracing::trace!(remaining = self.engine.time_remaining(), "tick");
                self.broadcast(None);
            }
            TickOutcome::Expired => {
                tracing::info!(mode = %self.engine.mode(), "session expired");
                self.debounce.arm(self.debounce_delay);
                self.broadcast(None);
            }
        }
    }

    fn on_transition_due(&mut self) {
        if let Some(transition) = self.engine.complete_transition() {
            tracing::info!(
                to = %transition.mode,
                duration = transition.duration,
                completed = transition.completed_pomodoros,
                "session transition"
            );
            self.broadcast(None);
        }
    }
}
