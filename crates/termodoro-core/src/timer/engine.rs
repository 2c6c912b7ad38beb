//! Timer engine implementation.
//!
//! The engine is a plain state machine with no internal threads or timers.
//! The store owns the tick source and calls `tick()` at the period reported
//! by `tick_period()`; when a session expires the engine enters the
//! `Transitioning` phase and waits for the store to call
//! `complete_transition()` after its debounce delay.
//!
//! ## Phases
//!
//! ```text
//! Stable --tick hits 0--> Transitioning --complete_transition--> Stable
//! ```
//!
//! Ticks and skips are ignored while transitioning.

use serde::{Deserialize, Serialize};

use super::policy::{next_state, Transition};
use super::settings::{SpeedMultiplier, SpeedPresets, TimerMode, TimerSettings};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Stable,
    /// The session reached zero and the follow-up transition is scheduled.
    Transitioning,
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Paused or transitioning; nothing changed.
    Ignored,
    /// Time was consumed and the session continues.
    Counted,
    /// The session reached zero; a transition must be scheduled.
    Expired,
}

/// Immutable copy of the timer state handed to window contexts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub mode: TimerMode,
    pub time_remaining: u64,
    pub is_running: bool,
    pub completed_pomodoros: u32,
    pub pomodoros_until_long_break: u32,
    pub settings: TimerSettings,
    pub speed_multiplier: SpeedMultiplier,
}

impl TimerSnapshot {
    /// Remaining time as `MM:SS`. Minutes keep counting past 99.
    pub fn clock(&self) -> String {
        format!("{:02}:{:02}", self.time_remaining / 60, self.time_remaining % 60)
    }
}

/// Core timer state machine.
#[derive(Debug, Clone)]
pub struct TimerEngine {
    mode: TimerMode,
    /// Seconds left in the current session.
    time_remaining: u64,
    is_running: bool,
    completed_pomodoros: u32,
    settings: TimerSettings,
    speed: SpeedMultiplier,
    presets: SpeedPresets,
    phase: Phase,
}

impl Default for TimerEngine {
    fn default() -> Self {
        Self::new(TimerSettings::default(), SpeedPresets::default())
    }
}

impl TimerEngine {
    /// Create a paused engine at the start of a work session.
    ///
    /// Zero fields in `settings` are raised to one.
    pub fn new(settings: TimerSettings, presets: SpeedPresets) -> Self {
        let settings = settings.clamped();
        Self {
            mode: TimerMode::Work,
            time_remaining: settings.work_duration,
            is_running: false,
            completed_pomodoros: 0,
            settings,
            speed: presets.first(),
            presets,
            phase: Phase::Stable,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    pub fn time_remaining(&self) -> u64 {
        self.time_remaining
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    pub fn completed_pomodoros(&self) -> u32 {
        self.completed_pomodoros
    }

    pub fn settings(&self) -> &TimerSettings {
        &self.settings
    }

    pub fn speed(&self) -> SpeedMultiplier {
        self.speed
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_transitioning(&self) -> bool {
        self.phase == Phase::Transitioning
    }

    /// Wall-clock interval the tick source should use at the current speed.
    pub fn tick_period(&self) -> std::time::Duration {
        self.speed.tick_period()
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            mode: self.mode,
            time_remaining: self.time_remaining,
            is_running: self.is_running,
            completed_pomodoros: self.completed_pomodoros,
            pomodoros_until_long_break: self.settings.pomodoros_until_long_break,
            settings: self.settings,
            speed_multiplier: self.speed,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Consume one tick worth of session time.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.is_running || self.is_transitioning() {
            return TickOutcome::Ignored;
        }
        self.time_remaining = self.time_remaining.saturating_sub(self.speed.step_secs());
        if self.time_remaining == 0 {
            self.phase = Phase::Transitioning;
            return TickOutcome::Expired;
        }
        TickOutcome::Counted
    }

    /// Run the scheduled transition. Returns `None` if none was pending.
    pub fn complete_transition(&mut self) -> Option<Transition> {
        if !self.is_transitioning() {
            return None;
        }
        let transition = self.advance();
        self.phase = Phase::Stable;
        Some(transition)
    }

    /// Flip the running flag and return the new value.
    ///
    /// Starting from zero remaining time reloads the full duration of the
    /// current mode, unless a transition is already on its way to do that.
    pub fn toggle_running(&mut self) -> bool {
        self.is_running = !self.is_running;
        if self.is_running && self.time_remaining == 0 && !self.is_transitioning() {
            self.time_remaining = self.settings.duration_for(self.mode);
        }
        self.is_running
    }

    /// Force an immediate transition. No-op while one is already pending.
    /// The running flag is preserved.
    pub fn skip(&mut self) -> Option<Transition> {
        if self.is_transitioning() {
            return None;
        }
        Some(self.advance())
    }

    /// Move to the next speed preset and return it.
    pub fn toggle_speed(&mut self) -> SpeedMultiplier {
        self.speed = self.presets.next_after(self.speed);
        self.speed
    }

    /// Replace the settings. Returns `true` when a zero field had to be
    /// clamped.
    ///
    /// A paused session is reloaded with the new duration for its mode; a
    /// running session keeps its remaining time and only later sessions use
    /// the new durations.
    pub fn apply_settings(&mut self, settings: TimerSettings) -> bool {
        let clamped = settings.clamped();
        self.settings = clamped;
        if !self.is_running && !self.is_transitioning() {
            self.time_remaining = clamped.duration_for(self.mode);
        }
        clamped != settings
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn advance(&mut self) -> Transition {
        let transition = next_state(self.mode, self.completed_pomodoros, &self.settings);
        self.mode = transition.mode;
        self.time_remaining = transition.duration;
        self.completed_pomodoros = transition.completed_pomodoros;
        transition
    }
}
