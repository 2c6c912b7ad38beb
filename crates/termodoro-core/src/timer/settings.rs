use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::error::ValidationError;

/// Shortest duration (and smallest cycle length) a session may be given.
pub const MIN_DURATION_SECS: u64 = 1;

/// Largest accepted speed multiplier. Ticks stay at least a millisecond apart.
pub const MAX_SPEED_FACTOR: u32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimerMode {
    Work,
    ShortBreak,
    LongBreak,
}

impl TimerMode {
    pub fn is_break(self) -> bool {
        !matches!(self, TimerMode::Work)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TimerMode::Work => "WORK",
            TimerMode::ShortBreak => "SHORT BREAK",
            TimerMode::LongBreak => "LONG BREAK",
        }
    }
}

impl fmt::Display for TimerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Session durations in seconds plus the long-break cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSettings {
    pub work_duration: u64,
    pub short_break_duration: u64,
    pub long_break_duration: u64,
    pub pomodoros_until_long_break: u32,
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            work_duration: 25 * 60,
            short_break_duration: 5 * 60,
            long_break_duration: 15 * 60,
            pomodoros_until_long_break: 4,
        }
    }
}

impl TimerSettings {
    pub fn new(
        work_duration: u64,
        short_break_duration: u64,
        long_break_duration: u64,
        pomodoros_until_long_break: u32,
    ) -> Self {
        Self {
            work_duration,
            short_break_duration,
            long_break_duration,
            pomodoros_until_long_break,
        }
    }

    /// Full duration in seconds for a session of `mode`.
    pub fn duration_for(&self, mode: TimerMode) -> u64 {
        match mode {
            TimerMode::Work => self.work_duration,
            TimerMode::ShortBreak => self.short_break_duration,
            TimerMode::LongBreak => self.long_break_duration,
        }
    }

    /// Check that every field is at least one.
    ///
    /// # Errors
    ///
    /// Returns the first field found to be zero.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let fields = [
            ("workDuration", self.work_duration),
            ("shortBreakDuration", self.short_break_duration),
            ("longBreakDuration", self.long_break_duration),
            ("pomodorosUntilLongBreak", u64::from(self.pomodoros_until_long_break)),
        ];
        match fields.into_iter().find(|(_, value)| *value < MIN_DURATION_SECS) {
            Some((field, _)) => Err(ValidationError::NonPositive { field }),
            None => Ok(()),
        }
    }

    /// Copy with every zero field raised to the minimum of one.
    pub fn clamped(self) -> Self {
        Self {
            work_duration: self.work_duration.max(MIN_DURATION_SECS),
            short_break_duration: self.short_break_duration.max(MIN_DURATION_SECS),
            long_break_duration: self.long_break_duration.max(MIN_DURATION_SECS),
            pomodoros_until_long_break: self.pomodoros_until_long_break.max(1),
        }
    }
}

/// Acceleration factor: each tick removes this many seconds and ticks arrive
/// this many times per wall-clock second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpeedMultiplier(u32);

impl SpeedMultiplier {
    pub const REAL_TIME: SpeedMultiplier = SpeedMultiplier(1);

    /// `None` for zero or anything above [`MAX_SPEED_FACTOR`].
    pub fn new(factor: u32) -> Option<Self> {
        (1..=MAX_SPEED_FACTOR).contains(&factor).then_some(Self(factor))
    }

    pub fn factor(self) -> u32 {
        self.0
    }

    /// Wall-clock interval between ticks at this speed.
    pub fn tick_period(self) -> Duration {
        (Duration::from_secs(1) / self.0.max(1)).max(Duration::from_millis(1))
    }

    /// Seconds of session time consumed by one tick.
    pub fn step_secs(self) -> u64 {
        u64::from(self.0)
    }
}

impl Default for SpeedMultiplier {
    fn default() -> Self {
        Self::REAL_TIME
    }
}

impl fmt::Display for SpeedMultiplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x", self.0)
    }
}

/// Ordered cycle of speed multipliers walked by the toggle-speed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeedPresets(Vec<SpeedMultiplier>);

impl SpeedPresets {
    /// Build a cycle from raw factors, dropping zeros.
    ///
    /// # Errors
    ///
    /// Returns `SpeedOutOfRange` for a factor above [`MAX_SPEED_FACTOR`] and
    /// `EmptySpeedPresets` when no non-zero factor remains.
    pub fn new(factors: &[u32]) -> Result<Self, ValidationError> {
        if let Some(&factor) = factors.iter().find(|&&f| f > MAX_SPEED_FACTOR) {
            return Err(ValidationError::SpeedOutOfRange {
                factor,
                max: MAX_SPEED_FACTOR,
            });
        }
        let presets: Vec<_> = factors
            .iter()
            .copied()
            .filter_map(SpeedMultiplier::new)
            .collect();
        if presets.is_empty() {
            return Err(ValidationError::EmptySpeedPresets);
        }
        Ok(Self(presets))
    }

    pub fn first(&self) -> SpeedMultiplier {
        self.0[0]
    }

    /// The preset after `current`, wrapping around. A speed that is not part
    /// of the cycle restarts it from the first entry.
    pub fn next_after(&self, current: SpeedMultiplier) -> SpeedMultiplier {
        match self.0.iter().position(|s| *s == current) {
            Some(i) => self.0[(i + 1) % self.0.len()],
            None => self.first(),
        }
    }

    pub fn as_slice(&self) -> &[SpeedMultiplier] {
        &self.0
    }
}

impl Default for SpeedPresets {
    fn default() -> Self {
        Self(vec![SpeedMultiplier(1), SpeedMultiplier(60)])
    }
}
