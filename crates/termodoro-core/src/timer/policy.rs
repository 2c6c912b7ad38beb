//! Session transition policy.
//!
//! Decides which session follows the current one. Every Nth completed work
//! session earns a long break; every other work session earns a short break;
//! every break is followed by work.

use serde::Serialize;

use super::settings::{TimerMode, TimerSettings, MIN_DURATION_SECS};
use crate::error::ValidationError;

/// Result of evaluating the policy: the session to enter next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transition {
    pub mode: TimerMode,
    /// Full duration of the next session in seconds.
    pub duration: u64,
    pub completed_pomodoros: u32,
}

/// Evaluate the policy, reporting malformed input instead of guessing.
///
/// # Errors
///
/// Fails when the settings carry a zero field or the completed counter is
/// already at its maximum.
pub fn try_next_state(
    current: TimerMode,
    completed_pomodoros: u32,
    settings: &TimerSettings,
) -> Result<Transition, ValidationError> {
    settings.validate()?;

    if current.is_break() {
        return Ok(Transition {
            mode: TimerMode::Work,
            duration: settings.work_duration,
            completed_pomodoros,
        });
    }

    let completed = completed_pomodoros
        .checked_add(1)
        .ok_or(ValidationError::CounterOverflow)?;
    let mode = if completed % settings.pomodoros_until_long_break == 0 {
        TimerMode::LongBreak
    } else {
        TimerMode::ShortBreak
    };
    Ok(Transition {
        mode,
        duration: settings.duration_for(mode),
        completed_pomodoros: completed,
    })
}

/// Evaluate the policy. Never fails: malformed input falls back to a fresh
/// work session with the counter left as it was.
pub fn next_state(
    current: TimerMode,
    completed_pomodoros: u32,
    settings: &TimerSettings,
) -> Transition {
    try_next_state(current, completed_pomodoros, settings).unwrap_or_else(|err| {
        tracing::warn!(
            error = %err,
            from = %current,
            completed = completed_pomodoros,
            "session transition failed, falling back to work"
        );
        Transition {
            mode: TimerMode::Work,
            duration: settings.work_duration.max(MIN_DURATION_SECS),
            completed_pomodoros,
        }
    })
}

/// The next `count` sessions starting after `from`, as the policy would
/// produce them if every session ran to completion.
pub fn plan(
    settings: &TimerSettings,
    from: TimerMode,
    completed_pomodoros: u32,
    count: usize,
) -> Vec<Transition> {
    let mut steps = Vec::with_capacity(count);
    let mut mode = from;
    let mut completed = completed_pomodoros;
    for _ in 0..count {
        let step = next_state(mode, completed, settings);
        mode = step.mode;
        completed = step.completed_pomodoros;
        steps.push(step);
    }
    steps
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn classic() -> TimerSettings {
        TimerSettings::new(1500, 300, 900, 4)
    }

    #[test]
    fn fourth_work_session_earns_long_break() {
        let t = next_state(TimerMode::Work, 3, &classic());
        assert_eq!(
            t,
            Transition {
                mode: TimerMode::LongBreak,
                duration: 900,
                completed_pomodoros: 4,
            }
        );
    }

    #[test]
    fn break_returns_to_work_without_counting() {
        let t = next_state(TimerMode::ShortBreak, 1, &classic());
        assert_eq!(t.mode, TimerMode::Work);
        assert_eq!(t.duration, 1500);
        assert_eq!(t.completed_pomodoros, 1);

        let t = next_state(TimerMode::LongBreak, 4, &classic());
        assert_eq!(t.mode, TimerMode::Work);
        assert_eq!(t.completed_pomodoros, 4);
    }

    #[test]
    fn zero_cadence_falls_back_to_work() {
        let broken = TimerSettings::new(1500, 300, 900, 0);
        assert!(try_next_state(TimerMode::Work, 2, &broken).is_err());
        let t = next_state(TimerMode::Work, 2, &broken);
        assert_eq!(t.mode, TimerMode::Work);
        assert_eq!(t.duration, 1500);
        assert_eq!(t.completed_pomodoros, 2);
    }

    #[test]
    fn counter_overflow_falls_back_to_work() {
        let t = next_state(TimerMode::Work, u32::MAX, &classic());
        assert_eq!(t.mode, TimerMode::Work);
        assert_eq!(t.completed_pomodoros, u32::MAX);
    }

    #[test]
    fn zero_work_duration_fallback_is_still_positive() {
        let broken = TimerSettings::new(0, 300, 900, 4);
        let t = next_state(TimerMode::LongBreak, 0, &broken);
        assert_eq!(t.mode, TimerMode::Work);
        assert_eq!(t.duration, MIN_DURATION_SECS);
    }

    #[test]
    fn plan_alternates_and_inserts_long_break() {
        let modes: Vec<_> = plan(&classic(), TimerMode::Work, 0, 8)
            .into_iter()
            .map(|t| t.mode)
            .collect();
        assert_eq!(
            modes,
            vec![
                TimerMode::ShortBreak,
                TimerMode::Work,
                TimerMode::ShortBreak,
                TimerMode::Work,
                TimerMode::ShortBreak,
                TimerMode::Work,
                TimerMode::LongBreak,
                TimerMode::Work,
            ]
        );
    }

    fn any_mode() -> impl Strategy<Value = TimerMode> {
        prop_oneof![
            Just(TimerMode::Work),
            Just(TimerMode::ShortBreak),
            Just(TimerMode::LongBreak),
        ]
    }

    proptest! {
        #[test]
        fn duration_is_always_positive(
            mode in any_mode(),
            completed in any::<u32>(),
            work in 0u64..10_000,
            short in 0u64..10_000,
            long in 0u64..10_000,
            cadence in 0u32..12,
        ) {
            let settings = TimerSettings::new(work, short, long, cadence);
            let t = next_state(mode, completed, &settings);
            prop_assert!(t.duration > 0);
        }

        #[test]
        fn counter_moves_only_on_work_completion(
            mode in any_mode(),
            completed in 0u32..1_000_000,
            cadence in 1u32..12,
        ) {
            let settings = TimerSettings::new(1500, 300, 900, cadence);
            let t = next_state(mode, completed, &settings);
            if mode == TimerMode::Work {
                prop_assert_eq!(t.completed_pomodoros, completed + 1);
                prop_assert!(t.mode.is_break());
            } else {
                prop_assert_eq!(t.completed_pomodoros, completed);
                prop_assert_eq!(t.mode, TimerMode::Work);
            }
        }

        #[test]
        fn long_break_iff_cadence_divides_count(
            completed in 0u32..1_000_000,
            cadence in 1u32..12,
        ) {
            let settings = TimerSettings::new(1500, 300, 900, cadence);
            let t = next_state(TimerMode::Work, completed, &settings);
            let due = (completed + 1) % cadence == 0;
            prop_assert_eq!(t.mode == TimerMode::LongBreak, due);
            prop_assert_eq!(t.mode == TimerMode::ShortBreak, !due);
        }
    }
}
