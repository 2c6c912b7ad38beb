mod engine;
mod policy;
mod settings;
mod ticker;

pub use engine::{Phase, TickOutcome, TimerEngine, TimerSnapshot};
pub use policy::{next_state, plan, try_next_state, Transition};
pub use settings::{
    SpeedMultiplier, SpeedPresets, TimerMode, TimerSettings, MAX_SPEED_FACTOR, MIN_DURATION_SECS,
};
pub use ticker::{Debounce, Ticker};
