//! # Termodoro Core Library
//!
//! Core logic for the Termodoro Pomodoro timer. The desktop application and
//! the terminal CLI are both thin hosts over this crate.
//!
//! ## Architecture
//!
//! - **Timer**: a pure state machine plus the session transition policy
//! - **Store**: a single task owning the timer state, its tick source and
//!   the set of attached windows; every change is broadcast to all of them
//! - **Window**: the popout lifecycle, written against a platform
//!   [`WindowHost`]
//! - **Storage**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core timer state machine
//! - [`TimerStore`]: Authoritative state owner and broadcaster
//! - [`WindowLifecycle`]: Popout creation, closing and activation
//! - [`Config`]: Application configuration management

pub mod error;
pub mod events;
pub mod storage;
pub mod store;
pub mod timer;
pub mod window;

pub use error::{ChannelError, ConfigError, CoreError, ValidationError, WindowError};
pub use events::{Command, Event, TimerCommand, WindowCommand};
pub use storage::Config;
pub use store::{StoreHandle, TimerStore};
pub use timer::{
    SpeedMultiplier, SpeedPresets, TimerEngine, TimerMode, TimerSettings, TimerSnapshot,
    Transition,
};
pub use window::{PopoutOptions, QueueWindow, WindowChannel, WindowHost, WindowLifecycle, WindowRole};
