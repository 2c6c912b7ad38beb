//! TOML-based application configuration.
//!
//! Stores the startup defaults:
//! - Session durations and long-break cadence
//! - Speed multiplier presets
//! - Transition debounce
//! - Popout geometry and the activation shortcut
//!
//! Configuration is stored at `~/.config/termodoro/config.toml`. Live timer
//! state is never written here.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::data_dir;
use crate::error::ConfigError;
use crate::timer::{SpeedPresets, TimerSettings};
use crate::window::PopoutOptions;

/// Session durations (seconds) and long-break cadence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_work_duration")]
    pub work_duration: u64,
    #[serde(default = "default_short_break_duration")]
    pub short_break_duration: u64,
    #[serde(default = "default_long_break_duration")]
    pub long_break_duration: u64,
    #[serde(default = "default_pomodoros_until_long_break")]
    pub pomodoros_until_long_break: u32,
}

/// Speed multiplier cycle walked by toggle-speed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeedConfig {
    #[serde(default = "default_speed_presets")]
    pub presets: Vec<u32>,
}

/// Session transition timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionConfig {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

/// Popout window and global shortcut.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "default_popout_width")]
    pub popout_width: f64,
    #[serde(default = "default_popout_height")]
    pub popout_height: f64,
    #[serde(default = "default_true")]
    pub popout_always_on_top: bool,
    #[serde(default = "default_activate_shortcut")]
    pub activate_shortcut: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/termodoro/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub speed: SpeedConfig,
    #[serde(default)]
    pub transition: TransitionConfig,
    #[serde(default)]
    pub window: WindowConfig,
}

// Default functions
fn default_work_duration() -> u64 {
    25 * 60
}
fn default_short_break_duration() -> u64 {
    5 * 60
}
fn default_long_break_duration() -> u64 {
    15 * 60
}
fn default_pomodoros_until_long_break() -> u32 {
    4
}
fn default_speed_presets() -> Vec<u32> {
    vec![1, 60]
}
fn default_debounce_ms() -> u64 {
    100
}
fn default_popout_width() -> f64 {
    300.0
}
fn default_popout_height() -> f64 {
    200.0
}
fn default_true() -> bool {
    true
}
fn default_activate_shortcut() -> String {
    "CommandOrControl+Shift+0".into()
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            work_duration: default_work_duration(),
            short_break_duration: default_short_break_duration(),
            long_break_duration: default_long_break_duration(),
            pomodoros_until_long_break: default_pomodoros_until_long_break(),
        }
    }
}

impl Default for SpeedConfig {
    fn default() -> Self {
        Self {
            presets: default_speed_presets(),
        }
    }
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            popout_width: default_popout_width(),
            popout_height: default_popout_height(),
            popout_always_on_top: true,
            activate_shortcut: default_activate_shortcut(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().map_or(true, |p| p.is_empty()) {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                        } else {
                            return Err(invalid(format!("cannot parse '{value}' as number")));
                        }
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Default location of the config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory cannot be created.
    pub fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("~/.config/termodoro"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from the default location, writing defaults if the file is
    /// missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults there if the file is missing.
    ///
    /// # Errors
    ///
    /// Same as [`Config::load`].
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                toml::from_str(&content).map_err(|e| ConfigError::ParseFailed(e.to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "using default configuration");
            Self::default()
        })
    }

    /// Persist to the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// Persist to `path`.
    ///
    /// # Errors
    ///
    /// Same as [`Config::save`].
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| save_failed(e.to_string()))?;
        }
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key, keeping the existing type.
    /// Does not persist; call [`Config::save`] afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed
    /// as the key's type.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json =
            serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    pub fn timer_settings(&self) -> TimerSettings {
        TimerSettings::new(
            self.timer.work_duration,
            self.timer.short_break_duration,
            self.timer.long_break_duration,
            self.timer.pomodoros_until_long_break,
        )
    }

    /// Speed presets, or the built-in `[1, 60]` cycle when the configured
    /// list has no usable entry.
    pub fn speed_presets(&self) -> SpeedPresets {
        SpeedPresets::new(&self.speed.presets).unwrap_or_else(|e| {
            tracing::warn!(error = %e, presets = ?self.speed.presets, "using default speed presets");
            SpeedPresets::default()
        })
    }

    pub fn transition_debounce(&self) -> Duration {
        Duration::from_millis(self.transition.debounce_ms)
    }

    pub fn popout_options(&self) -> PopoutOptions {
        PopoutOptions {
            width: self.window.popout_width,
            height: self.window.popout_height,
            always_on_top: self.window.popout_always_on_top,
        }
    }
}
