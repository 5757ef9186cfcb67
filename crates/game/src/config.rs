//! Run configuration. Loaded from survivors.ron at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::class::PlayerClass;

/// How the headless driver answers level-up prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutoPick {
    /// Always the first card.
    #[default]
    First,
    /// First passive weapon card if any, else the first card.
    PreferWeapons,
    /// Uniformly random card.
    Random,
}

/// Persistent settings. Loaded from `survivors.ron` in the current directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Fixed RNG seed; `None` seeds from entropy.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Where meta progression is stored.
    #[serde(default = "default_save_path")]
    pub save_path: PathBuf,
    /// Simulation steps per second.
    #[serde(default = "default_tick_rate")]
    pub tick_rate: u32,
    #[serde(default = "default_class")]
    pub default_class: PlayerClass,
    /// Length of a headless run in simulated seconds.
    #[serde(default = "default_run_seconds")]
    pub run_seconds: f32,
    #[serde(default)]
    pub auto_pick: AutoPick,
}

fn default_save_path() -> PathBuf {
    PathBuf::from("survivors_meta.ron")
}
fn default_tick_rate() -> u32 {
    60
}
fn default_class() -> PlayerClass {
    PlayerClass::Warrior
}
fn default_run_seconds() -> f32 {
    300.0
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: None,
            save_path: default_save_path(),
            tick_rate: default_tick_rate(),
            default_class: default_class(),
            run_seconds: default_run_seconds(),
            auto_pick: AutoPick::default(),
        }
    }
}

impl GameConfig {
    /// Load config from `survivors.ron`. If the file is missing or invalid, returns default config.
    pub fn load() -> Self {
        Self::load_from(&config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        if let Ok(data) = std::fs::read_to_string(path) {
            match ron::from_str::<GameConfig>(&data) {
                Ok(c) => return c.sanitized(),
                Err(e) => log::warn!("Invalid config at {:?}: {}, using defaults", path, e),
            }
        }
        Self::default()
    }

    /// Save current config to `survivors.ron`. Logs on error.
    pub fn save(&self) {
        let path = config_path();
        if let Ok(s) = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default()) {
            if let Err(e) = std::fs::write(&path, s) {
                log::warn!("Could not write config to {:?}: {}", path, e);
            }
        }
    }

    /// Seconds per simulation step.
    pub fn timestep(&self) -> f32 {
        1.0 / self.tick_rate as f32
    }

    fn sanitized(mut self) -> Self {
        if self.tick_rate == 0 {
            log::warn!("tick_rate 0 is invalid, using {}", default_tick_rate());
            self.tick_rate = default_tick_rate();
        }
        if !(self.run_seconds.is_finite() && self.run_seconds > 0.0) {
            log::warn!("run_seconds {} is invalid, using {}", self.run_seconds, default_run_seconds());
            self.run_seconds = default_run_seconds();
        }
        self
    }
}

fn config_path() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")).join("survivors.ron")
}
