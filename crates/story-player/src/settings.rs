use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::StoryError;

pub const DEFAULT_DURATION_MS: u64 = 10_000;
pub const DEFAULT_LONG_PRESS_MS: u64 = 500;
pub const FALLBACK_SWIPE_LABEL: &str = "Swipe Up";

/// Thresholds handed to the platform swipe recogniser.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwipeConfig {
    #[serde(default = "default_velocity_threshold")]
    pub velocity_threshold: f32,
    #[serde(default = "default_directional_offset_threshold")]
    pub directional_offset_threshold: f32,
}

fn default_velocity_threshold() -> f32 { 0.3 }
fn default_directional_offset_threshold() -> f32 { 80.0 }

impl Default for SwipeConfig {
    fn default() -> Self {
        Self {
            velocity_threshold: 0.3,
            directional_offset_threshold: 80.0,
        }
    }
}

/// Per-embedding player configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    /// Playback duration for image items, in milliseconds.
    #[serde(default = "default_duration_ms")]
    pub default_duration_ms: u64,
    #[serde(default)]
    pub swipe: SwipeConfig,
    /// Presses shorter than this are taps unless the recogniser reports a long press.
    #[serde(default = "default_long_press_ms")]
    pub long_press_ms: u64,
    /// Label shown on the swipe-up affordance when the item has none.
    #[serde(default)]
    pub swipe_label: Option<String>,
}

fn default_version() -> u32 { 1 }
fn default_duration_ms() -> u64 { DEFAULT_DURATION_MS }
fn default_long_press_ms() -> u64 { DEFAULT_LONG_PRESS_MS }

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            version: 1,
            default_duration_ms: DEFAULT_DURATION_MS,
            swipe: SwipeConfig::default(),
            long_press_ms: DEFAULT_LONG_PRESS_MS,
            swipe_label: None,
        }
    }
}

impl PlayerConfig {
    pub fn with_default_duration(mut self, duration_ms: u64) -> Self {
        self.default_duration_ms = duration_ms;
        self
    }

    /// Reject durations the clock cannot run on.
    pub fn validate(&self) -> std::result::Result<(), StoryError> {
        if self.default_duration_ms == 0 {
            return Err(StoryError::InvalidDuration {
                what: "default_duration_ms",
                value: 0.0,
            });
        }
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        config_dir.join("story-player").join("player.json")
    }

    /// Load from the user config dir, falling back to defaults.
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            log::info!("No player config found, using defaults");
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(config) => {
                log::info!("Loaded player config from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("Failed to load player config: {e:#}");
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config = serde_json::from_str(&contents)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    pub fn save(&self) {
        let path = Self::config_path();
        match self.save_to(&path) {
            Ok(()) => log::debug!("Saved player config to {}", path.display()),
            Err(e) => log::error!("Failed to write player config: {e:#}"),
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }
}
