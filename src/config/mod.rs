//! Configuration management.
//!
//! Supports configuration from:
//! - TOML config files (default `<config dir>/moe-router/config.toml`)
//! - Environment variables (`MOE_*`)
//! - CLI arguments (applied by the binary on top)
//!
//! ```toml
//! [routing]
//! expert_count = 32
//! routed_count = 8
//! max_semantic = 5
//!
//! [playback]
//! frames_per_token = 32
//! tail_frames = 20
//! max_tokens = 21
//! frame_interval_ms = 16
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RouterError};
use crate::routing::{
    DEFAULT_EXPERT_COUNT, DEFAULT_MAX_SEMANTIC, DEFAULT_ROUTED_COUNT, MIN_EXPERT_COUNT,
};
use crate::tokenizer::MAX_DISPLAYED_TOKENS;

/// Main configuration struct
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Router configuration
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Playback configuration
    #[serde(default)]
    pub playback: PlaybackConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)?;

        toml::from_str(&content)
            .map_err(|e| RouterError::Config(format!("Failed to parse config: {e}")))
    }

    /// Default config file location, if the platform has a config dir
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("moe-router").join("config.toml"))
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::default().with_env()
    }

    /// Apply `MOE_*` environment overrides on top of this config.
    ///
    /// A variable that is set always wins, even when it equals the default.
    pub fn with_env(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(val) = parse_override(&lookup, "MOE_EXPERT_COUNT") {
            self.routing.expert_count = val;
        }
        if let Some(val) = parse_override(&lookup, "MOE_ROUTED_COUNT") {
            self.routing.routed_count = val;
        }
        if let Some(val) = parse_override(&lookup, "MOE_MAX_SEMANTIC") {
            self.routing.max_semantic = val;
        }
        if let Some(val) = parse_override(&lookup, "MOE_MAX_TOKENS") {
            self.playback.max_tokens = val;
        }
        if let Some(val) = parse_override(&lookup, "MOE_FRAME_INTERVAL_MS") {
            self.playback.frame_interval_ms = val;
        }

        self
    }

    /// Resolve configuration: explicit file (or the default file when it
    /// exists), then environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => Some(path.to_path_buf()),
            None => Self::default_path().filter(|p| p.exists()),
        };

        let base = match file {
            Some(path) => {
                tracing::debug!("Loading config from {}", path.display());
                Self::from_file(path)?
            },
            None => Self::default(),
        };

        let config = base.with_env();
        config.validate()?;
        Ok(config)
    }

    /// Merge with another config (other's non-default values take precedence)
    pub fn merge(self, other: Self) -> Self {
        let routing_default = RoutingConfig::default();
        let playback_default = PlaybackConfig::default();

        Self {
            routing: RoutingConfig {
                expert_count: pick(
                    self.routing.expert_count,
                    other.routing.expert_count,
                    routing_default.expert_count,
                ),
                routed_count: pick(
                    self.routing.routed_count,
                    other.routing.routed_count,
                    routing_default.routed_count,
                ),
                max_semantic: pick(
                    self.routing.max_semantic,
                    other.routing.max_semantic,
                    routing_default.max_semantic,
                ),
            },
            playback: PlaybackConfig {
                frames_per_token: pick(
                    self.playback.frames_per_token,
                    other.playback.frames_per_token,
                    playback_default.frames_per_token,
                ),
                tail_frames: pick(
                    self.playback.tail_frames,
                    other.playback.tail_frames,
                    playback_default.tail_frames,
                ),
                max_tokens: pick(
                    self.playback.max_tokens,
                    other.playback.max_tokens,
                    playback_default.max_tokens,
                ),
                frame_interval_ms: pick(
                    self.playback.frame_interval_ms,
                    other.playback.frame_interval_ms,
                    playback_default.frame_interval_ms,
                ),
            },
        }
    }

    /// Reject configurations the router or playback cannot run with
    pub fn validate(&self) -> Result<()> {
        self.routing.validate()?;
        self.playback.validate()
    }
}

fn pick<T: PartialEq>(base: T, other: T, default: T) -> T {
    if other != default {
        other
    } else {
        base
    }
}

fn parse_override<T: std::str::FromStr>(
    lookup: impl Fn(&str) -> Option<String>,
    key: &str,
) -> Option<T> {
    let raw = lookup(key)?;
    match raw.parse() {
        Ok(val) => Some(val),
        Err(_) => {
            tracing::warn!("Ignoring {key}={raw}: not a valid number");
            None
        },
    }
}

/// Router configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Experts per layer, including the shared expert (clamped to 32)
    pub expert_count: usize,

    /// Routed experts per token
    pub routed_count: usize,

    /// Semantic candidates admitted before scatter-fill
    pub max_semantic: usize,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            expert_count: DEFAULT_EXPERT_COUNT,
            routed_count: DEFAULT_ROUTED_COUNT,
            max_semantic: DEFAULT_MAX_SEMANTIC,
        }
    }
}

impl RoutingConfig {
    /// Check the expert count leaves room for routed experts
    pub fn validate(&self) -> Result<()> {
        if self.expert_count < MIN_EXPERT_COUNT {
            return Err(RouterError::InvalidConfiguration(format!(
                "routing.expert_count must be at least {MIN_EXPERT_COUNT}, got {}",
                self.expert_count
            )));
        }
        Ok(())
    }
}

/// Playback pacing configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Frames each token stays on screen
    pub frames_per_token: usize,

    /// Extra frames after the last token
    pub tail_frames: usize,

    /// Tokens shown at once
    pub max_tokens: usize,

    /// Milliseconds between frames
    pub frame_interval_ms: u64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            frames_per_token: 32,
            tail_frames: 20,
            max_tokens: MAX_DISPLAYED_TOKENS,
            frame_interval_ms: 16, // ~60 fps
        }
    }
}

impl PlaybackConfig {
    /// Time between frames
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    /// Check that tokens get at least one frame
    pub fn validate(&self) -> Result<()> {
        if self.frames_per_token == 0 {
            return Err(RouterError::InvalidConfiguration(
                "playback.frames_per_token must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
