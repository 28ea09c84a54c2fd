//! Governor thresholds, loaded from YAML and validated before use.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest supported animal segment half-width (5x5 chunks).
pub const MAX_SEGMENT_SIZE: u32 = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MobConfig {
    #[serde(default)]
    pub monster: MonsterConfig,
    #[serde(default)]
    pub animals: AnimalConfig,
    #[serde(default = "default_true")]
    pub player_damage_required_for_drops: bool,
    #[serde(default)]
    pub sweep: SweepConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonsterConfig {
    /// Seconds without interaction before a monster counts as idle.
    #[serde(default = "default_idle_age")]
    pub idle_age: u64,
    /// Square radius, in chunks, around players inside which monsters are
    /// never purged.
    #[serde(default = "default_player_chunk_radius")]
    pub player_chunk_radius: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimalConfig {
    /// Segment half-width: 0 is one chunk, 1 is 3x3, 2 is 5x5.
    #[serde(default = "default_segment_size")]
    pub chunk_segment_size: u32,
    #[serde(default = "default_max_per_segment")]
    pub max_per_segment: u32,
    /// Instead of refusing spawns, kill the oldest animal in a full segment.
    #[serde(default)]
    pub kill_oldest_on_spawn: bool,
    #[serde(default = "default_true")]
    pub ignore_tamed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
    #[serde(default = "default_sweep_interval")]
    pub interval_ticks: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "default_max_tracked_entities")]
    pub max_tracked_entities: usize,
    #[serde(default = "default_max_tracked_chunks")]
    pub max_tracked_chunks: usize,
    #[serde(default = "default_grinder_history")]
    pub grinder_history: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_true() -> bool {
    true
}

fn default_idle_age() -> u64 {
    300
}

fn default_player_chunk_radius() -> u32 {
    1
}

fn default_segment_size() -> u32 {
    1
}

fn default_max_per_segment() -> u32 {
    20
}

// one minute at 20 ticks per second
fn default_sweep_interval() -> u64 {
    1200
}

fn default_max_tracked_entities() -> usize {
    4096
}

fn default_max_tracked_chunks() -> usize {
    1024
}

fn default_grinder_history() -> usize {
    500
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for MonsterConfig {
    fn default() -> Self {
        Self {
            idle_age: default_idle_age(),
            player_chunk_radius: default_player_chunk_radius(),
        }
    }
}

impl Default for AnimalConfig {
    fn default() -> Self {
        Self {
            chunk_segment_size: default_segment_size(),
            max_per_segment: default_max_per_segment(),
            kill_oldest_on_spawn: false,
            ignore_tamed: true,
        }
    }
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            interval_ticks: default_sweep_interval(),
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_tracked_entities: default_max_tracked_entities(),
            max_tracked_chunks: default_max_tracked_chunks(),
            grinder_history: default_grinder_history(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for MobConfig {
    fn default() -> Self {
        Self {
            monster: MonsterConfig::default(),
            animals: AnimalConfig::default(),
            player_damage_required_for_drops: true,
            sweep: SweepConfig::default(),
            limits: LimitsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl MobConfig {
    /// Read, parse and validate a YAML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config: MobConfig = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.animals.chunk_segment_size > MAX_SEGMENT_SIZE {
            return Err(ConfigError::Invalid(format!(
                "animals.chunk_segment_size must be between 0 and {MAX_SEGMENT_SIZE}, got {}",
                self.animals.chunk_segment_size
            )));
        }

        if self.monster.idle_age == 0 {
            return Err(ConfigError::Invalid(
                "monster.idle_age must be at least 1 second".into(),
            ));
        }

        if self.sweep.interval_ticks == 0 {
            return Err(ConfigError::Invalid(
                "sweep.interval_ticks must be greater than zero".into(),
            ));
        }

        let limits = [
            ("limits.max_tracked_entities", self.limits.max_tracked_entities),
            ("limits.max_tracked_chunks", self.limits.max_tracked_chunks),
            ("limits.grinder_history", self.limits.grinder_history),
        ];
        for (name, value) in limits {
            if value == 0 {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be greater than zero"
                )));
            }
        }

        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "logging.level must not be empty".into(),
            ));
        }

        Ok(())
    }

    pub fn idle_age_millis(&self) -> u64 {
        self.monster.idle_age.saturating_mul(1000)
    }
}
