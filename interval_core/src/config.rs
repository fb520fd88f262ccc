//! Configuration file support for the interval player.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/intervals/config.toml`.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const MIN_TICK_INTERVAL_MS: u64 = 10;
const MAX_TICK_INTERVAL_MS: u64 = 1000;
const MAX_COUNTDOWN_SECONDS: u32 = 10;

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,

    #[serde(default)]
    pub cues: CueConfig,

    #[serde(default)]
    pub data: DataConfig,
}

/// Countdown clock configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

/// Audio/haptic cue configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CueConfig {
    #[serde(default = "default_true")]
    pub audio_enabled: bool,

    #[serde(default = "default_true")]
    pub haptics_enabled: bool,

    /// Final seconds of each block that get a countdown cue (0 disables)
    #[serde(default = "default_countdown_seconds")]
    pub countdown_seconds: u32,
}

impl Default for CueConfig {
    fn default() -> Self {
        Self {
            audio_enabled: true,
            haptics_enabled: true,
            countdown_seconds: default_countdown_seconds(),
        }
    }
}

/// Routine file location
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_routines_dir")]
    pub routines_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            routines_dir: default_routines_dir(),
        }
    }
}

// Default value functions
fn default_tick_interval_ms() -> u64 {
    crate::ticker::DEFAULT_TICK_INTERVAL.as_millis() as u64
}

fn default_countdown_seconds() -> u32 {
    crate::cue::DEFAULT_COUNTDOWN_SECONDS
}

fn default_true() -> bool {
    true
}

fn default_routines_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from(".local/share"));
    base.join("intervals").join("routines")
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load and validate configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from(".config"));
        base.join("intervals").join("config.toml")
    }

    /// Reject values the timer cannot work with
    pub fn validate(&self) -> Result<()> {
        let tick = self.timer.tick_interval_ms;
        if !(MIN_TICK_INTERVAL_MS..=MAX_TICK_INTERVAL_MS).contains(&tick) {
            return Err(Error::Config(format!(
                "tick_interval_ms must be between {} and {}, got {}",
                MIN_TICK_INTERVAL_MS, MAX_TICK_INTERVAL_MS, tick
            )));
        }

        if self.cues.countdown_seconds > MAX_COUNTDOWN_SECONDS {
            return Err(Error::Config(format!(
                "countdown_seconds must be at most {}, got {}",
                MAX_COUNTDOWN_SECONDS, self.cues.countdown_seconds
            )));
        }

        Ok(())
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to(&config_path)
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.timer.tick_interval_ms, 100);
        assert_eq!(config.cues.countdown_seconds, 3);
        assert!(config.cues.audio_enabled);
        assert!(config.cues.haptics_enabled);
        assert!(config.data.routines_dir.ends_with("intervals/routines"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_roundtrip_through_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.timer.tick_interval_ms = 250;
        config.cues.haptics_enabled = false;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.timer.tick_interval_ms, 250);
        assert!(!loaded.cues.haptics_enabled);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[cues]
audio_enabled = false
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert!(!config.cues.audio_enabled);
        assert!(config.cues.haptics_enabled); // default
        assert_eq!(config.timer.tick_interval_ms, 100); // default
    }

    #[test]
    fn test_invalid_tick_interval_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[timer]\ntick_interval_ms = 5\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_oversized_countdown_rejected() {
        let mut config = Config::default();
        config.cues.countdown_seconds = 30;
        assert!(config.validate().is_err());
    }
}
