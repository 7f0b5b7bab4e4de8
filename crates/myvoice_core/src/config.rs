//! Core runtime configuration.
//!
//! # Responsibility
//! - Hold storage keys, canvas readiness timing, speech rate and first-run
//!   policy in one serde struct.
//! - Load overrides from TOML; every field is optional.
//!
//! # Invariants
//! - A config returned by `from_toml_str`/`load` has passed `validate()`.
//! - `ready_timeout >= poll_interval > 0`.

use crate::logging::default_log_level;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_DECK_SLOT_KEY: &str = "aac-cards-storage";
pub const DEFAULT_DRAWING_KEY: &str = "my-voice-sketch-paths";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;
pub const DEFAULT_READY_TIMEOUT_MS: u64 = 3_000;
pub const DEFAULT_SPEECH_RATE: f32 = 0.9;
const MAX_SPEECH_RATE: f32 = 10.0;

/// Configuration load/validation errors.
#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(toml::de::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config syntax: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        Self::Parse(value)
    }
}

/// What the deck store does when its slot has never been written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FirstRunPolicy {
    /// Seed the built-in cards and persist them.
    #[default]
    Defaults,
    /// Start with no cards.
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    pub deck_slot_key: String,
    pub drawing_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            deck_slot_key: DEFAULT_DECK_SLOT_KEY.to_string(),
            drawing_key: DEFAULT_DRAWING_KEY.to_string(),
        }
    }
}

/// Timing for the canvas readiness poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CanvasConfig {
    pub poll_interval_ms: u64,
    pub ready_timeout_ms: u64,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            ready_timeout_ms: DEFAULT_READY_TIMEOUT_MS,
        }
    }
}

impl CanvasConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn ready_timeout(&self) -> Duration {
        Duration::from_millis(self.ready_timeout_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpeechConfig {
    pub rate: f32,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            rate: DEFAULT_SPEECH_RATE,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeckConfig {
    pub first_run: FirstRunPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: String,
    /// Absolute directory for rolling log files; logging stays off when unset.
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level().to_string(),
            dir: None,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoreConfig {
    pub storage: StorageConfig,
    pub canvas: CanvasConfig,
    pub speech: SpeechConfig,
    pub deck: DeckConfig,
    pub logging: LoggingConfig,
}

impl CoreConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.deck_slot_key.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "storage.deck_slot_key cannot be empty".to_string(),
            ));
        }
        if self.storage.drawing_key.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "storage.drawing_key cannot be empty".to_string(),
            ));
        }
        if self.canvas.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "canvas.poll_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.canvas.ready_timeout_ms < self.canvas.poll_interval_ms {
            return Err(ConfigError::Invalid(format!(
                "canvas.ready_timeout_ms ({}) must be >= canvas.poll_interval_ms ({})",
                self.canvas.ready_timeout_ms, self.canvas.poll_interval_ms
            )));
        }
        if !(self.speech.rate > 0.0 && self.speech.rate <= MAX_SPEECH_RATE) {
            return Err(ConfigError::Invalid(format!(
                "speech.rate must be in (0, {MAX_SPEECH_RATE}], got {}",
                self.speech.rate
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig, FirstRunPolicy};
    use std::time::Duration;

    #[test]
    fn empty_document_yields_defaults() {
        let config = CoreConfig::from_toml_str("").expect("empty config should parse");
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.storage.deck_slot_key, "aac-cards-storage");
        assert_eq!(config.canvas.poll_interval(), Duration::from_millis(100));
        assert_eq!(config.canvas.ready_timeout(), Duration::from_secs(3));
        assert_eq!(config.deck.first_run, FirstRunPolicy::Defaults);
    }

    #[test]
    fn partial_overrides_keep_other_defaults() {
        let config = CoreConfig::from_toml_str(
            "[canvas]\npoll_interval_ms = 50\n\n[deck]\nfirst_run = \"empty\"\n",
        )
        .expect("override config should parse");
        assert_eq!(config.canvas.poll_interval_ms, 50);
        assert_eq!(config.canvas.ready_timeout_ms, 3_000);
        assert_eq!(config.deck.first_run, FirstRunPolicy::Empty);
    }

    #[test]
    fn rejects_timeout_shorter_than_interval() {
        let err = CoreConfig::from_toml_str(
            "[canvas]\npoll_interval_ms = 500\nready_timeout_ms = 100\n",
        )
        .expect_err("inverted timing must be rejected");
        assert!(matches!(err, ConfigError::Invalid(message) if message.contains("ready_timeout_ms")));
    }

    #[test]
    fn rejects_unknown_fields() {
        let err = CoreConfig::from_toml_str("[speech]\npitch = 2.0\n")
            .expect_err("unknown keys must be rejected");
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn rejects_non_positive_speech_rate() {
        let err = CoreConfig::from_toml_str("[speech]\nrate = 0.0\n")
            .expect_err("zero rate must be rejected");
        assert!(matches!(err, ConfigError::Invalid(_)));
    }
}
