//! Configuration management with validation and defaults
//!
//! TOML file, then `BINGO_*` environment overrides, then validation.

use crate::contract::DEFAULT_MAX_PLAYERS;
use crate::errors::{BingoResult, ConfigurationError};
use crate::games::params::GlobalConfig;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BingoConfig {
    #[serde(default)]
    pub game: GameSettings,
    #[serde(default)]
    pub randomness: RandomnessSettings,
    #[serde(default)]
    pub storage: StorageSettings,
}

/// Deployment parameters for the admin store
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSettings {
    pub fee: u64,
    pub join_duration_secs: u64,
    pub turn_duration_secs: u64,
    pub max_players: usize,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            fee: 100,
            join_duration_secs: 10,
            turn_duration_secs: 10,
            max_players: DEFAULT_MAX_PLAYERS,
        }
    }
}

impl GameSettings {
    pub fn global_config(&self) -> GlobalConfig {
        GlobalConfig::new(self.fee, self.join_duration_secs, self.turn_duration_secs)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RandomnessSettings {
    /// Hex-encoded 32-byte seed; drawn from the OS when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<String>,
}

impl RandomnessSettings {
    pub fn seed_bytes(&self) -> BingoResult<Option<[u8; 32]>> {
        let Some(seed) = self.seed.as_deref() else {
            return Ok(None);
        };

        let invalid = |reason: &str| ConfigurationError::InvalidValue {
            field: "randomness.seed".to_string(),
            value: seed.to_string(),
            reason: reason.to_string(),
        };
        let bytes = hex::decode(seed.strip_prefix("0x").unwrap_or(seed))
            .map_err(|_| invalid("not valid hex"))?;
        let array: [u8; 32] = bytes.try_into().map_err(|_| invalid("seed must be 32 bytes"))?;
        Ok(Some(array))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageSettings {
    pub state_path: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            state_path: "./bingo_state.json".to_string(),
        }
    }
}

/// Configuration loader with environment variable support
pub struct ConfigLoader {
    config_path: Option<String>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Set the configuration file path
    pub fn with_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_string_lossy().to_string());
        self
    }

    /// Load configuration from file and environment variables
    pub fn load(&self) -> BingoResult<BingoConfig> {
        let mut config = match self.config_path {
            Some(ref path) => self.load_from_file(path)?,
            None => BingoConfig::default(),
        };

        self.apply_env_overrides(&mut config)?;
        self.validate(&config)?;

        Ok(config)
    }

    fn load_from_file(&self, path: &str) -> BingoResult<BingoConfig> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigurationError::LoadFailed(format!("Failed to read {}: {}", path, e)))?;

        toml::from_str(&content)
            .map_err(|e| ConfigurationError::LoadFailed(format!("Failed to parse TOML: {}", e)).into())
    }

    fn apply_env_overrides(&self, config: &mut BingoConfig) -> BingoResult<()> {
        if let Some(fee) = parse_env("BINGO_FEE")? {
            config.game.fee = fee;
        }
        if let Some(seconds) = parse_env("BINGO_JOIN_DURATION")? {
            config.game.join_duration_secs = seconds;
        }
        if let Some(seconds) = parse_env("BINGO_TURN_DURATION")? {
            config.game.turn_duration_secs = seconds;
        }
        if let Some(max_players) = parse_env("BINGO_MAX_PLAYERS")? {
            config.game.max_players = max_players;
        }
        if let Ok(path) = env::var("BINGO_STATE_PATH") {
            config.storage.state_path = path;
        }
        if let Ok(seed) = env::var("BINGO_SEED") {
            config.randomness.seed = Some(seed);
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self, config: &BingoConfig) -> BingoResult<()> {
        if config.game.max_players == 0 {
            return Err(ConfigurationError::InvalidValue {
                field: "game.max_players".to_string(),
                value: "0".to_string(),
                reason: "A game must admit at least one player".to_string(),
            }
            .into());
        }

        if config.storage.state_path.trim().is_empty() {
            return Err(ConfigurationError::MissingRequired("storage.state_path".to_string()).into());
        }

        config.randomness.seed_bytes()?;
        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, config: &BingoConfig, path: &str) -> BingoResult<()> {
        let toml_string = toml::to_string_pretty(config)
            .map_err(|e| ConfigurationError::SaveFailed(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, toml_string)
            .map_err(|e| ConfigurationError::SaveFailed(format!("Failed to write to {}: {}", path, e)).into())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> BingoResult<Option<T>> {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map(Some).map_err(|_| {
            ConfigurationError::InvalidValue {
                field: key.to_string(),
                value: raw.clone(),
                reason: "Expected an unsigned integer".to_string(),
            }
            .into()
        }),
        Err(_) => Ok(None),
    }
}

/// Builder pattern for creating configurations
pub struct ConfigBuilder {
    config: BingoConfig,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: BingoConfig::default(),
        }
    }

    pub fn fee(mut self, fee: u64) -> Self {
        self.config.game.fee = fee;
        self
    }

    pub fn join_duration(mut self, seconds: u64) -> Self {
        self.config.game.join_duration_secs = seconds;
        self
    }

    pub fn turn_duration(mut self, seconds: u64) -> Self {
        self.config.game.turn_duration_secs = seconds;
        self
    }

    pub fn max_players(mut self, max_players: usize) -> Self {
        self.config.game.max_players = max_players;
        self
    }

    pub fn seed(mut self, seed: [u8; 32]) -> Self {
        self.config.randomness.seed = Some(hex::encode(seed));
        self
    }

    pub fn state_path(mut self, path: impl Into<String>) -> Self {
        self.config.storage.state_path = path.into();
        self
    }

    pub fn build(self) -> BingoConfig {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = BingoConfig::default();
        assert_eq!(config.game.global_config(), GlobalConfig::new(100, 10, 10));
        assert_eq!(config.game.max_players, DEFAULT_MAX_PLAYERS);
        assert!(config.randomness.seed.is_none());
    }

    #[test]
    fn test_config_validation() {
        let loader = ConfigLoader::new();
        let mut config = BingoConfig::default();
        assert!(loader.validate(&config).is_ok());

        config.game.max_players = 0;
        assert!(loader.validate(&config).is_err());

        let mut config = BingoConfig::default();
        config.storage.state_path = " ".to_string();
        assert!(loader.validate(&config).is_err());

        let mut config = BingoConfig::default();
        config.randomness.seed = Some("abcd".to_string());
        assert!(loader.validate(&config).is_err());
    }

    #[test]
    fn test_config_builder() {
        let config = ConfigBuilder::new()
            .fee(110)
            .join_duration(11)
            .turn_duration(12)
            .seed([1; 32])
            .build();

        assert_eq!(config.game.global_config(), GlobalConfig::new(110, 11, 12));
        assert_eq!(config.randomness.seed_bytes().unwrap(), Some([1; 32]));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: BingoConfig = toml::from_str("[game]\nfee = 5\njoin_duration_secs = 60\nturn_duration_secs = 30\nmax_players = 4\n").unwrap();
        assert_eq!(config.game.fee, 5);
        assert_eq!(config.storage, StorageSettings::default());
    }

    #[test]
    fn test_save_and_load_config() -> BingoResult<()> {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_str().unwrap();

        let saved = ConfigBuilder::new().fee(250).max_players(8).build();
        let loader = ConfigLoader::new();
        loader.save(&saved, path)?;

        let loaded = ConfigLoader::new().with_path(path).load()?;
        assert_eq!(loaded.game.max_players, 8);
        assert_eq!(loaded.randomness, saved.randomness);

        Ok(())
    }
}
