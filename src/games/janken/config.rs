//! Game configuration: hand size, starting coins, seats.

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use strum::IntoEnumIterator;
use tracing::{debug, info, instrument, warn};

use super::types::CardKind;

const DEFAULT_HAND_SIZE: usize = 6;
const DEFAULT_INITIAL_COINS: u32 = 3;
const DEFAULT_PLAYER_COUNT: usize = 2;

/// Largest accepted `hand_size`.
pub const MAX_HAND_SIZE: usize = 99;
/// Largest accepted `player_count`.
pub const MAX_PLAYER_COUNT: usize = 8;

/// Validated, immutable game configuration.
///
/// Build through [`GameConfig::create`] or [`GameConfig::from_file`]; both
/// reject out-of-range values before any game is constructed.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize)]
pub struct GameConfig {
    /// Cards dealt to each player.
    hand_size: usize,
    /// Coins each player starts with.
    initial_coins: u32,
    /// Number of seats (one human, the rest computer).
    player_count: usize,
    /// Card kinds in play. Always the full fixed set.
    card_types: Vec<CardKind>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            hand_size: DEFAULT_HAND_SIZE,
            initial_coins: DEFAULT_INITIAL_COINS,
            player_count: DEFAULT_PLAYER_COUNT,
            card_types: CardKind::iter().collect(),
        }
    }
}

/// Partial configuration; unset fields fall back to the defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfigOverrides {
    /// Cards dealt to each player.
    pub hand_size: Option<usize>,
    /// Coins each player starts with.
    pub initial_coins: Option<u32>,
    /// Number of seats.
    pub player_count: Option<usize>,
    /// Accepted for compatibility and ignored.
    pub card_types: Option<Vec<CardKind>>,
}

impl GameConfig {
    /// Validates `overrides` and merges them onto the defaults.
    #[instrument]
    pub fn create(overrides: GameConfigOverrides) -> Result<Self, ConfigError> {
        Self::validate(&overrides)?;

        if overrides.card_types.is_some() {
            warn!("card_types cannot be customized; using the full set");
        }

        let defaults = Self::default();
        let config = Self {
            hand_size: overrides.hand_size.unwrap_or(defaults.hand_size),
            initial_coins: overrides.initial_coins.unwrap_or(defaults.initial_coins),
            player_count: overrides.player_count.unwrap_or(defaults.player_count),
            card_types: defaults.card_types,
        };
        debug!(?config, "Game config created");
        Ok(config)
    }

    /// Checks the supplied fields against their allowed ranges.
    #[instrument]
    pub fn validate(overrides: &GameConfigOverrides) -> Result<(), ConfigError> {
        if overrides.hand_size == Some(0) {
            return Err(ConfigError::new("hand_size must be greater than 0"));
        }
        if let Some(size) = overrides.hand_size
            && size > MAX_HAND_SIZE
        {
            return Err(ConfigError::new(format!(
                "hand_size must be at most {}, got {}",
                MAX_HAND_SIZE, size
            )));
        }
        if overrides.initial_coins == Some(0) {
            return Err(ConfigError::new("initial_coins must be greater than 0"));
        }
        if overrides.player_count.is_some_and(|count| count < 2) {
            return Err(ConfigError::new("player_count must be at least 2"));
        }
        if let Some(count) = overrides.player_count
            && count > MAX_PLAYER_COUNT
        {
            return Err(ConfigError::new(format!(
                "player_count must be at most {}, got {}",
                MAX_PLAYER_COUNT, count
            )));
        }
        Ok(())
    }

    /// Loads and validates configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        let config = Self::from_toml(&content)?;
        info!(
            hand_size = config.hand_size,
            initial_coins = config.initial_coins,
            player_count = config.player_count,
            "Config loaded successfully"
        );
        Ok(config)
    }

    /// Parses and validates configuration from TOML text.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let overrides: GameConfigOverrides = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        Self::create(overrides)
    }

    /// Renders the effective configuration as TOML.
    #[instrument(skip(self))]
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string(self)
            .map_err(|e| ConfigError::new(format!("Failed to render config: {}", e)))
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GameConfig::default();
        assert_eq!(*config.hand_size(), 6);
        assert_eq!(*config.initial_coins(), 3);
        assert_eq!(*config.player_count(), 2);
        assert_eq!(
            config.card_types(),
            &vec![CardKind::Rock, CardKind::Paper, CardKind::Scissors]
        );
    }

    #[test]
    fn test_create_merges_partial_overrides() {
        let config = GameConfig::create(GameConfigOverrides {
            initial_coins: Some(5),
            ..Default::default()
        })
        .expect("valid overrides");
        assert_eq!(*config.initial_coins(), 5);
        assert_eq!(*config.hand_size(), 6);
    }

    #[test]
    fn test_rejects_zero_hand_size() {
        let err = GameConfig::create(GameConfigOverrides {
            hand_size: Some(0),
            ..Default::default()
        })
        .unwrap_err();
        assert!(err.message.contains("hand_size"));
    }

    #[test]
    fn test_hand_size_upper_bound() {
        let at_limit = GameConfig::create(GameConfigOverrides {
            hand_size: Some(MAX_HAND_SIZE),
            ..Default::default()
        })
        .expect("limit is inclusive");
        assert_eq!(*at_limit.hand_size(), MAX_HAND_SIZE);

        let err = GameConfig::from_toml("hand_size = 10000000000\n").unwrap_err();
        assert!(err.message.contains("hand_size must be at most"));
    }

    #[test]
    fn test_rejects_too_many_players() {
        let err = GameConfig::create(GameConfigOverrides {
            player_count: Some(MAX_PLAYER_COUNT + 1),
            ..Default::default()
        })
        .unwrap_err();
        assert!(err.message.contains("player_count"));
    }

    #[test]
    fn test_rejects_zero_coins() {
        let err = GameConfig::create(GameConfigOverrides {
            initial_coins: Some(0),
            ..Default::default()
        })
        .unwrap_err();
        assert!(err.message.contains("initial_coins"));
    }

    #[test]
    fn test_rejects_single_player() {
        let err = GameConfig::create(GameConfigOverrides {
            player_count: Some(1),
            ..Default::default()
        })
        .unwrap_err();
        assert!(err.message.contains("player_count"));
    }

    #[test]
    fn test_card_types_cannot_be_narrowed() {
        let config = GameConfig::create(GameConfigOverrides {
            card_types: Some(vec![CardKind::Rock]),
            ..Default::default()
        })
        .expect("card_types is ignored, not rejected");
        assert_eq!(config.card_types().len(), 3);
    }

    #[test]
    fn test_from_toml() {
        let config = GameConfig::from_toml("hand_size = 9\ninitial_coins = 4\n").expect("valid toml");
        assert_eq!(*config.hand_size(), 9);
        assert_eq!(*config.initial_coins(), 4);
        assert_eq!(*config.player_count(), 2);
    }

    #[test]
    fn test_from_toml_rejects_negative_values() {
        assert!(GameConfig::from_toml("initial_coins = -1\n").is_err());
    }

    #[test]
    fn test_from_toml_rejects_unknown_fields() {
        assert!(GameConfig::from_toml("difficulty = \"hard\"\n").is_err());
    }

    #[test]
    fn test_toml_round_trip_of_effective_config() {
        let config = GameConfig::default();
        let rendered = config.to_toml().expect("renders");
        assert_eq!(GameConfig::from_toml(&rendered).expect("parses"), config);
    }
}
