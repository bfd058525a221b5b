//! Policy thresholds and how they are loaded.

use std::str::FromStr;
use thiserror::Error;

use crate::classifier::DisallowedCharacters;

pub const ENV_MIN_LENGTH: &str = "PWD_MIN_LENGTH";
pub const ENV_MIN_NUMBER_PCT: &str = "PWD_MIN_NUMBER_PCT";
pub const ENV_MIN_SPECIAL_PCT: &str = "PWD_MIN_SPECIAL_PCT";
pub const ENV_MIN_UPPER_PCT: &str = "PWD_MIN_UPPER_PCT";
pub const ENV_MIN_LOWER_PCT: &str = "PWD_MIN_LOWER_PCT";
pub const ENV_MIN_USERNAME_DISTANCE_PCT: &str = "PWD_MIN_USERNAME_DISTANCE_PCT";
pub const ENV_DISALLOWED_CHARS: &str = "PWD_DISALLOWED_CHARS";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{field} must be a percentage between 0 and 100, got {value}")]
    PercentOutOfRange { field: &'static str, value: i64 },
    #[error("Invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },
}

/// How a blocklist that cannot be consulted is counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnavailablePolicy {
    /// The rule is reported as failed and counts toward the total.
    #[default]
    FailClosed,
    /// The rule is reported as unavailable and left out of the total.
    Exclude,
}

/// Immutable thresholds shared by every rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyThresholds {
    /// Minimum password length in code points.
    pub min_length: usize,
    pub min_number_pct: u8,
    pub min_special_pct: u8,
    pub min_upper_pct: u8,
    pub min_lower_pct: u8,
    /// Percentage of the password length the username distance must exceed.
    pub min_username_distance_pct: u8,
    pub disallowed: DisallowedCharacters,
}

impl Default for PolicyThresholds {
    fn default() -> Self {
        Self {
            min_length: 16,
            min_number_pct: 5,
            min_special_pct: 5,
            min_upper_pct: 5,
            min_lower_pct: 5,
            min_username_distance_pct: 75,
            disallowed: DisallowedCharacters::DEFAULT,
        }
    }
}

impl PolicyThresholds {
    pub fn with_min_length(mut self, length: usize) -> Self {
        self.min_length = length;
        self
    }

    pub fn with_min_number_pct(mut self, pct: u8) -> Self {
        self.min_number_pct = pct;
        self
    }

    pub fn with_min_special_pct(mut self, pct: u8) -> Self {
        self.min_special_pct = pct;
        self
    }

    pub fn with_min_upper_pct(mut self, pct: u8) -> Self {
        self.min_upper_pct = pct;
        self
    }

    pub fn with_min_lower_pct(mut self, pct: u8) -> Self {
        self.min_lower_pct = pct;
        self
    }

    pub fn with_min_username_distance_pct(mut self, pct: u8) -> Self {
        self.min_username_distance_pct = pct;
        self
    }

    pub fn with_disallowed(mut self, disallowed: DisallowedCharacters) -> Self {
        self.disallowed = disallowed;
        self
    }

    /// Checks every percentage is within `0..=100`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let percents = [
            (ENV_MIN_NUMBER_PCT, self.min_number_pct),
            (ENV_MIN_SPECIAL_PCT, self.min_special_pct),
            (ENV_MIN_UPPER_PCT, self.min_upper_pct),
            (ENV_MIN_LOWER_PCT, self.min_lower_pct),
            (ENV_MIN_USERNAME_DISTANCE_PCT, self.min_username_distance_pct),
        ];
        for (field, value) in percents {
            if value > 100 {
                return Err(ConfigError::PercentOutOfRange {
                    field,
                    value: i64::from(value),
                });
            }
        }
        Ok(())
    }

    /// Loads thresholds from the environment.
    ///
    /// Every variable is optional; unset ones keep their default value.
    ///
    /// - `PWD_MIN_LENGTH` (default 16)
    /// - `PWD_MIN_NUMBER_PCT`, `PWD_MIN_SPECIAL_PCT`, `PWD_MIN_UPPER_PCT`,
    ///   `PWD_MIN_LOWER_PCT` (default 5 each)
    /// - `PWD_MIN_USERNAME_DISTANCE_PCT` (default 75)
    /// - `PWD_DISALLOWED_CHARS` (default `\n`, escapes are decoded)
    ///
    /// # Errors
    ///
    /// Returns error if a value does not parse, is negative, or a
    /// percentage exceeds 100.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let thresholds = Self {
            min_length: env_or(ENV_MIN_LENGTH, defaults.min_length)?,
            min_number_pct: env_percent(ENV_MIN_NUMBER_PCT, defaults.min_number_pct)?,
            min_special_pct: env_percent(ENV_MIN_SPECIAL_PCT, defaults.min_special_pct)?,
            min_upper_pct: env_percent(ENV_MIN_UPPER_PCT, defaults.min_upper_pct)?,
            min_lower_pct: env_percent(ENV_MIN_LOWER_PCT, defaults.min_lower_pct)?,
            min_username_distance_pct: env_percent(
                ENV_MIN_USERNAME_DISTANCE_PCT,
                defaults.min_username_distance_pct,
            )?,
            disallowed: std::env::var(ENV_DISALLOWED_CHARS)
                .map(|raw| DisallowedCharacters::parse_escaped(&raw))
                .unwrap_or(defaults.disallowed),
        };

        thresholds.validate()?;
        Ok(thresholds)
    }
}

fn env_or<T: FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(var) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue { var, value: raw }),
        Err(_) => Ok(default),
    }
}

fn env_percent(var: &'static str, default: u8) -> Result<u8, ConfigError> {
    let value: i64 = env_or(var, i64::from(default))?;
    u8::try_from(value)
        .ok()
        .filter(|pct| *pct <= 100)
        .ok_or(ConfigError::PercentOutOfRange { field: var, value })
}
