use crate::{authorization::ParseAuthorizationModeError, AuthorizationMode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DESIRED_ACCURACY_ENV: &str = "WAYPOINT_DESIRED_ACCURACY";
pub const DISTANCE_FILTER_ENV: &str = "WAYPOINT_DISTANCE_FILTER";
pub const BACKGROUND_UPDATES_ENV: &str = "WAYPOINT_BACKGROUND_UPDATES";
pub const AUTHORIZATION_ENV: &str = "WAYPOINT_AUTHORIZATION";

/// Deliver every update regardless of the distance moved.
pub const DISTANCE_FILTER_NONE: f64 = -1.0;

/// Accuracy levels understood by the platform, in meters.
///
/// Any non-negative radius is also accepted; the platform rounds it to the
/// closest level it can provide.
pub mod accuracy {
    pub const BEST_FOR_NAVIGATION: f64 = -2.0;
    pub const BEST: f64 = -1.0;
    pub const NEAREST_TEN_METERS: f64 = 10.0;
    pub const HUNDRED_METERS: f64 = 100.0;
    pub const KILOMETER: f64 = 1000.0;
    pub const THREE_KILOMETERS: f64 = 3000.0;

    /// Resolve the named levels accepted in configuration.
    pub(crate) fn named(name: &str) -> Option<f64> {
        match name {
            "best-for-navigation" => Some(BEST_FOR_NAVIGATION),
            "best" => Some(BEST),
            "nearest-ten-meters" => Some(NEAREST_TEN_METERS),
            "hundred-meters" => Some(HUNDRED_METERS),
            "kilometer" => Some(KILOMETER),
            "three-kilometers" => Some(THREE_KILOMETERS),
            _ => None,
        }
    }
}

/// Settings of a [`LocationService`](crate::LocationService).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    /// Desired accuracy in meters, or one of the [`accuracy`] sentinels.
    pub desired_accuracy: f64,

    /// Minimum distance in meters between two delivered updates.
    pub distance_filter: f64,

    /// Keep receiving updates while the app is in the background.
    pub background_updates: bool,

    /// Use this mode instead of deriving it from the declared usage strings.
    pub authorization_override: Option<AuthorizationMode>,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            desired_accuracy: accuracy::BEST,
            distance_filter: DISTANCE_FILTER_NONE,
            background_updates: false,
            authorization_override: None,
        }
    }
}

impl LocationConfig {
    /// Read the configuration from the process environment.
    ///
    /// Unset variables keep their default value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(raw) = lookup(DESIRED_ACCURACY_ENV) {
            config.desired_accuracy = parse_meters(DESIRED_ACCURACY_ENV, &raw)?;
        }

        if let Some(raw) = lookup(DISTANCE_FILTER_ENV) {
            config.distance_filter = match raw.trim() {
                "none" => DISTANCE_FILTER_NONE,
                other => parse_meters(DISTANCE_FILTER_ENV, other)?,
            };
        }

        if let Some(raw) = lookup(BACKGROUND_UPDATES_ENV) {
            config.background_updates = match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: BACKGROUND_UPDATES_ENV,
                        value: raw,
                        reason: "expected a boolean",
                    })
                }
            };
        }

        if let Some(raw) = lookup(AUTHORIZATION_ENV) {
            config.authorization_override = match raw.trim() {
                "" | "auto" => None,
                other => Some(other.parse()?),
            };
        }

        tracing::debug!(?config, "Loaded location configuration");

        Ok(config)
    }
}

fn parse_meters(key: &'static str, raw: &str) -> Result<f64, ConfigError> {
    let trimmed = raw.trim();
    if let Some(level) = accuracy::named(trimmed) {
        return Ok(level);
    }

    let value: f64 = trimmed.parse().map_err(|_| ConfigError::Invalid {
        key,
        value: raw.to_string(),
        reason: "expected a number of meters or a named accuracy level",
    })?;

    if !value.is_finite() {
        return Err(ConfigError::Invalid {
            key,
            value: raw.to_string(),
            reason: "value must be finite",
        });
    }

    Ok(value)
}

/// An invalid configuration value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("invalid value `{value}` for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("invalid value for WAYPOINT_AUTHORIZATION: {0}")]
    Authorization(#[from] ParseAuthorizationModeError),
}
