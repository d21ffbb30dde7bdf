use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// The permission level the app needs in order to receive locations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuthorizationMode {
    /// Locations are only delivered while the app is in use.
    WhenInUse,
    /// Locations are delivered at any time, including in the background.
    Always,
}

impl AuthorizationMode {
    /// The platform status that grants this mode.
    pub fn status(self) -> AuthorizationStatus {
        match self {
            AuthorizationMode::WhenInUse => AuthorizationStatus::AuthorizedWhenInUse,
            AuthorizationMode::Always => AuthorizationStatus::AuthorizedAlways,
        }
    }
}

impl fmt::Display for AuthorizationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthorizationMode::WhenInUse => f.write_str("when-in-use"),
            AuthorizationMode::Always => f.write_str("always"),
        }
    }
}

impl FromStr for AuthorizationMode {
    type Err = ParseAuthorizationModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "when-in-use" | "when_in_use" | "wheninuse" => Ok(AuthorizationMode::WhenInUse),
            "always" => Ok(AuthorizationMode::Always),
            other => Err(ParseAuthorizationModeError {
                value: other.to_string(),
            }),
        }
    }
}

/// A string that names no [`AuthorizationMode`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown authorization mode `{value}`, expected `when-in-use` or `always`")]
pub struct ParseAuthorizationModeError {
    pub value: String,
}

/// The authorization status reported by the platform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuthorizationStatus {
    /// The user has not been asked yet.
    #[default]
    NotDetermined,
    /// Location services are blocked for this app, e.g. by parental controls.
    Restricted,
    /// The user refused, or location services are off system-wide.
    Denied,
    /// Granted while the app is in use.
    AuthorizedWhenInUse,
    /// Granted at any time.
    AuthorizedAlways,
}

impl AuthorizationStatus {
    /// Whether this status is exactly the one `mode` requires.
    ///
    /// `AuthorizedAlways` does not satisfy `WhenInUse`: the app asked for a
    /// specific mode and anything else counts as a mismatch.
    pub fn grants(self, mode: AuthorizationMode) -> bool {
        self == mode.status()
    }
}
