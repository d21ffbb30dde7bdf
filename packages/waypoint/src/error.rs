use crate::AuthorizationStatus;
use thiserror::Error;

/// The error domain used for failures raised by this crate.
pub const ERROR_DOMAIN: &str = "WaypointErrorDomain";

/// The required authorization mode could not be determined.
pub const AUTHORIZATION_UNDETERMINED_CODE: i64 = 99;

/// The platform did not grant the required authorization.
pub const AUTHORIZATION_FAILED_CODE: i64 = 100;

/// A failure pushed to every [`LocationObserver`](crate::LocationObserver).
///
/// Every variant carries a domain, a numeric code and a human-readable
/// description so observers can forward it to platform error types.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LocationError {
    /// Both usage-purpose keys are declared and no authorization override is set.
    #[error(
        "Because both 'NSLocationWhenInUseUsageDescription' and 'NSLocationAlwaysUsageDescription' \
         are declared, the authorization mode must be chosen explicitly with an authorization override."
    )]
    ConfigurationAmbiguous,

    /// Neither usage-purpose key is declared.
    #[error(
        "Declare either 'NSLocationWhenInUseUsageDescription' or 'NSLocationAlwaysUsageDescription'. \
         Location services are disabled until one of these keys is present."
    )]
    ConfigurationMissing,

    /// The platform settled on an authorization status other than the one requested.
    #[error("Failed to get location authorization (platform reported {status:?}).")]
    AuthorizationFailed { status: AuthorizationStatus },

    /// An error reported by the platform location manager, passed through as-is.
    #[error(transparent)]
    Backend(#[from] PlatformError),
}

impl LocationError {
    pub fn domain(&self) -> &str {
        match self {
            LocationError::Backend(error) => &error.domain,
            _ => ERROR_DOMAIN,
        }
    }

    pub fn code(&self) -> i64 {
        match self {
            LocationError::ConfigurationAmbiguous | LocationError::ConfigurationMissing => {
                AUTHORIZATION_UNDETERMINED_CODE
            }
            LocationError::AuthorizationFailed { .. } => AUTHORIZATION_FAILED_CODE,
            LocationError::Backend(error) => error.code,
        }
    }

    pub fn description(&self) -> String {
        match self {
            LocationError::Backend(error) => error.description.clone(),
            other => other.to_string(),
        }
    }
}

/// An error as reported by the platform location manager.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{description} ({domain} {code})")]
pub struct PlatformError {
    pub domain: String,
    pub code: i64,
    pub description: String,
}

impl PlatformError {
    pub fn new(domain: impl Into<String>, code: i64, description: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            code,
            description: description.into(),
        }
    }
}
