//! Location services facade for mobile apps
//!
//! This crate wraps a platform location manager (CoreLocation on iOS) behind a
//! single [`LocationService`] object. The service negotiates location
//! authorization, starts and stops continuous monitoring, performs one-shot
//! location fetches and fans every update and failure out to all registered
//! [`LocationObserver`]s.
//!
//! ## Usage
//!
//! ```rust
//! use std::rc::Rc;
//! use waypoint::{
//!     AuthorizationStatus, Location, LocationError, LocationObserver, LocationService,
//!     SimulatedBackend, StaticUsageDescriptions, WHEN_IN_USE_USAGE_KEY,
//! };
//!
//! struct Screen;
//!
//! impl LocationObserver for Screen {
//!     fn on_location_updated(&self, location: &Location) {
//!         println!("{location}");
//!     }
//!
//!     fn on_error(&self, error: &LocationError) {
//!         eprintln!("{error}");
//!     }
//! }
//!
//! let platform = SimulatedBackend::new();
//! let usage = StaticUsageDescriptions::new();
//! usage.insert(WHEN_IN_USE_USAGE_KEY, "Show your position on the map");
//!
//! let service = LocationService::new(platform.clone(), usage);
//! let screen = Rc::new(Screen);
//! service.add_observer(screen.clone());
//! service.start_updating_location();
//!
//! // The user taps "Allow While Using App"
//! platform.set_authorization(AuthorizationStatus::AuthorizedWhenInUse);
//! assert!(service.is_monitoring());
//!
//! platform.deliver(vec![Location::new(52.52, 13.405)]);
//! ```
//!
//! ## Authorization
//!
//! The required authorization mode is derived from the usage-purpose strings
//! declared by the app (`NSLocationWhenInUseUsageDescription` and
//! `NSLocationAlwaysUsageDescription` in Info.plist). When both are declared,
//! the mode must be chosen explicitly with
//! [`LocationService::set_authorization_override`].
//!
//! ## Errors
//!
//! Failures are never returned from the control operations. They are pushed to
//! every observer through [`LocationObserver::on_error`], the same path that
//! carries location updates.

mod authorization;
mod backend;
mod config;
mod error;
mod location;
mod observer;
mod service;
mod sys;
mod usage;

pub use authorization::{AuthorizationMode, AuthorizationStatus, ParseAuthorizationModeError};
pub use backend::{BackendEvent, EventSink, LocationBackend};
pub use config::{
    accuracy, ConfigError, LocationConfig, AUTHORIZATION_ENV, BACKGROUND_UPDATES_ENV,
    DESIRED_ACCURACY_ENV, DISTANCE_FILTER_ENV, DISTANCE_FILTER_NONE,
};
pub use error::{
    LocationError, PlatformError, AUTHORIZATION_FAILED_CODE, AUTHORIZATION_UNDETERMINED_CODE,
    ERROR_DOMAIN,
};
pub use location::{Coordinates, Location};
pub use observer::LocationObserver;
pub use service::{LocationService, PendingRequests};
pub use sys::simulated::{BackendCall, SimulatedBackend};
pub use usage::{
    EnvUsageDescriptions, StaticUsageDescriptions, UsageDescriptions, ALWAYS_USAGE_KEY,
    WHEN_IN_USE_USAGE_KEY,
};

#[cfg(target_os = "ios")]
pub use sys::ios::{CoreLocationBackend, MainBundleUsageDescriptions};
