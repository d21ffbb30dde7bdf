//! A trivial screen consuming the location service.
//!
//! Runs against the simulated platform: the user grants access, the device
//! walks a short track, the screen asks for one precise fix, then leaves.
//!
//! Set `RUST_LOG=waypoint=debug` to watch the service's state transitions and
//! the `WAYPOINT_*` variables to change its configuration.

use std::rc::Rc;
use tracing_subscriber::EnvFilter;
use waypoint::{
    accuracy, ConfigError, EnvUsageDescriptions, Location, LocationConfig,
    LocationError, LocationObserver, LocationService, SimulatedBackend, StaticUsageDescriptions,
    UsageDescriptions, ALWAYS_USAGE_KEY, WHEN_IN_USE_USAGE_KEY,
};

struct ConsoleScreen;

impl LocationObserver for ConsoleScreen {
    fn on_location_updated(&self, location: &Location) {
        println!("{location}");
    }

    fn on_error(&self, error: &LocationError) {
        eprintln!(
            "{} ({} {})",
            error.description(),
            error.domain(),
            error.code()
        );
    }
}

fn main() -> Result<(), ConfigError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = LocationConfig::from_env()?;
    let usage = usage_descriptions();

    let platform = SimulatedBackend::new();
    let service = LocationService::with_config(platform.clone(), usage, config);

    let screen = Rc::new(ConsoleScreen);
    service.add_observer(screen.clone());
    service.set_background_updates(true);
    service.start_updating_location();

    // The user answers the permission dialog.
    if let Some(mode) = service.resolve_authorization_mode() {
        platform.set_authorization(mode.status());
    }

    for fix in track() {
        platform.deliver(vec![fix]);
    }

    service.request_location(Some(accuracy::BEST_FOR_NAVIGATION));
    platform.deliver(vec![Location::new(59.3326, 18.0649).with_horizontal_accuracy(3.0)]);

    service.stop_updating_location();
    service.remove_observer(&screen);

    tracing::info!(last = ?service.last_location(), "Screen closed");
    Ok(())
}

/// Usage strings from the environment, declaring when-in-use if none are set.
fn usage_descriptions() -> StaticUsageDescriptions {
    let declared = StaticUsageDescriptions::new();
    for key in [WHEN_IN_USE_USAGE_KEY, ALWAYS_USAGE_KEY] {
        if let Some(description) = EnvUsageDescriptions.usage_description(key) {
            declared.insert(key, description);
        }
    }

    if !declared.declares(WHEN_IN_USE_USAGE_KEY) && !declared.declares(ALWAYS_USAGE_KEY) {
        declared.insert(WHEN_IN_USE_USAGE_KEY, "Show where you are on the map");
    }

    declared
}

/// A short walk along Skeppsbron, Stockholm.
fn track() -> Vec<Location> {
    [
        (59.3238, 18.0752),
        (59.3247, 18.0760),
        (59.3256, 18.0766),
        (59.3264, 18.0771),
    ]
    .into_iter()
    .map(|(latitude, longitude)| {
        Location::new(latitude, longitude).with_horizontal_accuracy(accuracy::NEAREST_TEN_METERS)
    })
    .collect()
}
