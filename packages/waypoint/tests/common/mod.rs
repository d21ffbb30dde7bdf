#![allow(dead_code)]

use std::{cell::RefCell, rc::Rc};
use waypoint::{
    AuthorizationStatus, Location, LocationError, LocationObserver, LocationService,
    SimulatedBackend, StaticUsageDescriptions,
};

/// Remembers everything it was told.
#[derive(Default)]
pub struct Recorder {
    locations: RefCell<Vec<Location>>,
    errors: RefCell<Vec<LocationError>>,
}

impl Recorder {
    pub fn locations(&self) -> Vec<(f64, f64)> {
        self.locations
            .borrow()
            .iter()
            .map(|location| (location.latitude, location.longitude))
            .collect()
    }

    pub fn errors(&self) -> Vec<LocationError> {
        self.errors.borrow().clone()
    }

    pub fn is_silent(&self) -> bool {
        self.locations.borrow().is_empty() && self.errors.borrow().is_empty()
    }
}

impl LocationObserver for Recorder {
    fn on_location_updated(&self, location: &Location) {
        self.locations.borrow_mut().push(location.clone());
    }

    fn on_error(&self, error: &LocationError) {
        self.errors.borrow_mut().push(error.clone());
    }
}

pub struct Harness {
    pub service: LocationService,
    pub platform: SimulatedBackend,
    pub usage: StaticUsageDescriptions,
    pub recorder: Rc<Recorder>,
}

/// A service declaring `keys`, on a platform that already reports `status`,
/// with one recorder attached and the construction calls cleared.
pub fn harness(keys: &[&str], status: AuthorizationStatus) -> Harness {
    let platform = SimulatedBackend::with_status(status);
    let usage = StaticUsageDescriptions::new();
    for key in keys {
        usage.insert(*key, "Used in tests");
    }

    let service = LocationService::new(platform.clone(), usage.clone());
    let recorder = Rc::new(Recorder::default());
    service.add_observer(recorder.clone());
    platform.take_calls();

    Harness {
        service,
        platform,
        usage,
        recorder,
    }
}

pub fn fix(latitude: f64, longitude: f64) -> Location {
    Location::new(latitude, longitude)
}
