//! A software location platform.
//!
//! Behaves like a real location manager as far as the service can tell:
//! authorization only changes when the host says so, locations only arrive
//! while updates run or a one-shot request is outstanding, and every command
//! is recorded so hosts and tests can inspect what the service asked for.

use crate::{
    accuracy, AuthorizationMode, AuthorizationStatus, BackendEvent, EventSink, Location,
    LocationBackend, PlatformError, DISTANCE_FILTER_NONE,
};
use std::{cell::RefCell, rc::Rc};

/// A command the service sent to the platform.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    RequestAuthorization(AuthorizationMode),
    StartUpdatingLocation,
    StopUpdatingLocation,
    RequestLocation,
    SetDesiredAccuracy(f64),
    SetDistanceFilter(f64),
    SetAllowsBackgroundUpdates(bool),
}

/// A location platform driven from code.
///
/// Clones share the same platform: hand one to the service and keep one to
/// play the user and the positioning hardware.
#[derive(Debug, Clone, Default)]
pub struct SimulatedBackend {
    inner: Rc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    state: RefCell<PlatformState>,
    events: RefCell<Option<EventSink>>,
}

#[derive(Debug)]
struct PlatformState {
    status: AuthorizationStatus,
    updating: bool,
    one_shot: bool,
    desired_accuracy: f64,
    distance_filter: f64,
    background_updates: bool,
    calls: Vec<BackendCall>,
}

impl Default for PlatformState {
    fn default() -> Self {
        Self {
            status: AuthorizationStatus::NotDetermined,
            updating: false,
            one_shot: false,
            desired_accuracy: accuracy::BEST,
            distance_filter: DISTANCE_FILTER_NONE,
            background_updates: false,
            calls: Vec::new(),
        }
    }
}

impl SimulatedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A platform on which the user already answered with `status`.
    pub fn with_status(status: AuthorizationStatus) -> Self {
        let backend = Self::default();
        backend.inner.state.borrow_mut().status = status;
        backend
    }

    /// Change the authorization status, as the user would in a permission
    /// dialog or in the system settings, and notify the service.
    pub fn set_authorization(&self, status: AuthorizationStatus) {
        self.inner.state.borrow_mut().status = status;
        self.emit(BackendEvent::AuthorizationChanged(status));
    }

    /// Hand a batch of fixes to the service, oldest first.
    ///
    /// Returns false, delivering nothing, unless updates are running or a
    /// one-shot request is outstanding. A one-shot request is satisfied by
    /// the delivery.
    pub fn deliver(&self, locations: Vec<Location>) -> bool {
        {
            let mut state = self.inner.state.borrow_mut();
            if !state.updating && !state.one_shot {
                return false;
            }
            state.one_shot = false;
        }

        self.emit(BackendEvent::LocationsUpdated(locations));
        true
    }

    /// Report a platform failure to the service.
    pub fn fail(&self, error: PlatformError) {
        self.emit(BackendEvent::Failed(error));
    }

    pub fn is_updating(&self) -> bool {
        self.inner.state.borrow().updating
    }

    pub fn has_pending_request(&self) -> bool {
        self.inner.state.borrow().one_shot
    }

    pub fn distance_filter(&self) -> f64 {
        self.inner.state.borrow().distance_filter
    }

    pub fn allows_background_updates(&self) -> bool {
        self.inner.state.borrow().background_updates
    }

    /// Every command received so far.
    pub fn calls(&self) -> Vec<BackendCall> {
        self.inner.state.borrow().calls.clone()
    }

    /// Every command received so far, clearing the log.
    pub fn take_calls(&self) -> Vec<BackendCall> {
        std::mem::take(&mut self.inner.state.borrow_mut().calls)
    }

    fn record(&self, call: BackendCall) {
        let mut state = self.inner.state.borrow_mut();
        match &call {
            BackendCall::StartUpdatingLocation => state.updating = true,
            BackendCall::StopUpdatingLocation => {
                // Like CoreLocation, stopping also cancels an outstanding one-shot request.
                state.updating = false;
                state.one_shot = false;
            }
            BackendCall::RequestLocation => state.one_shot = true,
            BackendCall::SetDesiredAccuracy(accuracy) => state.desired_accuracy = *accuracy,
            BackendCall::SetDistanceFilter(meters) => state.distance_filter = *meters,
            BackendCall::SetAllowsBackgroundUpdates(allowed) => {
                state.background_updates = *allowed
            }
            BackendCall::RequestAuthorization(_) => {}
        }
        state.calls.push(call);
    }

    fn emit(&self, event: BackendEvent) {
        // Clone the sink out so no borrow is held while the service reacts.
        let sink = self.inner.events.borrow().clone();
        match sink {
            Some(sink) => sink.dispatch(event),
            None => tracing::trace!(?event, "Simulated platform is not bound to a service"),
        }
    }
}

impl LocationBackend for SimulatedBackend {
    fn bind(&self, events: EventSink) {
        *self.inner.events.borrow_mut() = Some(events);
    }

    fn authorization_status(&self) -> AuthorizationStatus {
        self.inner.state.borrow().status
    }

    fn request_authorization(&self, mode: AuthorizationMode) {
        self.record(BackendCall::RequestAuthorization(mode));
    }

    fn start_updating_location(&self) {
        self.record(BackendCall::StartUpdatingLocation);
    }

    fn stop_updating_location(&self) {
        self.record(BackendCall::StopUpdatingLocation);
    }

    fn request_location(&self) {
        self.record(BackendCall::RequestLocation);
    }

    fn desired_accuracy(&self) -> f64 {
        self.inner.state.borrow().desired_accuracy
    }

    fn set_desired_accuracy(&self, accuracy: f64) {
        self.record(BackendCall::SetDesiredAccuracy(accuracy));
    }

    fn set_distance_filter(&self, meters: f64) {
        self.record(BackendCall::SetDistanceFilter(meters));
    }

    fn set_allows_background_updates(&self, allowed: bool) {
        self.record(BackendCall::SetAllowsBackgroundUpdates(allowed));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locations_need_a_running_request() {
        let platform = SimulatedBackend::new();
        assert!(!platform.deliver(vec![Location::new(0.0, 0.0)]));

        platform.request_location();
        assert!(platform.has_pending_request());
        assert!(platform.deliver(vec![Location::new(0.0, 0.0)]));
        assert!(!platform.deliver(vec![Location::new(0.0, 0.0)]));

        platform.start_updating_location();
        assert!(platform.deliver(vec![Location::new(0.0, 0.0)]));
        assert!(platform.deliver(vec![Location::new(0.0, 0.0)]));
    }

    #[test]
    fn stopping_cancels_a_one_shot_request() {
        let platform = SimulatedBackend::new();
        platform.request_location();
        platform.stop_updating_location();
        assert!(!platform.has_pending_request());
    }

    #[test]
    fn unbound_platform_swallows_events() {
        let platform = SimulatedBackend::with_status(AuthorizationStatus::Denied);
        platform.set_authorization(AuthorizationStatus::AuthorizedAlways);
        assert_eq!(
            platform.authorization_status(),
            AuthorizationStatus::AuthorizedAlways
        );
    }
}
