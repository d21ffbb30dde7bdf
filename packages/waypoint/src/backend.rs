use crate::{
    service::Shared, AuthorizationMode, AuthorizationStatus, Location, PlatformError,
};
use std::rc::{Rc, Weak};

/// The platform location manager driven by a [`LocationService`](crate::LocationService).
///
/// Methods are plain commands; results arrive later as [`BackendEvent`]s sent
/// through the [`EventSink`] handed to [`LocationBackend::bind`].
pub trait LocationBackend {
    /// Called once when the service takes ownership of the backend.
    ///
    /// Platform callbacks must be forwarded to `events`.
    fn bind(&self, events: EventSink) {
        let _ = events;
    }

    fn authorization_status(&self) -> AuthorizationStatus;

    /// Ask the user for `mode`. The answer arrives as [`BackendEvent::AuthorizationChanged`].
    fn request_authorization(&self, mode: AuthorizationMode);

    fn start_updating_location(&self);

    fn stop_updating_location(&self);

    /// Deliver a single location, then stop.
    fn request_location(&self);

    fn desired_accuracy(&self) -> f64;

    fn set_desired_accuracy(&self, accuracy: f64);

    fn set_distance_filter(&self, meters: f64);

    fn set_allows_background_updates(&self, allowed: bool);
}

/// A platform callback, translated for the service.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendEvent {
    AuthorizationChanged(AuthorizationStatus),
    Failed(PlatformError),
    /// A batch of fixes, oldest first.
    LocationsUpdated(Vec<Location>),
}

/// Delivers [`BackendEvent`]s into a [`LocationService`](crate::LocationService).
///
/// The sink only holds a weak reference: events sent after the service has
/// been dropped are discarded. Events sent while the service is in the middle
/// of an operation are queued and handled, in order, as soon as it finishes.
#[derive(Clone)]
pub struct EventSink {
    pub(crate) shared: Weak<Shared>,
}

impl EventSink {
    pub(crate) fn new(shared: &Rc<Shared>) -> Self {
        Self {
            shared: Rc::downgrade(shared),
        }
    }

    pub fn dispatch(&self, event: BackendEvent) {
        match self.shared.upgrade() {
            Some(shared) => shared.enqueue(event),
            None => tracing::trace!(?event, "Dropping location event, service is gone"),
        }
    }

    /// Whether the receiving service still exists.
    pub fn is_connected(&self) -> bool {
        self.shared.strong_count() > 0
    }
}

impl std::fmt::Debug for EventSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventSink")
            .field("connected", &self.is_connected())
            .finish()
    }
}
