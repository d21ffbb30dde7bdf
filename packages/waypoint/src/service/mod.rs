//! The location facade.
//!
//! [`LocationService`] owns every piece of mutable state: configuration, the
//! observer registry, the request flags and the last reported location. Control
//! operations run inside a transaction that collects notifications and only
//! publishes them once the state borrow is released, so observers are free to
//! call back into the service.

mod adapter;

use crate::{
    backend::{BackendEvent, EventSink, LocationBackend},
    observer::ObserverRegistry,
    usage::{UsageDescriptions, ALWAYS_USAGE_KEY, WHEN_IN_USE_USAGE_KEY},
    AuthorizationMode, AuthorizationStatus, Location, LocationConfig, LocationError,
    LocationObserver,
};
use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
    rc::Rc,
};
use tracing::{debug, trace, warn};

/// Which requests are currently blocked on authorization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PendingRequests {
    /// Continuous monitoring starts once authorization is granted.
    pub continuous: bool,
    /// A one-shot fetch is issued once authorization is granted.
    pub one_shot: bool,
    /// Continuous monitoring was interrupted by a one-shot fetch and resumes
    /// after the next delivered location.
    pub resume_after_one_shot: bool,
}

/// Location services facade.
///
/// Cloning is cheap and every clone drives the same service. The service is
/// bound to the thread that created it, like the platform manager behind it.
#[derive(Clone)]
pub struct LocationService {
    shared: Rc<Shared>,
}

pub(crate) struct Shared {
    backend: Box<dyn LocationBackend>,
    usage: Box<dyn UsageDescriptions>,
    state: RefCell<ServiceState>,
    observers: RefCell<ObserverRegistry>,
    queue: RefCell<VecDeque<BackendEvent>>,
    draining: Cell<bool>,
}

#[derive(Debug, Default)]
struct ServiceState {
    config: LocationConfig,
    monitoring: bool,
    pending: PendingRequests,
    last_location: Option<Location>,
}

enum Notice {
    Location(Location),
    Error(LocationError),
}

type Outbox = Vec<Notice>;

impl LocationService {
    /// Create a service with the default configuration.
    pub fn new(
        backend: impl LocationBackend + 'static,
        usage: impl UsageDescriptions + 'static,
    ) -> Self {
        Self::with_config(backend, usage, LocationConfig::default())
    }

    /// Create a service and push `config` to the backend.
    pub fn with_config(
        backend: impl LocationBackend + 'static,
        usage: impl UsageDescriptions + 'static,
        config: LocationConfig,
    ) -> Self {
        let shared = Rc::new(Shared {
            backend: Box::new(backend),
            usage: Box::new(usage),
            state: RefCell::new(ServiceState::default()),
            observers: RefCell::new(ObserverRegistry::default()),
            queue: RefCell::new(VecDeque::new()),
            draining: Cell::new(false),
        });

        shared.backend.bind(EventSink::new(&shared));

        let service = Self { shared };
        service.configure(config);
        service
    }

    /// Replace the whole configuration.
    pub fn configure(&self, config: LocationConfig) {
        let backend = &self.shared.backend;
        self.shared.transact(|state, _| {
            backend.set_desired_accuracy(config.desired_accuracy);
            backend.set_distance_filter(config.distance_filter);
            backend.set_allows_background_updates(config.background_updates);
            state.config = config;
        });
    }

    pub fn config(&self) -> LocationConfig {
        self.shared.state.borrow().config.clone()
    }

    /// The radius in meters the locations should be accurate to.
    pub fn desired_accuracy(&self) -> f64 {
        self.shared.state.borrow().config.desired_accuracy
    }

    pub fn set_desired_accuracy(&self, accuracy: f64) {
        let backend = &self.shared.backend;
        self.shared.transact(|state, _| {
            state.config.desired_accuracy = accuracy;
            backend.set_desired_accuracy(accuracy);
        });
    }

    /// The distance in meters that must be traveled before a new location is delivered.
    pub fn distance_filter(&self) -> f64 {
        self.shared.state.borrow().config.distance_filter
    }

    pub fn set_distance_filter(&self, meters: f64) {
        let backend = &self.shared.backend;
        self.shared.transact(|state, _| {
            state.config.distance_filter = meters;
            backend.set_distance_filter(meters);
        });
    }

    pub fn background_updates(&self) -> bool {
        self.shared.state.borrow().config.background_updates
    }

    /// Keep delivering locations while the app is in the background.
    pub fn set_background_updates(&self, enabled: bool) {
        let backend = &self.shared.backend;
        self.shared.transact(|state, _| {
            state.config.background_updates = enabled;
            backend.set_allows_background_updates(enabled);
        });
    }

    pub fn authorization_override(&self) -> Option<AuthorizationMode> {
        self.shared.state.borrow().config.authorization_override
    }

    /// Choose the authorization mode explicitly instead of deriving it from the
    /// declared usage strings. Required when both usage strings are declared.
    pub fn set_authorization_override(&self, mode: Option<AuthorizationMode>) {
        self.shared.transact(|state, _| {
            state.config.authorization_override = mode;
        });
    }

    /// The authorization mode in effect, or `None` if it can't be determined.
    ///
    /// A failure is reported to every observer. The answer is recomputed on
    /// every call.
    pub fn resolve_authorization_mode(&self) -> Option<AuthorizationMode> {
        let shared = &self.shared;
        shared.transact(|state, outbox| shared.resolve_or_report(state, outbox))
    }

    /// The status currently reported by the platform.
    pub fn authorization_status(&self) -> AuthorizationStatus {
        self.shared.backend.authorization_status()
    }

    /// Whether the platform has granted exactly the authorization mode in effect.
    pub fn is_authorized(&self) -> bool {
        let shared = &self.shared;
        shared.transact(|state, outbox| match shared.resolve_or_report(state, outbox) {
            Some(mode) => shared.backend.authorization_status().grants(mode),
            None => false,
        })
    }

    /// Start monitoring the location and report every change to the observers.
    ///
    /// If authorization has not been granted yet it is requested first, and
    /// monitoring starts as soon as the platform grants it.
    pub fn start_updating_location(&self) {
        let shared = &self.shared;
        shared.transact(|state, outbox| {
            if state.monitoring {
                trace!("Continuous location updates already running");
                return;
            }

            let Some(mode) = shared.resolve_or_report(state, outbox) else {
                return;
            };

            // Starting here supersedes a resume scheduled by a one-shot request.
            state.pending.resume_after_one_shot = false;

            let status = shared.backend.authorization_status();
            if status.grants(mode) {
                state.monitoring = true;
                shared.backend.start_updating_location();
                debug!(%mode, "Started continuous location updates");
            } else {
                state.pending.continuous = true;
                debug!(%mode, ?status, "Continuous location updates waiting for authorization");
                shared.backend.request_authorization(mode);
            }
        });
    }

    /// Stop monitoring the location.
    ///
    /// Also drops a start that is still waiting for authorization and a resume
    /// scheduled by a one-shot request.
    pub fn stop_updating_location(&self) {
        let shared = &self.shared;
        shared.transact(|state, _| {
            state.monitoring = false;
            state.pending.continuous = false;
            state.pending.resume_after_one_shot = false;
            shared.backend.stop_updating_location();
            debug!("Stopped continuous location updates");
        });
    }

    /// Request a single location.
    ///
    /// `accuracy` applies to this request only; `None` uses the configured
    /// desired accuracy. Continuous monitoring, if running, is paused until the
    /// location has been delivered.
    pub fn request_location(&self, accuracy: Option<f64>) {
        let shared = &self.shared;
        shared.transact(|state, outbox| {
            let Some(mode) = shared.resolve_or_report(state, outbox) else {
                return;
            };

            shared.backend.stop_updating_location();
            if state.monitoring {
                state.monitoring = false;
                state.pending.resume_after_one_shot = true;
            }

            let accuracy = accuracy.unwrap_or(state.config.desired_accuracy);
            shared.backend.set_desired_accuracy(accuracy);

            let status = shared.backend.authorization_status();
            if status.grants(mode) {
                shared.backend.request_location();
                debug!(accuracy, "Requested one-shot location");
            } else {
                state.pending.one_shot = true;
                debug!(%mode, ?status, "One-shot location waiting for authorization");
                shared.backend.request_authorization(mode);
            }
        });
    }

    /// Register an observer for location updates and errors.
    ///
    /// The service only keeps a weak reference; the caller owns the observer.
    /// Registering the same observer twice has no effect.
    pub fn add_observer(&self, observer: Rc<dyn LocationObserver>) {
        if Rc::strong_count(&observer) == 1 {
            warn!("Location observer has no other owner and will be dropped immediately");
        }

        if !self.shared.observers.borrow_mut().add(&observer) {
            trace!("Location observer already registered");
        }
    }

    /// Unregister an observer. Unknown observers are ignored.
    pub fn remove_observer<O: LocationObserver + ?Sized>(&self, observer: &Rc<O>) {
        let id = Rc::as_ptr(observer) as *const ();
        if !self.shared.observers.borrow_mut().remove(id) {
            trace!("Location observer was not registered");
        }
    }

    /// How many live observers are registered.
    pub fn observer_count(&self) -> usize {
        self.shared.observers.borrow().len()
    }

    /// The last reported location.
    pub fn last_location(&self) -> Option<Location> {
        self.shared.state.borrow().last_location.clone()
    }

    /// Whether continuous location updates are running.
    ///
    /// Reads false while monitoring is paused for a one-shot fetch, and true
    /// again once it resumes.
    pub fn is_monitoring(&self) -> bool {
        self.shared.state.borrow().monitoring
    }

    pub fn pending_requests(&self) -> PendingRequests {
        self.shared.state.borrow().pending
    }

    /// A handle the platform glue uses to deliver callbacks.
    pub fn events(&self) -> EventSink {
        EventSink::new(&self.shared)
    }

    /// Deliver a platform callback to this service.
    pub fn handle_event(&self, event: BackendEvent) {
        self.shared.enqueue(event);
    }
}

impl std::fmt::Debug for LocationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut debug = f.debug_struct("LocationService");
        match self.shared.state.try_borrow() {
            Ok(state) => debug.field("state", &*state),
            Err(_) => debug.field("state", &"<busy>"),
        };
        debug.finish()
    }
}

impl Shared {
    /// Run `op` against the state, then publish what it reported and handle
    /// any events that arrived meanwhile.
    fn transact<R>(&self, op: impl FnOnce(&mut ServiceState, &mut Outbox) -> R) -> R {
        let mut outbox = Outbox::new();
        let result = {
            let mut state = self.state.borrow_mut();
            op(&mut state, &mut outbox)
        };
        self.publish(outbox);
        self.drain();
        result
    }

    pub(crate) fn enqueue(&self, event: BackendEvent) {
        self.queue.borrow_mut().push_back(event);

        // Mid-transaction: the running transaction drains when it finishes.
        let idle = self.state.try_borrow_mut().is_ok();
        if idle {
            self.drain();
        }
    }

    fn drain(&self) {
        if self.draining.replace(true) {
            return;
        }

        loop {
            let next = self.queue.borrow_mut().pop_front();
            let Some(event) = next else {
                break;
            };
            self.handle(event);
        }

        self.draining.set(false);
    }

    fn publish(&self, outbox: Outbox) {
        if outbox.is_empty() {
            return;
        }

        let observers = self.observers.borrow_mut().snapshot();
        if observers.is_empty() {
            trace!(count = outbox.len(), "No location observers registered");
        }

        for notice in &outbox {
            for observer in &observers {
                match notice {
                    Notice::Location(location) => observer.on_location_updated(location),
                    Notice::Error(error) => observer.on_error(error),
                }
            }
        }
    }

    fn resolve(&self, state: &ServiceState) -> Result<AuthorizationMode, LocationError> {
        if let Some(mode) = state.config.authorization_override {
            return Ok(mode);
        }

        let when_in_use = self.usage.declares(WHEN_IN_USE_USAGE_KEY);
        let always = self.usage.declares(ALWAYS_USAGE_KEY);

        match (when_in_use, always) {
            (true, true) => Err(LocationError::ConfigurationAmbiguous),
            (true, false) => Ok(AuthorizationMode::WhenInUse),
            (false, true) => Ok(AuthorizationMode::Always),
            (false, false) => Err(LocationError::ConfigurationMissing),
        }
    }

    fn resolve_or_report(
        &self,
        state: &ServiceState,
        outbox: &mut Outbox,
    ) -> Option<AuthorizationMode> {
        match self.resolve(state) {
            Ok(mode) => Some(mode),
            Err(error) => {
                warn!(code = error.code(), "Could not determine location authorization: {error}");
                outbox.push(Notice::Error(error));
                None
            }
        }
    }
}
