//! CoreLocation backend via objc2.

use crate::{
    AuthorizationMode, AuthorizationStatus, BackendEvent, EventSink, Location, LocationBackend,
    PlatformError, UsageDescriptions,
};
use objc2::rc::Retained;
use objc2::runtime::{NSObject, NSObjectProtocol, ProtocolObject};
use objc2::{define_class, msg_send, DefinedClass, MainThreadMarker, MainThreadOnly};
use objc2_core_location::{
    CLAuthorizationStatus, CLLocation, CLLocationManager, CLLocationManagerDelegate,
};
use objc2_foundation::{NSArray, NSBundle, NSError, NSString};
use std::{
    cell::RefCell,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

struct DelegateIvars {
    events: EventSink,
}

define_class!(
    // SAFETY:
    // - The superclass NSObject does not have any subclassing requirements.
    // - `LocationDelegate` does not implement `Drop`.
    #[unsafe(super(NSObject))]
    #[thread_kind = MainThreadOnly]
    #[name = "WaypointLocationDelegate"]
    #[ivars = DelegateIvars]
    struct LocationDelegate;

    unsafe impl NSObjectProtocol for LocationDelegate {}

    unsafe impl CLLocationManagerDelegate for LocationDelegate {
        #[unsafe(method(locationManager:didUpdateLocations:))]
        fn did_update_locations(
            &self,
            _manager: &CLLocationManager,
            locations: &NSArray<CLLocation>,
        ) {
            let batch = locations.iter().map(|location| convert_location(&location)).collect();
            self.ivars()
                .events
                .dispatch(BackendEvent::LocationsUpdated(batch));
        }

        #[unsafe(method(locationManager:didFailWithError:))]
        fn did_fail_with_error(&self, _manager: &CLLocationManager, error: &NSError) {
            let error = PlatformError::new(
                error.domain().to_string(),
                error.code() as i64,
                error.localizedDescription().to_string(),
            );
            self.ivars().events.dispatch(BackendEvent::Failed(error));
        }

        #[unsafe(method(locationManagerDidChangeAuthorization:))]
        fn did_change_authorization(&self, manager: &CLLocationManager) {
            let status = convert_status(unsafe { manager.authorizationStatus() });
            self.ivars()
                .events
                .dispatch(BackendEvent::AuthorizationChanged(status));
        }
    }
);

impl LocationDelegate {
    fn new(mtm: MainThreadMarker, events: EventSink) -> Retained<Self> {
        let this = Self::alloc(mtm).set_ivars(DelegateIvars { events });
        // SAFETY: The signature of `NSObject`'s `init` method is correct.
        unsafe { msg_send![super(this), init] }
    }
}

/// Location backend driving a `CLLocationManager`.
///
/// Must be created on the main thread; CoreLocation delivers its callbacks on
/// the run loop of the thread that created the manager.
pub struct CoreLocationBackend {
    manager: Retained<CLLocationManager>,
    // The manager only holds its delegate weakly.
    delegate: RefCell<Option<Retained<LocationDelegate>>>,
    mtm: MainThreadMarker,
}

impl CoreLocationBackend {
    /// Create a backend, or `None` when not called from the main thread.
    pub fn new() -> Option<Self> {
        let mtm = MainThreadMarker::new()?;
        Some(Self {
            manager: unsafe { CLLocationManager::new() },
            delegate: RefCell::new(None),
            mtm,
        })
    }
}

impl LocationBackend for CoreLocationBackend {
    fn bind(&self, events: EventSink) {
        let delegate = LocationDelegate::new(self.mtm, events);
        unsafe {
            self.manager
                .setDelegate(Some(ProtocolObject::from_ref(&*delegate)));
        }
        *self.delegate.borrow_mut() = Some(delegate);
    }

    fn authorization_status(&self) -> AuthorizationStatus {
        convert_status(unsafe { self.manager.authorizationStatus() })
    }

    fn request_authorization(&self, mode: AuthorizationMode) {
        match mode {
            AuthorizationMode::WhenInUse => unsafe {
                self.manager.requestWhenInUseAuthorization();
            },
            AuthorizationMode::Always => unsafe {
                self.manager.requestAlwaysAuthorization();
            },
        }
    }

    fn start_updating_location(&self) {
        unsafe { self.manager.startUpdatingLocation() }
    }

    fn stop_updating_location(&self) {
        unsafe { self.manager.stopUpdatingLocation() }
    }

    fn request_location(&self) {
        unsafe { self.manager.requestLocation() }
    }

    fn desired_accuracy(&self) -> f64 {
        unsafe { self.manager.desiredAccuracy() }
    }

    fn set_desired_accuracy(&self, accuracy: f64) {
        unsafe { self.manager.setDesiredAccuracy(accuracy) }
    }

    fn set_distance_filter(&self, meters: f64) {
        unsafe { self.manager.setDistanceFilter(meters) }
    }

    fn set_allows_background_updates(&self, allowed: bool) {
        unsafe { self.manager.setAllowsBackgroundLocationUpdates(allowed) }
    }
}

/// Usage strings declared in the app's Info.plist.
#[derive(Debug, Clone, Copy, Default)]
pub struct MainBundleUsageDescriptions;

impl UsageDescriptions for MainBundleUsageDescriptions {
    fn usage_description(&self, key: &str) -> Option<String> {
        let bundle = NSBundle::mainBundle();
        let value = bundle.objectForInfoDictionaryKey(&NSString::from_str(key))?;
        // Only presence matters; a non-string value still declares the key.
        Some(
            value
                .downcast::<NSString>()
                .map(|string| string.to_string())
                .unwrap_or_default(),
        )
    }
}

fn convert_status(status: CLAuthorizationStatus) -> AuthorizationStatus {
    match status {
        CLAuthorizationStatus::Restricted => AuthorizationStatus::Restricted,
        CLAuthorizationStatus::Denied => AuthorizationStatus::Denied,
        CLAuthorizationStatus::AuthorizedAlways => AuthorizationStatus::AuthorizedAlways,
        CLAuthorizationStatus::AuthorizedWhenInUse => AuthorizationStatus::AuthorizedWhenInUse,
        _ => AuthorizationStatus::NotDetermined,
    }
}

fn convert_location(location: &CLLocation) -> Location {
    let coordinate = unsafe { location.coordinate() };
    let vertical_accuracy = unsafe { location.verticalAccuracy() };
    let seconds = unsafe { location.timestamp().timeIntervalSince1970() };

    let mut converted = Location::new(coordinate.latitude, coordinate.longitude)
        .with_horizontal_accuracy(unsafe { location.horizontalAccuracy() })
        .with_timestamp(
            UNIX_EPOCH
                .checked_add(Duration::from_secs_f64(seconds.max(0.0)))
                .unwrap_or_else(SystemTime::now),
        );

    if vertical_accuracy >= 0.0 {
        converted = converted.with_altitude(unsafe { location.altitude() }, vertical_accuracy);
    }

    converted
}
