mod common;

use common::harness;
use pretty_assertions::assert_eq;
use waypoint::{
    AuthorizationMode, AuthorizationStatus, BackendCall, LocationError, PendingRequests,
    ALWAYS_USAGE_KEY, WHEN_IN_USE_USAGE_KEY,
};

#[test]
fn both_usage_keys_without_override_block_everything() {
    let h = harness(
        &[WHEN_IN_USE_USAGE_KEY, ALWAYS_USAGE_KEY],
        AuthorizationStatus::AuthorizedAlways,
    );

    assert_eq!(h.service.resolve_authorization_mode(), None);
    h.service.start_updating_location();
    h.service.request_location(None);
    assert!(!h.service.is_authorized());

    assert_eq!(
        h.recorder.errors(),
        vec![LocationError::ConfigurationAmbiguous; 4]
    );
    assert_eq!(h.platform.calls(), vec![]);
    assert!(!h.service.is_monitoring());
    assert_eq!(h.service.pending_requests(), PendingRequests::default());
}

#[test]
fn missing_usage_keys_are_reported() {
    let h = harness(&[], AuthorizationStatus::AuthorizedWhenInUse);

    h.service.start_updating_location();

    assert_eq!(h.recorder.errors(), vec![LocationError::ConfigurationMissing]);
    assert_eq!(h.recorder.errors()[0].code(), 99);
    assert!(!h.platform.is_updating());
}

#[test]
fn override_settles_ambiguous_keys() {
    let h = harness(
        &[WHEN_IN_USE_USAGE_KEY, ALWAYS_USAGE_KEY],
        AuthorizationStatus::AuthorizedWhenInUse,
    );

    h.service
        .set_authorization_override(Some(AuthorizationMode::WhenInUse));
    assert_eq!(
        h.service.resolve_authorization_mode(),
        Some(AuthorizationMode::WhenInUse)
    );
    assert!(h.service.is_authorized());
    assert!(h.recorder.is_silent());
}

#[test]
fn single_key_picks_its_mode() {
    let h = harness(&[ALWAYS_USAGE_KEY], AuthorizationStatus::NotDetermined);
    assert_eq!(
        h.service.resolve_authorization_mode(),
        Some(AuthorizationMode::Always)
    );

    let h = harness(&[WHEN_IN_USE_USAGE_KEY], AuthorizationStatus::NotDetermined);
    assert_eq!(
        h.service.resolve_authorization_mode(),
        Some(AuthorizationMode::WhenInUse)
    );
}

#[test]
fn matching_authorization_starts_synchronously() {
    let h = harness(
        &[WHEN_IN_USE_USAGE_KEY],
        AuthorizationStatus::AuthorizedWhenInUse,
    );

    h.service.start_updating_location();

    assert!(h.service.is_monitoring());
    assert!(h.platform.is_updating());
    assert_eq!(h.platform.calls(), vec![BackendCall::StartUpdatingLocation]);
    assert_eq!(h.service.pending_requests(), PendingRequests::default());

    // Starting twice is a no-op.
    h.service.start_updating_location();
    assert_eq!(h.platform.calls(), vec![BackendCall::StartUpdatingLocation]);
}

#[test]
fn always_is_not_satisfied_by_when_in_use() {
    let h = harness(&[], AuthorizationStatus::AuthorizedWhenInUse);
    h.service
        .set_authorization_override(Some(AuthorizationMode::Always));

    h.service.start_updating_location();

    assert!(!h.service.is_monitoring());
    assert!(!h.platform.is_updating());
    assert!(h.service.pending_requests().continuous);
    assert_eq!(
        h.platform.take_calls(),
        vec![BackendCall::RequestAuthorization(AuthorizationMode::Always)]
    );

    h.platform
        .set_authorization(AuthorizationStatus::AuthorizedAlways);

    assert!(h.service.is_monitoring());
    assert!(h.platform.is_updating());
    assert!(!h.service.pending_requests().continuous);
    assert_eq!(
        h.platform.take_calls(),
        vec![BackendCall::StartUpdatingLocation]
    );
    assert!(h.recorder.is_silent());
}

#[test]
fn undetermined_status_keeps_waiting() {
    let h = harness(&[WHEN_IN_USE_USAGE_KEY], AuthorizationStatus::NotDetermined);

    h.service.start_updating_location();
    h.platform
        .set_authorization(AuthorizationStatus::NotDetermined);

    assert!(h.recorder.is_silent());
    assert!(h.service.pending_requests().continuous);
    assert!(!h.service.is_monitoring());
}

#[test]
fn denial_is_reported_once_and_clears_the_wait() {
    let h = harness(&[WHEN_IN_USE_USAGE_KEY], AuthorizationStatus::NotDetermined);

    h.service.start_updating_location();
    h.service.request_location(None);
    assert_eq!(
        h.service.pending_requests(),
        PendingRequests {
            continuous: true,
            one_shot: true,
            resume_after_one_shot: false,
        }
    );

    h.platform.set_authorization(AuthorizationStatus::Denied);

    assert_eq!(
        h.recorder.errors(),
        vec![LocationError::AuthorizationFailed {
            status: AuthorizationStatus::Denied
        }]
    );
    assert_eq!(h.recorder.errors()[0].code(), 100);
    assert_eq!(h.service.pending_requests(), PendingRequests::default());

    // A later grant no longer starts anything on its own.
    h.platform.take_calls();
    h.platform
        .set_authorization(AuthorizationStatus::AuthorizedWhenInUse);
    assert_eq!(h.platform.calls(), vec![]);
    assert!(!h.service.is_monitoring());

    // But the service is still usable.
    h.service.start_updating_location();
    assert!(h.service.is_monitoring());
}

#[test]
fn one_grant_releases_both_waiting_requests() {
    let h = harness(&[WHEN_IN_USE_USAGE_KEY], AuthorizationStatus::NotDetermined);

    h.service.request_location(None);
    h.service.start_updating_location();
    h.platform.take_calls();

    h.platform
        .set_authorization(AuthorizationStatus::AuthorizedWhenInUse);

    assert_eq!(
        h.platform.calls(),
        vec![
            BackendCall::StartUpdatingLocation,
            BackendCall::RequestLocation
        ]
    );
    assert_eq!(h.service.pending_requests(), PendingRequests::default());
    assert!(h.service.is_monitoring());
}

#[test]
fn usage_declarations_are_read_on_every_resolution() {
    let h = harness(&[WHEN_IN_USE_USAGE_KEY], AuthorizationStatus::NotDetermined);
    assert_eq!(
        h.service.resolve_authorization_mode(),
        Some(AuthorizationMode::WhenInUse)
    );

    h.usage.insert(ALWAYS_USAGE_KEY, "Track runs in the background");
    assert_eq!(h.service.resolve_authorization_mode(), None);
    assert_eq!(
        h.recorder.errors(),
        vec![LocationError::ConfigurationAmbiguous]
    );

    h.usage.remove(WHEN_IN_USE_USAGE_KEY);
    assert_eq!(
        h.service.resolve_authorization_mode(),
        Some(AuthorizationMode::Always)
    );
}

#[test]
fn authorization_queries_do_not_request_anything() {
    let h = harness(&[WHEN_IN_USE_USAGE_KEY], AuthorizationStatus::Denied);

    assert!(!h.service.is_authorized());
    assert_eq!(h.service.authorization_status(), AuthorizationStatus::Denied);
    assert_eq!(h.platform.calls(), vec![]);
    assert!(h.recorder.is_silent());
}
