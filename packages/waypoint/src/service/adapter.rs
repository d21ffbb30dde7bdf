//! Reactions to platform callbacks.

use super::{Notice, Shared};
use crate::{AuthorizationStatus, BackendEvent, Location, LocationError, PlatformError};
use tracing::{debug, trace, warn};

impl Shared {
    pub(super) fn handle(&self, event: BackendEvent) {
        match event {
            BackendEvent::AuthorizationChanged(status) => self.on_authorization_changed(status),
            BackendEvent::Failed(error) => self.on_backend_error(error),
            BackendEvent::LocationsUpdated(locations) => self.on_locations_updated(locations),
        }
    }

    fn on_authorization_changed(&self, status: AuthorizationStatus) {
        self.transact(|state, outbox| {
            let Some(mode) = self.resolve_or_report(state, outbox) else {
                return;
            };

            if !status.grants(mode) {
                if status == AuthorizationStatus::NotDetermined {
                    trace!(%mode, "Location authorization not determined yet");
                    return;
                }

                warn!(%mode, ?status, "Location authorization was not granted");
                outbox.push(Notice::Error(LocationError::AuthorizationFailed { status }));

                // The failure is terminal: nothing keeps waiting on it.
                if state.pending.one_shot {
                    state.pending.resume_after_one_shot = false;
                    self.backend
                        .set_desired_accuracy(state.config.desired_accuracy);
                }
                state.pending.continuous = false;
                state.pending.one_shot = false;
                return;
            }

            if state.pending.continuous {
                state.pending.continuous = false;
                state.monitoring = true;
                self.backend.start_updating_location();
                debug!(%mode, "Authorization granted, started continuous location updates");
            }

            if state.pending.one_shot {
                state.pending.one_shot = false;
                self.backend.request_location();
                debug!(%mode, "Authorization granted, requested one-shot location");
            }
        });
    }

    fn on_backend_error(&self, error: PlatformError) {
        warn!(domain = %error.domain, code = error.code, "Location backend failed: {}", error.description);
        self.transact(|_, outbox| {
            outbox.push(Notice::Error(LocationError::Backend(error)));
        });
    }

    fn on_locations_updated(&self, locations: Vec<Location>) {
        // Only the newest fix of a batch is reported.
        let Some(location) = locations.into_iter().last() else {
            trace!("Ignoring empty location batch");
            return;
        };

        self.transact(|state, outbox| {
            trace!(%location, "Location updated");
            state.last_location = Some(location.clone());
            outbox.push(Notice::Location(location));

            let configured = state.config.desired_accuracy;
            if self.backend.desired_accuracy() != configured {
                self.backend.set_desired_accuracy(configured);
            }

            if state.pending.resume_after_one_shot {
                state.pending.resume_after_one_shot = false;
                state.monitoring = true;
                self.backend.start_updating_location();
                debug!("Resumed continuous location updates after one-shot request");
            }
        });
    }
}
