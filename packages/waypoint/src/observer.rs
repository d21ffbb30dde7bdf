use crate::{Location, LocationError};
use std::rc::{Rc, Weak};

/// Receives location updates and failures from a [`LocationService`](crate::LocationService).
pub trait LocationObserver {
    fn on_location_updated(&self, location: &Location);

    fn on_error(&self, error: &LocationError);
}

/// The set of observers, held weakly and compared by identity.
#[derive(Default)]
pub(crate) struct ObserverRegistry {
    entries: Vec<Weak<dyn LocationObserver>>,
}

impl ObserverRegistry {
    /// Register `observer`. Returns false if it was already registered.
    pub fn add(&mut self, observer: &Rc<dyn LocationObserver>) -> bool {
        let id = Rc::as_ptr(observer) as *const ();
        if self.position(id).is_some() {
            return false;
        }
        self.entries.push(Rc::downgrade(observer));
        true
    }

    /// Unregister the observer living at `id`. Returns false if it was not registered.
    pub fn remove(&mut self, id: *const ()) -> bool {
        match self.position(id) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// Strong references to every live observer, in registration order.
    ///
    /// Entries whose observer has been dropped are pruned.
    pub fn snapshot(&mut self) -> Vec<Rc<dyn LocationObserver>> {
        self.entries.retain(|entry| entry.strong_count() > 0);
        self.entries.iter().filter_map(Weak::upgrade).collect()
    }

    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.strong_count() > 0)
            .count()
    }

    fn position(&self, id: *const ()) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.as_ptr() as *const () == id)
    }
}
