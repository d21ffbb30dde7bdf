use std::{cell::RefCell, collections::HashMap, rc::Rc};

/// Declares that the app uses location while it is in use.
pub const WHEN_IN_USE_USAGE_KEY: &str = "NSLocationWhenInUseUsageDescription";

/// Declares that the app uses location at any time.
pub const ALWAYS_USAGE_KEY: &str = "NSLocationAlwaysUsageDescription";

/// A source of the usage-purpose strings an app declares for location access.
///
/// Only presence matters. The source is consulted on every authorization
/// resolution, so implementations must not cache a stale answer.
pub trait UsageDescriptions {
    /// The purpose string declared under `key`, if any.
    fn usage_description(&self, key: &str) -> Option<String>;

    fn declares(&self, key: &str) -> bool {
        self.usage_description(key).is_some()
    }
}

impl<T: UsageDescriptions + ?Sized> UsageDescriptions for Rc<T> {
    fn usage_description(&self, key: &str) -> Option<String> {
        (**self).usage_description(key)
    }
}

/// An in-memory set of usage strings.
///
/// Clones share the same map, so a host can keep a handle and change the
/// declarations after the service has been built.
#[derive(Debug, Clone, Default)]
pub struct StaticUsageDescriptions {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl StaticUsageDescriptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, key: impl Into<String>, description: impl Into<String>) {
        self.entries
            .borrow_mut()
            .insert(key.into(), description.into());
    }

    pub fn remove(&self, key: &str) -> Option<String> {
        self.entries.borrow_mut().remove(key)
    }
}

impl UsageDescriptions for StaticUsageDescriptions {
    fn usage_description(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }
}

/// Reads the usage strings from process environment variables of the same name.
///
/// A variable that is set counts as declared, even when it is empty.
///
/// Useful on desktop hosts that have no app bundle.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvUsageDescriptions;

impl UsageDescriptions for EnvUsageDescriptions {
    fn usage_description(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}
