//! Platform backends.

pub mod simulated;

#[cfg(target_os = "ios")]
pub mod ios;
