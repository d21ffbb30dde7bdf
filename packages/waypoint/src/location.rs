use serde::{Deserialize, Serialize};
use std::{fmt, time::SystemTime};

/// Represents a geographic coordinate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// A single position fix reported by the platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    /// Meters above sea level, if the fix carries a valid altitude.
    pub altitude: Option<f64>,
    /// Radius of uncertainty in meters. Negative means the coordinate is invalid.
    pub horizontal_accuracy: f64,
    /// Altitude uncertainty in meters. Negative means the altitude is invalid.
    pub vertical_accuracy: f64,
    pub timestamp: SystemTime,
}

impl Location {
    /// A fix at the given coordinate, taken now, with no altitude.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude: None,
            horizontal_accuracy: 0.0,
            vertical_accuracy: -1.0,
            timestamp: SystemTime::now(),
        }
    }

    pub fn with_horizontal_accuracy(mut self, meters: f64) -> Self {
        self.horizontal_accuracy = meters;
        self
    }

    pub fn with_altitude(mut self, meters: f64, accuracy: f64) -> Self {
        self.altitude = Some(meters);
        self.vertical_accuracy = accuracy;
        self
    }

    pub fn with_timestamp(mut self, timestamp: SystemTime) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.latitude, self.longitude)
    }
}
