//! Map location and device coordinate value types.

use serde::{Deserialize, Serialize};

/// Display name given to a location adopted from the device coordinate.
pub const CURRENT_LOCATION_NAME: &str = "現在地";

/// Raw device coordinate reported by the location collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// User-selected map location. Equality is structural.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub name: Option<String>,
}

impl AppLocation {
    pub fn new(latitude: f64, longitude: f64, name: Option<String>) -> Self {
        Self {
            latitude,
            longitude,
            name,
        }
    }

    /// Default reference point (Tokyo Station).
    pub fn tokyo_station() -> Self {
        Self::new(35.681236, 139.767125, Some("東京駅".to_string()))
    }

    /// Builds a named location from a device coordinate.
    pub fn from_coordinate(coordinate: Coordinate, name: Option<String>) -> Self {
        Self::new(coordinate.latitude, coordinate.longitude, name)
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }

    /// Returns whether this equals the default constant exactly.
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

impl Default for AppLocation {
    fn default() -> Self {
        Self::tokyo_station()
    }
}
