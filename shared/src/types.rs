//! Common types used across the platform

use serde::{Deserialize, Serialize};
use std::fmt;

/// Latitude used when the device location cannot be obtained
pub const DEFAULT_LATITUDE: f64 = 37.7749;

/// Longitude used when the device location cannot be obtained
pub const DEFAULT_LONGITUDE: f64 = -122.4194;

/// A farm location in decimal degrees
///
/// Immutable value: a new location replaces the previous one wholesale.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Whether both coordinates fall inside the WGS84 ranges
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::new(DEFAULT_LATITUDE, DEFAULT_LONGITUDE)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4})", self.lat, self.lng)
    }
}

/// Which environmental snapshot a value or failure refers to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotKind {
    Weather,
    Soil,
}

impl fmt::Display for SnapshotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotKind::Weather => write!(f, "weather"),
            SnapshotKind::Soil => write!(f, "soil"),
        }
    }
}

/// Reason a geolocation request did not produce coordinates
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GeolocationFailure {
    Denied,
    Timeout,
    Unsupported,
}

impl fmt::Display for GeolocationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeolocationFailure::Denied => write!(f, "permission denied"),
            GeolocationFailure::Timeout => write!(f, "request timed out"),
            GeolocationFailure::Unsupported => write!(f, "geolocation unsupported"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_location() {
        let location = Location::default();
        assert_eq!(location, Location::new(37.7749, -122.4194));
        assert!(location.is_valid());
    }

    #[test]
    fn test_location_out_of_range() {
        assert!(!Location::new(91.0, 0.0).is_valid());
        assert!(!Location::new(0.0, -180.5).is_valid());
        assert!(!Location::new(f64::NAN, 0.0).is_valid());
    }
}
