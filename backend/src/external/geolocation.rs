//! Geolocation reported by the browser
//!
//! The dashboard asks the device for its position and forwards the outcome
//! when it opens a session; the server never talks to a geolocation API
//! itself.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared::{GeolocationFailure, Location};

use super::GeolocationProvider;

/// Outcome of the browser's geolocation request
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReportedGeolocation {
    Granted { lat: f64, lng: f64 },
    Denied,
    Timeout,
    #[default]
    Unsupported,
}

#[async_trait]
impl GeolocationProvider for ReportedGeolocation {
    async fn request_location(&self) -> Result<Location, GeolocationFailure> {
        match *self {
            ReportedGeolocation::Granted { lat, lng } => {
                let location = Location::new(lat, lng);
                if location.is_valid() {
                    Ok(location)
                } else {
                    Err(GeolocationFailure::Unsupported)
                }
            }
            ReportedGeolocation::Denied => Err(GeolocationFailure::Denied),
            ReportedGeolocation::Timeout => Err(GeolocationFailure::Timeout),
            ReportedGeolocation::Unsupported => Err(GeolocationFailure::Unsupported),
        }
    }

    fn name(&self) -> &str {
        "browser"
    }
}
