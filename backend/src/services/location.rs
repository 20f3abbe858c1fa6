//! Farm location resolution with a fallback default

use std::sync::Arc;
use std::time::Duration;

use shared::{GeolocationFailure, Location};

use crate::config::LocationConfig;
use crate::external::GeolocationProvider;

/// Outcome of a resolution; `failure` is set when the default was substituted
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    pub location: Location,
    pub failure: Option<GeolocationFailure>,
}

/// Resolves the current farm location, never failing outright
#[derive(Clone)]
pub struct LocationResolver {
    provider: Arc<dyn GeolocationProvider>,
    timeout: Duration,
    fallback: Location,
}

impl LocationResolver {
    pub fn new(provider: Arc<dyn GeolocationProvider>, timeout: Duration, fallback: Location) -> Self {
        Self {
            provider,
            timeout,
            fallback,
        }
    }

    pub fn from_config(provider: Arc<dyn GeolocationProvider>, config: &LocationConfig) -> Self {
        Self::new(
            provider,
            Duration::from_millis(config.geolocation_timeout_ms),
            config.default_location(),
        )
    }

    /// Ask the provider for a location, substituting the default on failure
    pub async fn resolve(&self) -> Resolution {
        let outcome = match tokio::time::timeout(self.timeout, self.provider.request_location()).await {
            Ok(result) => result,
            Err(_) => Err(GeolocationFailure::Timeout),
        };

        match outcome {
            Ok(location) => {
                tracing::info!(provider = self.provider.name(), %location, "Location resolved");
                Resolution {
                    location,
                    failure: None,
                }
            }
            Err(reason) => {
                tracing::warn!(
                    provider = self.provider.name(),
                    %reason,
                    fallback = %self.fallback,
                    "Geolocation unavailable, using default location"
                );
                Resolution {
                    location: self.fallback,
                    failure: Some(reason),
                }
            }
        }
    }
}
