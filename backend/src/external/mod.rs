//! External provider integrations
//!
//! Every data source the dashboard depends on is consumed through one of the
//! provider traits below, so sessions can run against the simulated
//! providers, the HTTP clients, or deterministic test fixtures.

pub mod ai_recommendation;
pub mod geolocation;
pub mod simulated;
pub mod soil;
pub mod weather;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use shared::{CropType, GeolocationFailure, Location, Recommendation, SoilSnapshot, WeatherSnapshot};
use thiserror::Error;

use crate::config::{ProviderMode, ProvidersConfig};

pub use ai_recommendation::AiRecommendationClient;
pub use geolocation::ReportedGeolocation;
pub use simulated::{SimulatedRecommendationProvider, SimulatedSoilProvider, SimulatedWeatherProvider};
pub use soil::SoilClient;
pub use weather::WeatherClient;

/// Failure of an external data provider
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    #[error("provider unreachable: {0}")]
    Unreachable(String),

    #[error("provider timed out")]
    Timeout,

    #[error("invalid provider response: {0}")]
    InvalidResponse(String),

    #[error("provider not configured: {0}")]
    NotConfigured(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ProviderError::Timeout
        } else if e.is_decode() {
            ProviderError::InvalidResponse(e.to_string())
        } else {
            ProviderError::Unreachable(e.to_string())
        }
    }
}

/// Source of the device location
#[async_trait]
pub trait GeolocationProvider: Send + Sync {
    async fn request_location(&self) -> Result<Location, GeolocationFailure>;

    /// Provider name for logging
    fn name(&self) -> &str;
}

/// Weather data source
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn get_weather(&self, location: Location) -> Result<WeatherSnapshot, ProviderError>;

    fn name(&self) -> &str;
}

/// Soil data source
#[async_trait]
pub trait SoilProvider: Send + Sync {
    async fn get_soil(&self, location: Location) -> Result<SoilSnapshot, ProviderError>;

    fn name(&self) -> &str;
}

/// Remote recommendation (inference) service
#[async_trait]
pub trait RecommendationProvider: Send + Sync {
    async fn get_recommendation(
        &self,
        soil: &SoilSnapshot,
        weather: &WeatherSnapshot,
        crop_type: CropType,
    ) -> Result<Recommendation, ProviderError>;

    fn name(&self) -> &str;
}

/// The set of environment and inference providers a session runs against
#[derive(Clone)]
pub struct Providers {
    pub weather: Arc<dyn WeatherProvider>,
    pub soil: Arc<dyn SoilProvider>,
    pub recommendation: Arc<dyn RecommendationProvider>,
}

impl Providers {
    pub fn new(
        weather: Arc<dyn WeatherProvider>,
        soil: Arc<dyn SoilProvider>,
        recommendation: Arc<dyn RecommendationProvider>,
    ) -> Self {
        Self {
            weather,
            soil,
            recommendation,
        }
    }

    /// Simulated providers with no artificial latency
    pub fn simulated() -> Self {
        Self::new(
            Arc::new(SimulatedWeatherProvider::new()),
            Arc::new(SimulatedSoilProvider::new()),
            Arc::new(SimulatedRecommendationProvider::new()),
        )
    }

    /// Build the providers selected by configuration
    pub fn from_config(config: &ProvidersConfig) -> Result<Self, ProviderError> {
        match config.mode {
            ProviderMode::Simulated => {
                let latency = Duration::from_millis(config.simulated_latency_ms);
                Ok(Self::new(
                    Arc::new(SimulatedWeatherProvider::new().with_latency(latency)),
                    Arc::new(SimulatedSoilProvider::new().with_latency(latency)),
                    Arc::new(SimulatedRecommendationProvider::new().with_latency(latency)),
                ))
            }
            ProviderMode::Http => {
                let timeout = Duration::from_secs(config.request_timeout_secs);
                let weather_key = required(&config.weather_api_key, "providers.weather_api_key")?;
                let soil_endpoint = required(&config.soil_endpoint, "providers.soil_endpoint")?;
                let ai_endpoint = required(
                    &config.recommendation_endpoint,
                    "providers.recommendation_endpoint",
                )?;
                let ai_key = required(
                    &config.recommendation_api_key,
                    "providers.recommendation_api_key",
                )?;

                let weather = match &config.weather_endpoint {
                    Some(base_url) => WeatherClient::with_base_url(weather_key, base_url.clone(), timeout)?,
                    None => WeatherClient::new(weather_key, timeout)?,
                };

                Ok(Self::new(
                    Arc::new(weather),
                    Arc::new(SoilClient::new(soil_endpoint, timeout)?),
                    Arc::new(AiRecommendationClient::new(ai_endpoint, ai_key, timeout)?),
                ))
            }
        }
    }
}

fn required(value: &Option<String>, key: &str) -> Result<String, ProviderError> {
    value
        .as_ref()
        .filter(|v| !v.is_empty())
        .cloned()
        .ok_or_else(|| ProviderError::NotConfigured(key.to_string()))
}
