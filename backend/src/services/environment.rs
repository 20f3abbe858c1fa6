//! Environment data fetching (weather and soil)

use std::sync::Arc;

use shared::{Location, PipelineError, SnapshotKind, SoilSnapshot, WeatherSnapshot, FORECAST_DAYS};

use crate::external::{SoilProvider, WeatherProvider};

/// Retrieves weather and soil snapshots for a location
///
/// The two fetches are independent and may run concurrently. Responses that
/// break the snapshot contract are reported as failures of that snapshot.
#[derive(Clone)]
pub struct EnvironmentFetcher {
    weather: Arc<dyn WeatherProvider>,
    soil: Arc<dyn SoilProvider>,
}

impl EnvironmentFetcher {
    pub fn new(weather: Arc<dyn WeatherProvider>, soil: Arc<dyn SoilProvider>) -> Self {
        Self { weather, soil }
    }

    pub async fn fetch_weather(&self, location: Location) -> Result<WeatherSnapshot, PipelineError> {
        tracing::debug!(provider = self.weather.name(), %location, "Fetching weather");

        let snapshot = self
            .weather
            .get_weather(location)
            .await
            .map_err(|e| PipelineError::fetch_failed(SnapshotKind::Weather, e.to_string()))?;

        if !snapshot.has_full_forecast() {
            return Err(PipelineError::fetch_failed(
                SnapshotKind::Weather,
                format!(
                    "expected a {}-day forecast, got {} entries",
                    FORECAST_DAYS,
                    snapshot.forecast.len()
                ),
            ));
        }

        Ok(snapshot)
    }

    pub async fn fetch_soil(&self, location: Location) -> Result<SoilSnapshot, PipelineError> {
        tracing::debug!(provider = self.soil.name(), %location, "Fetching soil");

        let snapshot = self
            .soil
            .get_soil(location)
            .await
            .map_err(|e| PipelineError::fetch_failed(SnapshotKind::Soil, e.to_string()))?;

        if !snapshot.is_physical() {
            return Err(PipelineError::fetch_failed(
                SnapshotKind::Soil,
                "soil readings out of physical range",
            ));
        }

        Ok(snapshot)
    }
}
