//! Weather API client for fetching weather data
//!
//! Integrates with the OpenWeatherMap API: current conditions plus the daily
//! forecast, collapsed into a single `WeatherSnapshot`.

use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use reqwest::Client;
use serde::Deserialize;
use shared::{DailyForecast, Location, WeatherSnapshot, FORECAST_DAYS};

use super::{ProviderError, WeatherProvider};

/// Weather API client
#[derive(Clone)]
pub struct WeatherClient {
    client: Client,
    api_key: String,
    base_url: String,
}

/// OpenWeatherMap API response for current weather
#[derive(Debug, Deserialize)]
struct OWMCurrentResponse {
    main: OWMMain,
    rain: Option<OWMRain>,
}

#[derive(Debug, Deserialize)]
struct OWMMain {
    temp: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct OWMRain {
    #[serde(rename = "1h")]
    one_hour: Option<f64>,
    #[serde(rename = "3h")]
    three_hour: Option<f64>,
}

/// OpenWeatherMap API response for the daily forecast
#[derive(Debug, Deserialize)]
struct OWMDailyResponse {
    list: Vec<OWMDailyItem>,
}

#[derive(Debug, Deserialize)]
struct OWMDailyItem {
    dt: i64,
    temp: OWMDailyTemp,
}

#[derive(Debug, Deserialize)]
struct OWMDailyTemp {
    day: f64,
}

impl WeatherClient {
    /// Create a new WeatherClient
    pub fn new(api_key: String, timeout: Duration) -> Result<Self, ProviderError> {
        Self::with_base_url(
            api_key,
            "https://api.openweathermap.org/data/2.5".to_string(),
            timeout,
        )
    }

    /// Create a new WeatherClient with custom base URL (for testing)
    pub fn with_base_url(
        api_key: String,
        base_url: String,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::NotConfigured(format!("weather HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, ProviderError> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Unreachable(format!(
                "Weather API error: {} - {}",
                status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("weather response: {}", e)))
    }

    /// Fetch current conditions by coordinates
    async fn get_current(&self, location: Location) -> Result<OWMCurrentResponse, ProviderError> {
        let url = format!(
            "{}/weather?lat={}&lon={}&appid={}&units=metric",
            self.base_url, location.lat, location.lng, self.api_key
        );
        self.get_json(&url).await
    }

    /// Fetch the daily forecast by coordinates
    async fn get_daily_forecast(&self, location: Location) -> Result<OWMDailyResponse, ProviderError> {
        let url = format!(
            "{}/forecast/daily?lat={}&lon={}&cnt={}&appid={}&units=metric",
            self.base_url, location.lat, location.lng, FORECAST_DAYS, self.api_key
        );
        self.get_json(&url).await
    }
}

/// Convert OpenWeatherMap responses to a snapshot
fn convert_responses(current: OWMCurrentResponse, daily: OWMDailyResponse) -> WeatherSnapshot {
    let precipitation = current
        .rain
        .as_ref()
        .and_then(|r| r.one_hour.or(r.three_hour))
        .unwrap_or(0.0);

    let forecast = daily
        .list
        .into_iter()
        .take(FORECAST_DAYS)
        .map(|item| DailyForecast {
            day: DateTime::from_timestamp(item.dt, 0)
                .map(|dt| dt.format("%a %d %b").to_string())
                .unwrap_or_default(),
            temp: item.temp.day,
        })
        .collect();

    WeatherSnapshot {
        temperature: current.main.temp,
        humidity: current.main.humidity,
        precipitation,
        forecast,
    }
}

#[async_trait]
impl WeatherProvider for WeatherClient {
    async fn get_weather(&self, location: Location) -> Result<WeatherSnapshot, ProviderError> {
        let (current, daily) = tokio::try_join!(
            self.get_current(location),
            self.get_daily_forecast(location)
        )?;
        Ok(convert_responses(current, daily))
    }

    fn name(&self) -> &str {
        "openweathermap"
    }
}
