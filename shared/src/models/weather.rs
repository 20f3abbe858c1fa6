//! Weather data models

use serde::{Deserialize, Serialize};

/// Number of daily entries in a forecast
pub const FORECAST_DAYS: usize = 7;

/// A weather reading for one location request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeatherSnapshot {
    pub temperature: f64,
    /// Relative humidity in percent
    pub humidity: f64,
    /// Precipitation in millimetres
    pub precipitation: f64,
    pub forecast: Vec<DailyForecast>,
}

/// One day of the temperature forecast
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyForecast {
    /// Display label for the day, e.g. "Mon 06 Oct"
    pub day: String,
    pub temp: f64,
}

impl WeatherSnapshot {
    /// Whether the forecast carries exactly one entry per forecast day
    pub fn has_full_forecast(&self) -> bool {
        self.forecast.len() == FORECAST_DAYS
    }

    /// Mean of the forecast temperatures, falling back to the current reading
    pub fn mean_forecast_temperature(&self) -> f64 {
        if self.forecast.is_empty() {
            return self.temperature;
        }
        self.forecast.iter().map(|d| d.temp).sum::<f64>() / self.forecast.len() as f64
    }
}
