//! Configuration management for the NovaFarm dashboard server
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with NOVAFARM_ prefix

use std::time::Duration;

use config::{ConfigError, Environment, File};
use serde::Deserialize;
use shared::{CropType, FarmParameters, Location};

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Location resolution configuration
    pub location: LocationConfig,

    /// Data provider configuration
    pub providers: ProvidersConfig,

    /// Initial dashboard parameters for new sessions
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LocationConfig {
    /// Latitude used when geolocation is unavailable
    pub default_latitude: f64,

    /// Longitude used when geolocation is unavailable
    pub default_longitude: f64,

    /// Upper bound on a geolocation request
    pub geolocation_timeout_ms: u64,
}

impl LocationConfig {
    pub fn default_location(&self) -> Location {
        Location::new(self.default_latitude, self.default_longitude)
    }
}

/// Which provider implementations sessions run against
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderMode {
    Simulated,
    Http,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProvidersConfig {
    pub mode: ProviderMode,

    /// Artificial delay for simulated providers
    pub simulated_latency_ms: u64,

    /// HTTP request timeout in seconds
    pub request_timeout_secs: u64,

    /// Weather API base URL (defaults to OpenWeatherMap)
    pub weather_endpoint: Option<String>,

    /// Weather API key
    pub weather_api_key: Option<String>,

    /// Soil service endpoint
    pub soil_endpoint: Option<String>,

    /// AI recommendation API endpoint
    pub recommendation_endpoint: Option<String>,

    /// AI recommendation API key
    pub recommendation_api_key: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    pub crop_type: CropType,
    pub area_hectares: f64,
    pub irrigation_efficiency_pct: f64,
    pub pest_control_efficiency_pct: f64,

    /// Sessions untouched for this long are evicted
    pub session_idle_secs: u64,
}

impl DashboardConfig {
    pub fn session_idle(&self) -> Duration {
        Duration::from_secs(self.session_idle_secs)
    }

    pub fn parameters(&self) -> FarmParameters {
        FarmParameters {
            area_hectares: self.area_hectares,
            irrigation_efficiency_pct: self.irrigation_efficiency_pct,
            pest_control_efficiency_pct: self.pest_control_efficiency_pct,
        }
    }
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("NOVAFARM_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("location.default_latitude", shared::DEFAULT_LATITUDE)?
            .set_default("location.default_longitude", shared::DEFAULT_LONGITUDE)?
            .set_default("location.geolocation_timeout_ms", 10_000)?
            .set_default("providers.mode", "simulated")?
            .set_default("providers.simulated_latency_ms", 0)?
            .set_default("providers.request_timeout_secs", 30)?
            .set_default("dashboard.crop_type", "wheat")?
            .set_default("dashboard.area_hectares", 1.0)?
            .set_default("dashboard.irrigation_efficiency_pct", 100.0)?
            .set_default("dashboard.pest_control_efficiency_pct", 100.0)?
            .set_default("dashboard.session_idle_secs", 1800)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (NOVAFARM_ prefix)
            .add_source(
                Environment::with_prefix("NOVAFARM")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            server: ServerConfig::default(),
            location: LocationConfig::default(),
            providers: ProvidersConfig::default(),
            dashboard: DashboardConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            default_latitude: shared::DEFAULT_LATITUDE,
            default_longitude: shared::DEFAULT_LONGITUDE,
            geolocation_timeout_ms: 10_000,
        }
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            mode: ProviderMode::Simulated,
            simulated_latency_ms: 0,
            request_timeout_secs: 30,
            weather_endpoint: None,
            weather_api_key: None,
            soil_endpoint: None,
            recommendation_endpoint: None,
            recommendation_api_key: None,
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        let params = FarmParameters::default();
        Self {
            crop_type: CropType::default(),
            area_hectares: params.area_hectares,
            irrigation_efficiency_pct: params.irrigation_efficiency_pct,
            pest_control_efficiency_pct: params.pest_control_efficiency_pct,
            session_idle_secs: 1800,
        }
    }
}
