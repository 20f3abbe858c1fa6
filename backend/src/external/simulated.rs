//! Simulated providers for development and demos
//!
//! Readings look random but are seeded from the requested coordinates, so a
//! fixed location always produces the same snapshot.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shared::{
    CropType, DailyForecast, FertilizerAdvice, Location, Recommendation, SoilSnapshot,
    WeatherSnapshot, FORECAST_DAYS,
};

use super::{ProviderError, RecommendationProvider, SoilProvider, WeatherProvider};

const WEATHER_SALT: u64 = 0x5745_4154_4845_5221;
const SOIL_SALT: u64 = 0x534f_494c_534f_494c;

fn seed_for(location: Location, salt: u64) -> u64 {
    location.lat.to_bits().wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ location.lng.to_bits().rotate_left(29)
        ^ salt
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

async fn simulate_latency(latency: Duration) {
    if !latency.is_zero() {
        tokio::time::sleep(latency).await;
    }
}

/// Weather readings in plausible growing-season ranges
#[derive(Debug, Clone)]
pub struct SimulatedWeatherProvider {
    latency: Duration,
    start_date: NaiveDate,
}

impl SimulatedWeatherProvider {
    pub fn new() -> Self {
        Self {
            latency: Duration::ZERO,
            start_date: Utc::now().date_naive(),
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// First day of the generated forecast
    pub fn with_start_date(mut self, start_date: NaiveDate) -> Self {
        self.start_date = start_date;
        self
    }
}

impl Default for SimulatedWeatherProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WeatherProvider for SimulatedWeatherProvider {
    async fn get_weather(&self, location: Location) -> Result<WeatherSnapshot, ProviderError> {
        simulate_latency(self.latency).await;

        let mut rng = StdRng::seed_from_u64(seed_for(location, WEATHER_SALT));
        let temperature = round1(rng.gen_range(15.0..35.0));
        let humidity = round1(rng.gen_range(30.0..90.0));
        let precipitation = round1(rng.gen_range(0.0..20.0));

        let forecast = self
            .start_date
            .iter_days()
            .take(FORECAST_DAYS)
            .map(|date| DailyForecast {
                day: date.format("%a %d %b").to_string(),
                temp: round1(temperature + rng.gen_range(-5.0..5.0)),
            })
            .collect();

        Ok(WeatherSnapshot {
            temperature,
            humidity,
            precipitation,
            forecast,
        })
    }

    fn name(&self) -> &str {
        "simulated-weather"
    }
}

/// Soil readings: pH 5.5-8.0, N/P/K 0-100, moisture 10-40
#[derive(Debug, Clone, Default)]
pub struct SimulatedSoilProvider {
    latency: Duration,
}

impl SimulatedSoilProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

#[async_trait]
impl SoilProvider for SimulatedSoilProvider {
    async fn get_soil(&self, location: Location) -> Result<SoilSnapshot, ProviderError> {
        simulate_latency(self.latency).await;

        let mut rng = StdRng::seed_from_u64(seed_for(location, SOIL_SALT));
        Ok(SoilSnapshot {
            ph: round1(rng.gen_range(5.5..8.0)),
            nitrogen: round1(rng.gen_range(0.0..100.0)),
            phosphorus: round1(rng.gen_range(0.0..100.0)),
            potassium: round1(rng.gen_range(0.0..100.0)),
            moisture: round1(rng.gen_range(10.0..40.0)),
        })
    }

    fn name(&self) -> &str {
        "simulated-soil"
    }
}

/// Rule-based stand-in for the inference service
#[derive(Debug, Clone, Default)]
pub struct SimulatedRecommendationProvider {
    latency: Duration,
}

impl SimulatedRecommendationProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

/// Temperature and pH windows in which a crop does well
fn suits(crop: CropType, temperature: f64, ph: f64, weather: &WeatherSnapshot) -> bool {
    let (t_min, t_max, ph_min, ph_max) = match crop {
        CropType::Wheat => (10.0, 25.0, 6.0, 7.5),
        CropType::Rice => (20.0, 35.0, 5.5, 7.0),
        CropType::Corn => (18.0, 32.0, 5.8, 7.0),
        CropType::Soybean => (20.0, 30.0, 6.0, 7.0),
        CropType::Cotton => (21.0, 35.0, 5.8, 8.0),
        CropType::Potato => (15.0, 24.0, 5.0, 6.5),
    };
    // rice also needs standing water
    let wet_enough = crop != CropType::Rice || weather.humidity >= 60.0 || weather.precipitation >= 5.0;
    (t_min..=t_max).contains(&temperature) && (ph_min..=ph_max).contains(&ph) && wet_enough
}

/// Dosage in kg/ha covering the crop's nitrogen gap plus P and K top-up
fn fertilizer_amount(soil: &SoilSnapshot, crop_type: CropType) -> f64 {
    let nitrogen_gap = (crop_type.nitrogen_demand() - soil.nitrogen).max(0.0);
    let phosphorus_gap = (40.0 - soil.phosphorus).max(0.0);
    let potassium_gap = (40.0 - soil.potassium).max(0.0);
    (nitrogen_gap + 0.5 * phosphorus_gap + 0.5 * potassium_gap).round()
}

fn predicted_yield(soil: &SoilSnapshot, weather: &WeatherSnapshot, crop_type: CropType) -> f64 {
    let temperature = weather.mean_forecast_temperature();
    let temperature_factor = (1.0 - ((temperature - 24.0).abs() / 30.0)).clamp(0.3, 1.0);
    let moisture_factor = (soil.moisture / 30.0).clamp(0.4, 1.0);
    let nutrient_factor = (0.6 + soil.npk_total() / 500.0).min(1.0);
    let ph_factor = if (5.5..=7.5).contains(&soil.ph) { 1.0 } else { 0.8 };
    (crop_type.base_yield() * temperature_factor * moisture_factor * nutrient_factor * ph_factor).round()
}

#[async_trait]
impl RecommendationProvider for SimulatedRecommendationProvider {
    async fn get_recommendation(
        &self,
        soil: &SoilSnapshot,
        weather: &WeatherSnapshot,
        crop_type: CropType,
    ) -> Result<Recommendation, ProviderError> {
        simulate_latency(self.latency).await;

        let crop_suggestions = CropType::ALL
            .into_iter()
            .filter(|crop| suits(*crop, weather.temperature, soil.ph, weather))
            .map(|crop| crop.to_string())
            .collect();

        Ok(Recommendation {
            fertilizer_advice: FertilizerAdvice::new(fertilizer_amount(soil, crop_type), "kg NPK/ha"),
            crop_suggestions,
            yield_prediction: predicted_yield(soil, weather, crop_type),
        })
    }

    fn name(&self) -> &str {
        "simulated-recommendation"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 6).unwrap()
    }

    #[tokio::test]
    async fn test_weather_is_deterministic_per_location() {
        let provider = SimulatedWeatherProvider::new().with_start_date(start_date());
        let here = Location::new(37.77, -122.42);

        let first = provider.get_weather(here).await.unwrap();
        let second = provider.get_weather(here).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.forecast.len(), FORECAST_DAYS);
        assert_eq!(first.forecast[0].day, "Mon 06 Oct");
        assert!((15.0..35.0).contains(&first.temperature));
    }

    #[tokio::test]
    async fn test_weather_differs_between_locations() {
        let provider = SimulatedWeatherProvider::new().with_start_date(start_date());
        let a = provider.get_weather(Location::new(37.77, -122.42)).await.unwrap();
        let b = provider.get_weather(Location::new(18.79, 98.98)).await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_soil_ranges() {
        let provider = SimulatedSoilProvider::new();
        for (lat, lng) in [(37.77, -122.42), (18.79, 98.98), (-33.86, 151.2)] {
            let soil = provider.get_soil(Location::new(lat, lng)).await.unwrap();
            assert!(soil.is_physical());
            assert!((5.5..=8.0).contains(&soil.ph));
            assert!((10.0..=40.0).contains(&soil.moisture));
        }
    }

    #[tokio::test]
    async fn test_recommendation_rules() {
        let soil = SoilSnapshot {
            ph: 6.8,
            nitrogen: 40.0,
            phosphorus: 20.0,
            potassium: 30.0,
            moisture: 25.0,
        };
        let weather = WeatherSnapshot {
            temperature: 22.0,
            humidity: 50.0,
            precipitation: 0.0,
            forecast: vec![],
        };

        let rec = SimulatedRecommendationProvider::new()
            .get_recommendation(&soil, &weather, CropType::Wheat)
            .await
            .unwrap();

        // 80 nitrogen gap + 10 P + 5 K
        assert_eq!(rec.fertilizer_advice, FertilizerAdvice::new(95.0, "kg NPK/ha"));
        assert!(rec.crop_suggestions.contains(&"Wheat".to_string()));
        assert!(!rec.crop_suggestions.contains(&"Rice".to_string()));
        assert!(rec.yield_prediction > 0.0);
    }

    #[tokio::test]
    async fn test_no_suitable_crop_yields_empty_suggestions() {
        let soil = SoilSnapshot {
            ph: 4.0,
            nitrogen: 200.0,
            phosphorus: 80.0,
            potassium: 80.0,
            moisture: 30.0,
        };
        let weather = WeatherSnapshot {
            temperature: 45.0,
            humidity: 10.0,
            precipitation: 0.0,
            forecast: vec![],
        };

        let rec = SimulatedRecommendationProvider::new()
            .get_recommendation(&soil, &weather, CropType::Corn)
            .await
            .unwrap();
        assert!(rec.crop_suggestions.is_empty());
        assert_eq!(rec.fertilizer_advice.amount, 0.0);
    }
}
