//! Deterministic fixture providers for pipeline tests
//!
//! Weather and soil values are derived from the requested location, so a
//! committed snapshot always reveals which request produced it:
//! `weather.temperature == lat` and `soil.nitrogen == |lng|`.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use novafarm_backend::external::{
    ProviderError, Providers, RecommendationProvider, SoilProvider, WeatherProvider,
};
use novafarm_backend::services::{DashboardSnapshot, DashboardState, Orchestrator};
use shared::{
    CropType, DailyForecast, FarmParameters, FertilizerAdvice, Location, Recommendation,
    SoilSnapshot, WeatherSnapshot, FORECAST_DAYS,
};
use tokio::sync::Semaphore;
use uuid::Uuid;

/// Call counting, failure injection and per-location gating shared by all fixtures
#[derive(Default)]
pub struct Control {
    calls: AtomicUsize,
    failing: AtomicBool,
    hanging: AtomicBool,
    held: Mutex<Vec<(Location, Arc<Semaphore>)>>,
}

impl Control {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Make every subsequent call pend forever
    pub fn set_hanging(&self, hanging: bool) {
        self.hanging.store(hanging, Ordering::SeqCst);
    }

    /// Block calls for `location` until released
    pub fn hold(&self, location: Location) {
        self.held
            .lock()
            .unwrap()
            .push((location, Arc::new(Semaphore::new(0))));
    }

    pub fn release(&self, location: Location) {
        let held = self.held.lock().unwrap();
        for (_, gate) in held.iter().filter(|(l, _)| *l == location) {
            gate.add_permits(1);
        }
    }

    async fn enter(&self, location: Option<Location>) -> Result<(), ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let gate = {
            let held = self.held.lock().unwrap();
            held.iter()
                .find(|(l, _)| Some(*l) == location)
                .map(|(_, gate)| gate.clone())
        };
        if let Some(gate) = gate {
            let _permit = gate.acquire().await;
        }

        if self.hanging.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(ProviderError::Unreachable("fixture offline".to_string()));
        }
        Ok(())
    }
}

pub fn weather_for(location: Location) -> WeatherSnapshot {
    WeatherSnapshot {
        temperature: location.lat,
        humidity: 60.0,
        precipitation: 2.0,
        forecast: (0..FORECAST_DAYS)
            .map(|i| DailyForecast {
                day: format!("Day {}", i + 1),
                temp: location.lat,
            })
            .collect(),
    }
}

pub fn soil_for(location: Location) -> SoilSnapshot {
    SoilSnapshot {
        ph: 6.8,
        nitrogen: location.lng.abs(),
        phosphorus: 30.0,
        potassium: 35.0,
        moisture: 22.0,
    }
}

#[derive(Default)]
pub struct FixtureWeather {
    pub control: Control,
    overrides: Mutex<Vec<(Location, WeatherSnapshot)>>,
}

impl FixtureWeather {
    pub fn set(&self, location: Location, snapshot: WeatherSnapshot) {
        self.overrides.lock().unwrap().push((location, snapshot));
    }
}

#[async_trait]
impl WeatherProvider for FixtureWeather {
    async fn get_weather(&self, location: Location) -> Result<WeatherSnapshot, ProviderError> {
        self.control.enter(Some(location)).await?;
        let overridden = self
            .overrides
            .lock()
            .unwrap()
            .iter()
            .find(|(l, _)| *l == location)
            .map(|(_, snapshot)| snapshot.clone());
        Ok(overridden.unwrap_or_else(|| weather_for(location)))
    }

    fn name(&self) -> &str {
        "fixture-weather"
    }
}

#[derive(Default)]
pub struct FixtureSoil {
    pub control: Control,
}

#[async_trait]
impl SoilProvider for FixtureSoil {
    async fn get_soil(&self, location: Location) -> Result<SoilSnapshot, ProviderError> {
        self.control.enter(Some(location)).await?;
        Ok(soil_for(location))
    }

    fn name(&self) -> &str {
        "fixture-soil"
    }
}

/// Returns a configurable recommendation and records what it was asked for
pub struct FixtureRecommendation {
    pub control: Control,
    pub response: Mutex<Recommendation>,
    per_crop: Mutex<Vec<(CropType, Recommendation)>>,
    held_crops: Mutex<Vec<(CropType, Arc<Semaphore>)>>,
    requests: Mutex<Vec<(WeatherSnapshot, SoilSnapshot, CropType)>>,
}

impl Default for FixtureRecommendation {
    fn default() -> Self {
        Self {
            control: Control::default(),
            response: Mutex::new(Recommendation {
                fertilizer_advice: FertilizerAdvice::new(80.0, "kg NPK/ha"),
                crop_suggestions: vec!["Wheat".to_string(), "Corn".to_string()],
                yield_prediction: 6000.0,
            }),
            per_crop: Mutex::new(Vec::new()),
            held_crops: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
        }
    }
}

impl FixtureRecommendation {
    /// Answer requests for `crop_type` with `recommendation`
    pub fn set_for(&self, crop_type: CropType, recommendation: Recommendation) {
        self.per_crop.lock().unwrap().push((crop_type, recommendation));
    }

    /// Block requests for `crop_type` until released
    pub fn hold_crop(&self, crop_type: CropType) {
        self.held_crops
            .lock()
            .unwrap()
            .push((crop_type, Arc::new(Semaphore::new(0))));
    }

    pub fn release_crop(&self, crop_type: CropType) {
        let held = self.held_crops.lock().unwrap();
        for (_, gate) in held.iter().filter(|(c, _)| *c == crop_type) {
            gate.add_permits(1);
        }
    }

    pub fn requests(&self) -> Vec<(WeatherSnapshot, SoilSnapshot, CropType)> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> Option<(WeatherSnapshot, SoilSnapshot, CropType)> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl RecommendationProvider for FixtureRecommendation {
    async fn get_recommendation(
        &self,
        soil: &SoilSnapshot,
        weather: &WeatherSnapshot,
        crop_type: CropType,
    ) -> Result<Recommendation, ProviderError> {
        self.requests
            .lock()
            .unwrap()
            .push((weather.clone(), soil.clone(), crop_type));
        self.control.enter(None).await?;

        let gate = self
            .held_crops
            .lock()
            .unwrap()
            .iter()
            .find(|(c, _)| *c == crop_type)
            .map(|(_, gate)| gate.clone());
        if let Some(gate) = gate {
            let _permit = gate.acquire().await;
        }

        let specific = self
            .per_crop
            .lock()
            .unwrap()
            .iter()
            .find(|(c, _)| *c == crop_type)
            .map(|(_, recommendation)| recommendation.clone());
        Ok(specific.unwrap_or_else(|| self.response.lock().unwrap().clone()))
    }

    fn name(&self) -> &str {
        "fixture-recommendation"
    }
}

/// A full set of fixtures wired into an orchestrator
pub struct Harness {
    pub weather: Arc<FixtureWeather>,
    pub soil: Arc<FixtureSoil>,
    pub recommendation: Arc<FixtureRecommendation>,
    pub orchestrator: Orchestrator,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_crop(CropType::Wheat)
    }

    pub fn with_crop(crop_type: CropType) -> Self {
        let weather = Arc::new(FixtureWeather::default());
        let soil = Arc::new(FixtureSoil::default());
        let recommendation = Arc::new(FixtureRecommendation::default());
        let providers = Providers::new(weather.clone(), soil.clone(), recommendation.clone());
        let orchestrator =
            Orchestrator::with_providers(Uuid::new_v4(), &providers, crop_type, FarmParameters::default());

        Self {
            weather,
            soil,
            recommendation,
            orchestrator,
        }
    }

    pub fn providers(&self) -> Providers {
        Providers::new(
            self.weather.clone(),
            self.soil.clone(),
            self.recommendation.clone(),
        )
    }

    /// Wait for `Ready`, failing the test if it takes unreasonably long
    pub async fn ready(&self) -> DashboardSnapshot {
        tokio::time::timeout(Duration::from_secs(5), self.orchestrator.wait_until_ready())
            .await
            .expect("pipeline did not become ready")
    }

    /// Wait until the committed state satisfies `condition`
    pub async fn wait_for(&self, mut condition: impl FnMut(&DashboardState) -> bool) -> DashboardSnapshot {
        let mut rx = self.orchestrator.subscribe();
        let wait = async {
            let state = rx.wait_for(|state| condition(state)).await.expect("session dropped");
            DashboardSnapshot::from(&*state)
        };
        tokio::time::timeout(Duration::from_secs(5), wait)
            .await
            .expect("condition not reached")
    }
}
