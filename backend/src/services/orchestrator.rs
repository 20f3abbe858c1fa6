//! Dashboard orchestration
//!
//! Owns the committed state of one dashboard session and drives the
//! resolve → fetch → recommend pipeline. Every cycle carries the request
//! token that was current when it started; results whose token no longer
//! matches are dropped on arrival, so a slow response for an earlier
//! location can never overwrite a newer one.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use shared::{
    apply_parameters, derive_metrics, validate_location, Advisory, AdvisoryKind, CropType,
    DerivedMetrics, FarmParameters, FarmParametersInput, Location, LocationInput, Panel,
    PanelStatus, PipelineError, PipelineStatus, Recommendation, SoilSnapshot, WeatherSnapshot,
};
use tokio::sync::watch;
use uuid::Uuid;

use crate::external::Providers;

use super::environment::EnvironmentFetcher;
use super::location::LocationResolver;
use super::recommendation::{EngineOutput, RecommendationEngine};

/// The single committed state record of a session
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardState {
    pub session_id: Uuid,
    pub status: PipelineStatus,
    pub location: Option<Location>,
    pub crop_type: CropType,
    pub parameters: FarmParameters,
    pub weather: Panel<WeatherSnapshot>,
    pub soil: Panel<SoilSnapshot>,
    pub recommendation: Panel<Recommendation>,
    /// Crop the held recommendation was produced for
    pub recommended_crop: Option<CropType>,
    pub last_error: Option<PipelineError>,
    pub advisories: Vec<Advisory>,
    pub token: u64,
    pub discarded_results: u64,
}

impl DashboardState {
    fn new(session_id: Uuid, crop_type: CropType, parameters: FarmParameters) -> Self {
        Self {
            session_id,
            status: PipelineStatus::Idle,
            location: None,
            crop_type,
            parameters,
            weather: Panel::default(),
            soil: Panel::default(),
            recommendation: Panel::default(),
            recommended_crop: None,
            last_error: None,
            advisories: Vec::new(),
            token: 0,
            discarded_results: 0,
        }
    }

    /// Record a pipeline failure as `last_error` plus an advisory
    fn record_error(&mut self, error: PipelineError, advisory: AdvisoryKind) {
        tracing::warn!(session_id = %self.session_id, error = %error, "Pipeline error");
        let message = match advisory {
            AdvisoryKind::StaleData => format!("{}; showing last known data", error),
            _ => error.to_string(),
        };
        self.advisories.push(Advisory::new(advisory, message));
        self.last_error = Some(error);
    }

    fn all_fresh(&self) -> bool {
        self.weather.status == PanelStatus::Fresh
            && self.soil.status == PanelStatus::Fresh
            && self.recommendation.status == PanelStatus::Fresh
    }

    /// Inputs for a recommendation, if both snapshots belong to the current location
    fn recommendation_inputs(&self) -> Option<RecommendationInputs> {
        let location = self.location?;
        if !self.weather.is_for(&location) || !self.soil.is_for(&location) {
            return None;
        }
        Some(RecommendationInputs {
            location,
            weather: self.weather.value.clone()?,
            soil: self.soil.value.clone()?,
            crop_type: self.crop_type,
        })
    }

    fn derived_metrics(&self) -> Option<DerivedMetrics> {
        self.recommendation
            .value
            .as_ref()
            .map(|recommendation| derive_metrics(recommendation, &self.parameters))
    }
}

/// Read-only view handed to rendering collaborators
///
/// Derived metrics are recomputed from the current recommendation and
/// parameters every time a snapshot is taken.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardSnapshot {
    pub session_id: Uuid,
    pub status: PipelineStatus,
    pub location: Option<Location>,
    pub crop_type: CropType,
    pub parameters: FarmParameters,
    pub weather: Panel<WeatherSnapshot>,
    pub soil: Panel<SoilSnapshot>,
    pub recommendation: Panel<Recommendation>,
    /// Crop the shown recommendation was produced for; differs from
    /// `crop_type` while a recommendation for a newly selected crop is pending
    pub recommended_crop: Option<CropType>,
    pub derived_metrics: Option<DerivedMetrics>,
    pub last_error: Option<PipelineError>,
    pub advisories: Vec<Advisory>,
    pub token: u64,
    pub discarded_results: u64,
}

impl From<&DashboardState> for DashboardSnapshot {
    fn from(state: &DashboardState) -> Self {
        Self {
            session_id: state.session_id,
            status: state.status,
            location: state.location,
            crop_type: state.crop_type,
            parameters: state.parameters,
            weather: state.weather.clone(),
            soil: state.soil.clone(),
            recommendation: state.recommendation.clone(),
            recommended_crop: state.recommended_crop,
            derived_metrics: state.derived_metrics(),
            last_error: state.last_error.clone(),
            advisories: state.advisories.clone(),
            token: state.token,
            discarded_results: state.discarded_results,
        }
    }
}

#[derive(Debug, Clone)]
struct RecommendationInputs {
    location: Location,
    weather: WeatherSnapshot,
    soil: SoilSnapshot,
    crop_type: CropType,
}

/// Errors that a successful cycle supersedes
fn clears_on_success(error: &PipelineError) -> bool {
    matches!(
        error,
        PipelineError::FetchFailed { .. } | PipelineError::RecommendationFailed { .. }
    )
}

struct Inner {
    fetcher: EnvironmentFetcher,
    engine: RecommendationEngine,
    state: watch::Sender<DashboardState>,
}

/// Controller for one dashboard session
///
/// Cheap to clone; clones share the same state. The controller is the only
/// writer of the state record.
#[derive(Clone)]
pub struct Orchestrator {
    inner: Arc<Inner>,
}

impl Orchestrator {
    pub fn new(
        session_id: Uuid,
        crop_type: CropType,
        parameters: FarmParameters,
        fetcher: EnvironmentFetcher,
        engine: RecommendationEngine,
    ) -> Self {
        let (state, _) = watch::channel(DashboardState::new(session_id, crop_type, parameters));
        Self {
            inner: Arc::new(Inner {
                fetcher,
                engine,
                state,
            }),
        }
    }

    pub fn with_providers(
        session_id: Uuid,
        providers: &Providers,
        crop_type: CropType,
        parameters: FarmParameters,
    ) -> Self {
        Self::new(
            session_id,
            crop_type,
            parameters,
            EnvironmentFetcher::new(providers.weather.clone(), providers.soil.clone()),
            RecommendationEngine::new(providers.recommendation.clone()),
        )
    }

    pub fn session_id(&self) -> Uuid {
        self.inner.state.borrow().session_id
    }

    /// Receiver notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.inner.state.subscribe()
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot::from(&*self.inner.state.borrow())
    }

    /// Wait until the pipeline reaches `Ready` and return that snapshot
    pub async fn wait_until_ready(&self) -> DashboardSnapshot {
        let mut rx = self.subscribe();
        let ready = rx
            .wait_for(|state| state.status == PipelineStatus::Ready)
            .await
            .map(|state| DashboardSnapshot::from(&*state));
        match ready {
            Ok(snapshot) => snapshot,
            Err(_) => self.snapshot(),
        }
    }

    /// Resolve the startup location and kick off the first fetch cycle
    ///
    /// A manual location committed while resolution is pending wins over the
    /// resolved one.
    pub async fn start(&self, resolver: &LocationResolver) -> u64 {
        let mut token = 0;
        self.inner.state.send_modify(|state| {
            state.token += 1;
            state.status = PipelineStatus::Resolving;
            token = state.token;
        });
        tracing::info!(session_id = %self.session_id(), "Resolving location");

        let resolution = resolver.resolve().await;

        let applied = self.apply(token, "location", |state| {
            if let Some(reason) = resolution.failure {
                state.record_error(
                    PipelineError::LocationUnavailable { reason },
                    AdvisoryKind::DefaultLocation,
                );
            }
        });
        if !applied {
            return self.inner.state.borrow().token;
        }

        self.begin_fetch(resolution.location)
    }

    /// Manual location override (map click)
    pub fn change_location(&self, input: LocationInput) -> Result<u64, PipelineError> {
        let location = self.validated(validate_location(&input))?;

        self.inner.state.send_modify(|state| {
            if matches!(state.last_error, Some(PipelineError::LocationUnavailable { .. })) {
                state.last_error = None;
            }
        });
        Ok(self.begin_fetch(location))
    }

    /// Re-fetch everything for the current location
    pub fn refresh(&self) -> Option<u64> {
        let location = self.inner.state.borrow().location?;
        Some(self.begin_fetch(location))
    }

    /// Select a crop type
    ///
    /// When both snapshots for the current location are available the
    /// recommendation is recomputed without re-fetching the environment, and
    /// the new token is returned. While a fetch is running the crop is only
    /// recorded; that cycle uses it once it reaches the recommendation step.
    pub fn change_crop(&self, crop_type: CropType) -> Option<u64> {
        let mut started = None;
        self.inner.state.send_if_modified(|state| {
            if state.crop_type == crop_type {
                return false;
            }
            state.crop_type = crop_type;
            tracing::info!(session_id = %state.session_id, %crop_type, "Crop type changed");

            if !matches!(state.status, PipelineStatus::Ready | PipelineStatus::Recommending) {
                return true;
            }
            if let Some(inputs) = state.recommendation_inputs() {
                state.token += 1;
                state.status = PipelineStatus::Recommending;
                state.recommendation.mark_loading();
                started = Some((state.token, inputs));
            }
            true
        });

        let (token, inputs) = started?;
        let this = self.clone();
        tokio::spawn(async move { this.run_recommendation(token, inputs).await });
        Some(token)
    }

    /// Commit a partial parameter update; invalid input leaves parameters unchanged
    pub fn update_parameters(&self, input: FarmParametersInput) -> Result<FarmParameters, PipelineError> {
        let current = self.inner.state.borrow().parameters;
        let parameters = self.validated(apply_parameters(&current, &input))?;

        self.inner.state.send_modify(|state| state.parameters = parameters);
        Ok(parameters)
    }

    /// Derived metrics for ad-hoc parameters, without committing them
    pub fn preview_metrics(
        &self,
        input: FarmParametersInput,
    ) -> Result<Option<DerivedMetrics>, PipelineError> {
        let state = self.inner.state.borrow();
        let parameters = apply_parameters(&state.parameters, &input)?;
        Ok(state
            .recommendation
            .value
            .as_ref()
            .map(|recommendation| derive_metrics(recommendation, &parameters)))
    }

    /// Drain pending advisories
    pub fn acknowledge_advisories(&self) -> Vec<Advisory> {
        let mut drained = Vec::new();
        self.inner.state.send_if_modified(|state| {
            drained = std::mem::take(&mut state.advisories);
            !drained.is_empty()
        });
        drained
    }

    /// Tear the session down; in-flight results are discarded on arrival
    pub fn close(&self) {
        self.inner.state.send_modify(|state| {
            state.token += 1;
            state.status = PipelineStatus::Idle;
        });
        tracing::info!(session_id = %self.session_id(), "Session closed");
    }

    /// Map an input error into `last_error` plus a rejected-input advisory
    fn validated<T>(&self, result: Result<T, shared::InputError>) -> Result<T, PipelineError> {
        result.map_err(|e| {
            let error = PipelineError::from(e);
            self.inner
                .state
                .send_modify(|state| state.record_error(error.clone(), AdvisoryKind::RejectedInput));
            error
        })
    }

    /// Run `f` against the state only if `token` is still current
    fn apply(&self, token: u64, what: &str, f: impl FnOnce(&mut DashboardState)) -> bool {
        let mut applied = false;
        self.inner.state.send_modify(|state| {
            if state.token == token {
                f(state);
                applied = true;
            } else {
                state.discarded_results += 1;
                tracing::debug!(
                    session_id = %state.session_id,
                    token,
                    current = state.token,
                    what,
                    "Discarding superseded result"
                );
            }
        });
        applied
    }

    fn begin_fetch(&self, location: Location) -> u64 {
        let mut token = 0;
        self.inner.state.send_modify(|state| {
            state.token += 1;
            state.location = Some(location);
            state.status = PipelineStatus::Fetching;
            state.weather.mark_loading();
            state.soil.mark_loading();
            state.recommendation.mark_loading();
            token = state.token;
        });
        tracing::info!(session_id = %self.session_id(), token, %location, "Fetching environment data");

        let this = self.clone();
        tokio::spawn(async move { this.run_fetch_cycle(token, location).await });
        token
    }

    async fn run_fetch_cycle(&self, token: u64, location: Location) {
        let fetcher = &self.inner.fetcher;

        let weather = async {
            let result = fetcher.fetch_weather(location).await;
            self.apply(token, "weather", |state| match result {
                Ok(snapshot) => state.weather.commit(snapshot, location),
                Err(error) => {
                    state.weather.mark_stale();
                    state.record_error(error, AdvisoryKind::StaleData);
                }
            })
        };
        let soil = async {
            let result = fetcher.fetch_soil(location).await;
            self.apply(token, "soil", |state| match result {
                Ok(snapshot) => state.soil.commit(snapshot, location),
                Err(error) => {
                    state.soil.mark_stale();
                    state.record_error(error, AdvisoryKind::StaleData);
                }
            })
        };

        let (weather_applied, soil_applied) = tokio::join!(weather, soil);
        if !weather_applied || !soil_applied {
            return;
        }

        let mut inputs = None;
        self.apply(token, "environment", |state| {
            match state.recommendation_inputs() {
                Some(ready) => {
                    state.status = PipelineStatus::Recommending;
                    inputs = Some(ready);
                }
                None => {
                    // no usable pair for this location, keep the old recommendation
                    state.recommendation.mark_stale();
                    state.status = PipelineStatus::Ready;
                    tracing::info!(session_id = %state.session_id, token, "Skipping recommendation");
                }
            }
        });

        if let Some(inputs) = inputs {
            self.run_recommendation(token, inputs).await;
        }
    }

    async fn run_recommendation(&self, token: u64, inputs: RecommendationInputs) {
        let result = self
            .inner
            .engine
            .recommend(&inputs.weather, &inputs.soil, inputs.crop_type)
            .await;

        self.apply(token, "recommendation", |state| {
            match result {
                Ok(EngineOutput {
                    recommendation,
                    default_suggestions,
                }) => {
                    state.recommendation.commit(recommendation, inputs.location);
                    state.recommended_crop = Some(inputs.crop_type);
                    if default_suggestions {
                        state.advisories.push(Advisory::new(
                            AdvisoryKind::DefaultCropSuggestions,
                            "No crop suggestions were available, showing defaults",
                        ));
                    }
                }
                Err(error) => {
                    state.recommendation.mark_stale();
                    state.record_error(error, AdvisoryKind::StaleData);
                }
            }

            if state.all_fresh() && state.last_error.as_ref().is_some_and(clears_on_success) {
                state.last_error = None;
            }
            state.status = PipelineStatus::Ready;
            tracing::info!(session_id = %state.session_id, token, "Dashboard ready");
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{DailyForecast, FertilizerAdvice};

    fn orchestrator() -> Orchestrator {
        Orchestrator::with_providers(
            Uuid::new_v4(),
            &Providers::simulated(),
            CropType::Wheat,
            FarmParameters::default(),
        )
    }

    #[test]
    fn test_snapshot_derives_metrics_on_read() {
        let mut state = DashboardState::new(Uuid::nil(), CropType::Wheat, FarmParameters::default());
        assert!(DashboardSnapshot::from(&state).derived_metrics.is_none());

        state.recommendation.commit(
            Recommendation {
                fertilizer_advice: FertilizerAdvice::new(80.0, "kg NPK/ha"),
                crop_suggestions: vec!["Wheat".into()],
                yield_prediction: 6000.0,
            },
            Location::default(),
        );
        state.parameters.area_hectares = 2.5;
        state.parameters.irrigation_efficiency_pct = 80.0;

        let metrics = DashboardSnapshot::from(&state).derived_metrics.unwrap();
        assert_eq!(metrics.fertilizer_plan.total_kg, 200.0);
        assert_eq!(metrics.yield_estimate.adjusted_yield, 4800.0);
    }

    #[test]
    fn test_snapshot_reports_crop_behind_recommendation() {
        let mut state = DashboardState::new(Uuid::nil(), CropType::Wheat, FarmParameters::default());
        assert_eq!(DashboardSnapshot::from(&state).recommended_crop, None);

        state.recommended_crop = Some(CropType::Wheat);
        state.crop_type = CropType::Rice;

        let snapshot = DashboardSnapshot::from(&state);
        assert_eq!(snapshot.crop_type, CropType::Rice);
        assert_eq!(snapshot.recommended_crop, Some(CropType::Wheat));
    }

    #[test]
    fn test_recommendation_inputs_require_current_location() {
        let mut state = DashboardState::new(Uuid::nil(), CropType::Corn, FarmParameters::default());
        let here = Location::new(10.0, 20.0);
        let there = Location::new(-10.0, -20.0);
        state.location = Some(here);
        state.weather.commit(
            WeatherSnapshot {
                temperature: 20.0,
                humidity: 50.0,
                precipitation: 0.0,
                forecast: vec![DailyForecast { day: "Mon".into(), temp: 20.0 }; 7],
            },
            here,
        );
        state.soil.commit(
            SoilSnapshot {
                ph: 6.5,
                nitrogen: 10.0,
                phosphorus: 10.0,
                potassium: 10.0,
                moisture: 20.0,
            },
            there,
        );
        assert!(state.recommendation_inputs().is_none());

        state.location = Some(there);
        assert!(state.recommendation_inputs().is_none());
    }

    #[tokio::test]
    async fn test_stale_token_is_discarded() {
        let orchestrator = orchestrator();
        orchestrator.inner.state.send_modify(|state| state.token = 5);

        assert!(!orchestrator.apply(4, "weather", |state| state.status = PipelineStatus::Ready));
        assert!(orchestrator.apply(5, "weather", |state| state.status = PipelineStatus::Fetching));

        let snapshot = orchestrator.snapshot();
        assert_eq!(snapshot.discarded_results, 1);
        assert_eq!(snapshot.status, PipelineStatus::Fetching);
    }

    #[tokio::test]
    async fn test_invalid_parameters_are_recorded() {
        let orchestrator = orchestrator();
        let err = orchestrator
            .update_parameters(FarmParametersInput {
                area_hectares: Some(-1.0),
                ..Default::default()
            })
            .unwrap_err();

        let snapshot = orchestrator.snapshot();
        assert_eq!(snapshot.last_error, Some(err));
        assert_eq!(snapshot.parameters, FarmParameters::default());
        assert_eq!(snapshot.advisories[0].kind, AdvisoryKind::RejectedInput);
    }
}
