//! Recommendation engine over the latest environment snapshots

use std::sync::Arc;

use shared::{CropType, PipelineError, Recommendation, SoilSnapshot, WeatherSnapshot};

use crate::external::RecommendationProvider;

/// Result of a successful recommendation call
#[derive(Debug, Clone, PartialEq)]
pub struct EngineOutput {
    pub recommendation: Recommendation,
    /// The provider returned no crop suggestions and the default set was used
    pub default_suggestions: bool,
}

#[derive(Clone)]
pub struct RecommendationEngine {
    provider: Arc<dyn RecommendationProvider>,
}

impl RecommendationEngine {
    pub fn new(provider: Arc<dyn RecommendationProvider>) -> Self {
        Self { provider }
    }

    pub async fn recommend(
        &self,
        weather: &WeatherSnapshot,
        soil: &SoilSnapshot,
        crop_type: CropType,
    ) -> Result<EngineOutput, PipelineError> {
        tracing::debug!(provider = self.provider.name(), %crop_type, "Requesting recommendation");

        let recommendation = self
            .provider
            .get_recommendation(soil, weather, crop_type)
            .await
            .map_err(|e| PipelineError::recommendation_failed(e.to_string()))?;

        if !recommendation.fertilizer_advice.amount.is_finite() {
            return Err(PipelineError::recommendation_failed(
                "fertilizer amount is not a finite number",
            ));
        }
        if !recommendation.yield_prediction.is_finite() {
            return Err(PipelineError::recommendation_failed(
                "yield prediction is not a finite number",
            ));
        }

        let (recommendation, default_suggestions) = recommendation.with_crop_suggestions_ensured();
        if default_suggestions {
            tracing::warn!(%crop_type, "Provider returned no crop suggestions, using defaults");
        }

        Ok(EngineOutput {
            recommendation,
            default_suggestions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::ProviderError;
    use async_trait::async_trait;
    use shared::{DailyForecast, FertilizerAdvice, DEFAULT_CROP_SUGGESTIONS};

    struct Fixed(Recommendation);

    #[async_trait]
    impl RecommendationProvider for Fixed {
        async fn get_recommendation(
            &self,
            _soil: &SoilSnapshot,
            _weather: &WeatherSnapshot,
            _crop_type: CropType,
        ) -> Result<Recommendation, ProviderError> {
            Ok(self.0.clone())
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    fn weather() -> WeatherSnapshot {
        WeatherSnapshot {
            temperature: 26.0,
            humidity: 55.0,
            precipitation: 1.0,
            forecast: (0..7)
                .map(|i| DailyForecast {
                    day: format!("Day {}", i + 1),
                    temp: 25.0,
                })
                .collect(),
        }
    }

    fn soil() -> SoilSnapshot {
        SoilSnapshot {
            ph: 6.8,
            nitrogen: 40.0,
            phosphorus: 30.0,
            potassium: 35.0,
            moisture: 22.0,
        }
    }

    fn recommendation(suggestions: &[&str], yield_prediction: f64) -> Recommendation {
        Recommendation {
            fertilizer_advice: FertilizerAdvice::new(80.0, "kg NPK/ha"),
            crop_suggestions: suggestions.iter().map(|s| s.to_string()).collect(),
            yield_prediction,
        }
    }

    #[tokio::test]
    async fn test_passes_through_recommendation() {
        let engine = RecommendationEngine::new(Arc::new(Fixed(recommendation(&["Wheat", "Corn"], 6000.0))));
        let output = engine.recommend(&weather(), &soil(), CropType::Wheat).await.unwrap();
        assert_eq!(output.recommendation, recommendation(&["Wheat", "Corn"], 6000.0));
        assert!(!output.default_suggestions);
    }

    #[tokio::test]
    async fn test_empty_suggestions_get_defaults() {
        let engine = RecommendationEngine::new(Arc::new(Fixed(recommendation(&[], 6000.0))));
        let output = engine.recommend(&weather(), &soil(), CropType::Corn).await.unwrap();
        assert!(output.default_suggestions);
        assert_eq!(output.recommendation.crop_suggestions, DEFAULT_CROP_SUGGESTIONS);
    }

    #[tokio::test]
    async fn test_non_finite_yield_is_a_failure() {
        let engine = RecommendationEngine::new(Arc::new(Fixed(recommendation(&["Rice"], f64::NAN))));
        let err = engine.recommend(&weather(), &soil(), CropType::Rice).await.unwrap_err();
        assert!(matches!(err, PipelineError::RecommendationFailed { .. }));
    }
}
