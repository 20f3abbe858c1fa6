//! AI Recommendation Client
//!
//! Client for the hosted fertilizer/crop recommendation microservice.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use shared::{CropType, FertilizerAdvice, Recommendation, SoilSnapshot, WeatherSnapshot};

use super::{ProviderError, RecommendationProvider};

/// Client for the AI recommendation microservice
#[derive(Clone)]
pub struct AiRecommendationClient {
    api_endpoint: String,
    api_key: String,
    http_client: Client,
}

/// Request body sent to the recommendation API
#[derive(Debug, Serialize)]
pub struct RecommendRequest<'a> {
    pub soil: &'a SoilSnapshot,
    pub weather: &'a WeatherSnapshot,
    pub crop_type: CropType,
}

/// Fertilizer advice as returned by the API
///
/// Older deployments answer with a human-readable string such as
/// "96 kg NPK/ha"; newer ones send the structured form.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum AdviceField {
    Structured { amount: f64, unit: String },
    Text(String),
}

impl From<AdviceField> for FertilizerAdvice {
    fn from(field: AdviceField) -> Self {
        match field {
            AdviceField::Structured { amount, unit } => FertilizerAdvice::new(amount, unit),
            AdviceField::Text(text) => FertilizerAdvice::parse(&text),
        }
    }
}

/// Response from the recommendation API
#[derive(Debug, Deserialize)]
pub struct RecommendResponse {
    pub fertilizer_advice: AdviceField,
    #[serde(default)]
    pub crop_suggestions: Vec<String>,
    pub yield_prediction: f64,
}

impl From<RecommendResponse> for Recommendation {
    fn from(r: RecommendResponse) -> Self {
        Recommendation {
            fertilizer_advice: r.fertilizer_advice.into(),
            crop_suggestions: r.crop_suggestions,
            yield_prediction: r.yield_prediction,
        }
    }
}

impl AiRecommendationClient {
    /// Create a new AI recommendation client
    pub fn new(api_endpoint: String, api_key: String, timeout: Duration) -> Result<Self, ProviderError> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::NotConfigured(format!("recommendation HTTP client: {}", e)))?;

        Ok(Self {
            api_endpoint,
            api_key,
            http_client,
        })
    }
}

#[async_trait]
impl RecommendationProvider for AiRecommendationClient {
    async fn get_recommendation(
        &self,
        soil: &SoilSnapshot,
        weather: &WeatherSnapshot,
        crop_type: CropType,
    ) -> Result<Recommendation, ProviderError> {
        let request = RecommendRequest {
            soil,
            weather,
            crop_type,
        };

        let response = self
            .http_client
            .post(&self.api_endpoint)
            .header("x-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ProviderError::Unreachable(format!(
                "API returned {}: {}",
                status, body
            )));
        }

        let result: RecommendResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        Ok(result.into())
    }

    fn name(&self) -> &str {
        "ai-recommendation"
    }
}
