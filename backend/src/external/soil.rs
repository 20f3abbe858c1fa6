//! Soil data service client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use shared::{Location, SoilSnapshot};

use super::{ProviderError, SoilProvider};

/// Client for a JSON soil-analysis service
///
/// `GET {endpoint}?lat=..&lng=..` returns a `SoilSnapshot` document.
#[derive(Clone)]
pub struct SoilClient {
    endpoint: String,
    http_client: Client,
}

impl SoilClient {
    pub fn new(endpoint: String, timeout: Duration) -> Result<Self, ProviderError> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::NotConfigured(format!("soil HTTP client: {}", e)))?;

        Ok(Self {
            endpoint,
            http_client,
        })
    }
}

#[async_trait]
impl SoilProvider for SoilClient {
    async fn get_soil(&self, location: Location) -> Result<SoilSnapshot, ProviderError> {
        let response = self
            .http_client
            .get(&self.endpoint)
            .query(&[("lat", location.lat), ("lng", location.lng)])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ProviderError::Unreachable(format!(
                "Soil API returned {}: {}",
                status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("soil response: {}", e)))
    }

    fn name(&self) -> &str {
        "soil-service"
    }
}
