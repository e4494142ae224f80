use async_trait::async_trait;
use reqwest::Client;
use tracing::field;

use crate::{PipelineError, WeatherReading};

use super::{WeatherProvider, traced, truncate_body};

pub const DEFAULT_BASE_URL: &str = "https://api.weatherapi.com";

#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl WeatherApiProvider {
    pub fn new(api_key: String, base_url: String, http: Client) -> Self {
        Self { api_key, base_url, http }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/current.json", self.base_url.trim_end_matches('/'))
    }

    async fn fetch_current(&self, url: &str, city: &str) -> Result<WeatherReading, PipelineError> {
        // `query` percent-encodes the city name.
        let res = self
            .http
            .get(url)
            .query(&[("key", self.api_key.as_str()), ("q", city)])
            .send()
            .await
            .map_err(|e| PipelineError::transport("Failed to send request to WeatherAPI.com", e))?;

        let status = res.status();
        let body = res
            .bytes()
            .await
            .map_err(|e| PipelineError::transport("Failed to read WeatherAPI response body", e))?;

        if !status.is_success() {
            tracing::debug!(
                %status,
                body = %truncate_body(&body),
                "WeatherAPI current request failed"
            );
            return Err(PipelineError::WeatherUnavailable);
        }

        let parsed: serde_json::Value = serde_json::from_slice(&body).map_err(|e| {
            tracing::debug!(error = %e, "Failed to parse WeatherAPI current JSON");
            PipelineError::WeatherUnavailable
        })?;

        parsed
            .pointer("/current/temp_c")
            .and_then(serde_json::Value::as_f64)
            .map(|temp_c| WeatherReading { temp_c })
            .ok_or_else(|| {
                tracing::debug!(
                    body = %truncate_body(&body),
                    "WeatherAPI response has no current.temp_c"
                );
                PipelineError::WeatherUnavailable
            })
    }
}

#[async_trait]
impl WeatherProvider for WeatherApiProvider {
    async fn current(&self, city: &str) -> Result<WeatherReading, PipelineError> {
        let url = self.endpoint();
        let span = tracing::info_span!(
            "weather_lookup",
            provider = "weatherapi",
            city = %city,
            url = %url,
            duration_ms = field::Empty,
            error = field::Empty,
        );

        traced(span, self.fetch_current(&url, city)).await
    }
}
