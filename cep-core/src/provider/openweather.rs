use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::field;

use crate::{PipelineError, WeatherReading};

use super::{WeatherProvider, traced, truncate_body};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String, base_url: String, http: Client) -> Self {
        Self { api_key, base_url, http }
    }

    fn endpoint(&self) -> String {
        format!("{}/data/2.5/weather", self.base_url.trim_end_matches('/'))
    }

    async fn fetch_current(&self, url: &str, city: &str) -> Result<WeatherReading, PipelineError> {
        let res = self
            .http
            .get(url)
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await
            .map_err(|e| PipelineError::transport("Failed to send request to OpenWeather", e))?;

        let status = res.status();
        let body = res
            .bytes()
            .await
            .map_err(|e| PipelineError::transport("Failed to read OpenWeather response body", e))?;

        if !status.is_success() {
            tracing::debug!(
                %status,
                body = %truncate_body(&body),
                "OpenWeather current request failed"
            );
            return Err(PipelineError::WeatherUnavailable);
        }

        let parsed: OwCurrentResponse = serde_json::from_slice(&body).map_err(|e| {
            tracing::debug!(
                error = %e,
                body = %truncate_body(&body),
                "Failed to parse OpenWeather current JSON"
            );
            PipelineError::WeatherUnavailable
        })?;

        Ok(WeatherReading { temp_c: parsed.main.temp })
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    main: OwMain,
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current(&self, city: &str) -> Result<WeatherReading, PipelineError> {
        let url = self.endpoint();
        let span = tracing::info_span!(
            "weather_lookup",
            provider = "openweather",
            city = %city,
            url = %url,
            duration_ms = field::Empty,
            error = field::Empty,
        );

        traced(span, self.fetch_current(&url, city)).await
    }
}
