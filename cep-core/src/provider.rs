use crate::{
    Cep, Config, Location, PipelineError, WeatherReading,
    provider::{
        openweather::OpenWeatherProvider, viacep::ViaCepProvider, weatherapi::WeatherApiProvider,
    },
};
use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use std::{convert::TryFrom, fmt::Debug, future::Future, time::Duration, time::Instant};
use tracing::{Instrument, Span};

pub mod openweather;
pub mod viacep;
pub mod weatherapi;

const USER_AGENT: &str = concat!("cep-weather/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    OpenWeather,
    WeatherApi,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenWeather => "openweather",
            ProviderId::WeatherApi => "weatherapi",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::OpenWeather, ProviderId::WeatherApi]
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "openweather" => Ok(ProviderId::OpenWeather),
            "weatherapi" => Ok(ProviderId::WeatherApi),
            _ => Err(anyhow::anyhow!(
                "Unknown provider '{value}'. Supported providers: openweather, weatherapi."
            )),
        }
    }
}

/// Resolves a CEP to the locality it belongs to.
#[async_trait]
pub trait PostalProvider: Send + Sync + Debug {
    async fn lookup(&self, cep: &Cep) -> Result<Location, PipelineError>;
}

/// Reads the current temperature for a city name.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current(&self, city: &str) -> Result<WeatherReading, PipelineError>;
}

/// Shared outbound client: fixed per-request timeout, default certificate
/// validation.
pub fn http_client(timeout: Duration) -> anyhow::Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .context("Failed to build outbound HTTP client")
}

/// Construct the postal-code provider from config.
pub fn postal_provider_from_config(config: &Config, http: Client) -> Box<dyn PostalProvider> {
    Box::new(ViaCepProvider::new(config.postal.base_url.clone(), http))
}

/// Construct a weather provider from config and explicit ProviderId.
pub fn weather_provider_from_config(
    id: ProviderId,
    config: &Config,
    http: Client,
) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let api_key = config.provider_api_key(id).ok_or_else(|| {
        anyhow::anyhow!(
            "No API key configured for provider '{id}'.\n\
                 Hint: run `cep-weather configure {id}` or set WEATHER_API_KEY."
        )
    })?;
    let base_url = config.provider_config(id).and_then(|p| p.base_url.clone());

    let boxed: Box<dyn WeatherProvider> = match id {
        ProviderId::OpenWeather => Box::new(OpenWeatherProvider::new(
            api_key.to_owned(),
            base_url.unwrap_or_else(|| openweather::DEFAULT_BASE_URL.to_owned()),
            http,
        )),
        ProviderId::WeatherApi => Box::new(WeatherApiProvider::new(
            api_key.to_owned(),
            base_url.unwrap_or_else(|| weatherapi::DEFAULT_BASE_URL.to_owned()),
            http,
        )),
    };

    Ok(boxed)
}

/// Construct the default weather provider from config, using `default_provider` field.
pub fn default_weather_provider_from_config(
    config: &Config,
    http: Client,
) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let id = config.default_provider_id()?;
    weather_provider_from_config(id, config, http)
}

/// Run one outbound call inside `span`, recording its duration and outcome.
pub(crate) async fn traced<T, F>(span: Span, call: F) -> Result<T, PipelineError>
where
    F: Future<Output = Result<T, PipelineError>>,
{
    let started = Instant::now();
    let result = call.instrument(span.clone()).await;
    span.record("duration_ms", started.elapsed().as_millis() as u64);
    if let Err(err) = &result {
        span.record("error", tracing::field::display(err));
    }
    result
}

pub(crate) fn truncate_body(body: &[u8]) -> String {
    const MAX: usize = 200;
    let text = String::from_utf8_lossy(body);
    match text.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.into_owned(),
    }
}
