use crate::{
    Cep, CepRequest, Config, PipelineError, ResolvedOutput,
    provider::{self, PostalProvider, WeatherProvider},
    temperature,
};

/// Backend orchestration: CEP → city → current temperature.
///
/// Steps run strictly in order and the first failure ends the request.
#[derive(Debug)]
pub struct ResolutionPipeline {
    postal: Box<dyn PostalProvider>,
    weather: Box<dyn WeatherProvider>,
}

impl ResolutionPipeline {
    pub fn new(postal: Box<dyn PostalProvider>, weather: Box<dyn WeatherProvider>) -> Self {
        Self { postal, weather }
    }

    /// Wire ViaCEP and the default weather provider over one shared client.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let http = provider::http_client(config.http.timeout())?;
        let postal = provider::postal_provider_from_config(config, http.clone());
        let weather = provider::default_weather_provider_from_config(config, http)?;
        Ok(Self::new(postal, weather))
    }

    pub async fn handle(&self, request: &CepRequest) -> Result<ResolvedOutput, PipelineError> {
        self.resolve(&request.cep).await
    }

    /// Validates on its own: the resolver may be called without the gateway in front.
    pub async fn resolve(&self, raw_cep: &str) -> Result<ResolvedOutput, PipelineError> {
        let cep = Cep::parse(raw_cep)?;

        let location = self.postal.lookup(&cep).await?;
        tracing::debug!(%cep, city = %location.city, "CEP resolved");

        let reading = self.weather.current(&location.city).await?;

        Ok(ResolvedOutput {
            city: location.city,
            weather: temperature::convert(reading.temp_c),
        })
    }
}
