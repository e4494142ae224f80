#![allow(dead_code)]

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use axum::{body::Body, response::Response};
use cep_core::{
    Cep, Location, PipelineError, PostalProvider, ResolutionPipeline, WeatherProvider,
    WeatherReading,
};

#[derive(Debug)]
pub struct StubPostal {
    pub result: Result<Location, PipelineError>,
    pub calls: Arc<AtomicUsize>,
}

#[async_trait]
impl PostalProvider for StubPostal {
    async fn lookup(&self, _cep: &Cep) -> Result<Location, PipelineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

#[derive(Debug)]
pub struct StubWeather {
    pub result: Result<WeatherReading, PipelineError>,
    pub calls: Arc<AtomicUsize>,
}

#[async_trait]
impl WeatherProvider for StubWeather {
    async fn current(&self, _city: &str) -> Result<WeatherReading, PipelineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

pub struct Stubs {
    pub pipeline: Arc<ResolutionPipeline>,
    pub postal_calls: Arc<AtomicUsize>,
    pub weather_calls: Arc<AtomicUsize>,
}

pub fn stubs(
    postal: Result<Location, PipelineError>,
    weather: Result<WeatherReading, PipelineError>,
) -> Stubs {
    let postal_calls = Arc::new(AtomicUsize::new(0));
    let weather_calls = Arc::new(AtomicUsize::new(0));
    let pipeline = ResolutionPipeline::new(
        Box::new(StubPostal { result: postal, calls: postal_calls.clone() }),
        Box::new(StubWeather { result: weather, calls: weather_calls.clone() }),
    );
    Stubs { pipeline: Arc::new(pipeline), postal_calls, weather_calls }
}

pub fn sao_paulo_at_20() -> Stubs {
    stubs(
        Ok(Location { city: "São Paulo".into() }),
        Ok(WeatherReading { temp_c: 20.0 }),
    )
}

pub const SAO_PAULO_JSON: &str =
    r#"{"city":"São Paulo","temp_C":20.0,"temp_F":68.0,"temp_K":293.15}"#;

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    String::from_utf8(bytes.to_vec()).expect("body is not UTF-8")
}
