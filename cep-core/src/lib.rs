//! Core library for CEP temperature lookup.
//!
//! This crate defines:
//! - CEP validation and temperature conversion
//! - Upstream providers (ViaCEP, WeatherAPI.com, OpenWeather)
//! - The resolver pipeline and the gateway forwarding logic
//! - Configuration, logging and trace propagation
//!
//! It is used by `cep-server`, which adapts it to HTTP.

pub mod cep;
pub mod config;
pub mod error;
pub mod gateway;
pub mod model;
pub mod pipeline;
pub mod provider;
pub mod telemetry;
pub mod temperature;

pub use cep::Cep;
pub use config::{Config, ProviderConfig};
pub use error::PipelineError;
pub use gateway::{ForwardingGateway, RelayedResponse};
pub use model::{CepRequest, Location, ResolvedOutput, TemperatureResult, WeatherReading};
pub use pipeline::ResolutionPipeline;
pub use provider::{PostalProvider, ProviderId, WeatherProvider};
pub use telemetry::{Telemetry, TracePropagation};
