use serde::{Deserialize, Serialize};

/// Inbound body on both services: `{"cep": "..."}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CepRequest {
    pub cep: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub city: String,
}

/// Current temperature as reported by the weather provider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherReading {
    pub temp_c: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureResult {
    #[serde(rename = "temp_C")]
    pub temp_c: f64,
    #[serde(rename = "temp_F")]
    pub temp_f: f64,
    #[serde(rename = "temp_K")]
    pub temp_k: f64,
}

/// Terminal payload, serialized as `{"city", "temp_C", "temp_F", "temp_K"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedOutput {
    pub city: String,
    #[serde(flatten)]
    pub weather: TemperatureResult,
}
