use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::field;

use crate::{Cep, Location, PipelineError};

use super::{PostalProvider, traced, truncate_body};

pub const DEFAULT_BASE_URL: &str = "https://viacep.com.br/ws";

/// Postal-code lookup against ViaCEP (`GET {base}/{cep}/json/`).
#[derive(Debug, Clone)]
pub struct ViaCepProvider {
    base_url: String,
    http: Client,
}

impl ViaCepProvider {
    pub fn new(base_url: String, http: Client) -> Self {
        Self { base_url, http }
    }

    fn url_for(&self, cep: &Cep) -> String {
        format!("{}/{}/json/", self.base_url.trim_end_matches('/'), cep.digits())
    }

    async fn fetch(&self, url: &str) -> Result<Location, PipelineError> {
        let res = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| PipelineError::transport("Failed to send request to ViaCEP", e))?;

        let status = res.status();
        let body = res
            .bytes()
            .await
            .map_err(|e| PipelineError::transport("Failed to read ViaCEP response body", e))?;

        if !status.is_success() {
            tracing::debug!(
                %status,
                body = %truncate_body(&body),
                "ViaCEP returned non-success status"
            );
            return Err(PipelineError::CepNotFound);
        }

        let parsed: VcResponse = serde_json::from_slice(&body).map_err(|e| {
            tracing::debug!(
                error = %e,
                body = %truncate_body(&body),
                "Failed to parse ViaCEP JSON"
            );
            PipelineError::CepNotFound
        })?;

        if parsed.is_not_found() {
            return Err(PipelineError::CepNotFound);
        }

        match parsed.localidade {
            Some(city) if !city.trim().is_empty() => Ok(Location { city }),
            _ => Err(PipelineError::CepNotFound),
        }
    }
}

#[derive(Debug, Deserialize)]
struct VcResponse {
    #[serde(default)]
    erro: Option<serde_json::Value>,
    #[serde(default)]
    localidade: Option<String>,
}

impl VcResponse {
    // ViaCEP has sent both `"erro": true` and `"erro": "true"`.
    fn is_not_found(&self) -> bool {
        match &self.erro {
            Some(serde_json::Value::Bool(flag)) => *flag,
            Some(serde_json::Value::String(s)) => s.eq_ignore_ascii_case("true"),
            _ => false,
        }
    }
}

#[async_trait]
impl PostalProvider for ViaCepProvider {
    async fn lookup(&self, cep: &Cep) -> Result<Location, PipelineError> {
        let url = self.url_for(cep);
        let span = tracing::info_span!(
            "postal_lookup",
            cep = %cep,
            url = %url,
            city = field::Empty,
            duration_ms = field::Empty,
            error = field::Empty,
        );

        let location = traced(span.clone(), self.fetch(&url)).await?;
        span.record("city", location.city.as_str());
        Ok(location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_uses_digits_only() {
        let provider = ViaCepProvider::new("https://viacep.com.br/ws/".into(), Client::new());
        let cep = Cep::parse("01001-000").unwrap();
        assert_eq!(provider.url_for(&cep), "https://viacep.com.br/ws/01001000/json/");
    }

    #[test]
    fn not_found_marker_variants() {
        let bool_flag: VcResponse = serde_json::from_str(r#"{"erro": true}"#).unwrap();
        assert!(bool_flag.is_not_found());

        let string_flag: VcResponse = serde_json::from_str(r#"{"erro": "true"}"#).unwrap();
        assert!(string_flag.is_not_found());

        let ok: VcResponse =
            serde_json::from_str(r#"{"cep": "01001-000", "localidade": "São Paulo"}"#).unwrap();
        assert!(!ok.is_not_found());
        assert_eq!(ok.localidade.as_deref(), Some("São Paulo"));
    }
}
