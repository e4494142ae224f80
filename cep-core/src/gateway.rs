use bytes::Bytes;
use http::{HeaderMap, HeaderValue, StatusCode, header};
use reqwest::Client;
use tracing::field;

use crate::{
    CepRequest, Config, PipelineError, cep,
    provider::{self, traced},
    telemetry::TracePropagation,
};

/// Resolver reply, passed back to the client untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayedResponse {
    pub status: StatusCode,
    /// The resolver's `Content-Type`, if it sent one.
    pub content_type: Option<HeaderValue>,
    pub body: Bytes,
}

/// Front service logic: validate, forward to the resolver, relay its answer.
///
/// The relay is synchronous. Whatever status, content type and body the
/// resolver returns is what the client gets; there is no redirect.
#[derive(Debug, Clone)]
pub struct ForwardingGateway {
    resolver_url: String,
    http: Client,
    propagation: TracePropagation,
}

impl ForwardingGateway {
    pub fn new(resolver_url: String, http: Client, propagation: TracePropagation) -> Self {
        Self { resolver_url, http, propagation }
    }

    pub fn from_config(config: &Config, propagation: TracePropagation) -> anyhow::Result<Self> {
        let http = provider::http_client(config.http.timeout())?;
        Ok(Self::new(config.gateway.resolver_url.clone(), http, propagation))
    }

    fn endpoint(&self) -> String {
        format!("{}/localizacao", self.resolver_url.trim_end_matches('/'))
    }

    pub async fn forward(&self, request: &CepRequest) -> Result<RelayedResponse, PipelineError> {
        if !cep::validate(&request.cep) {
            return Err(PipelineError::InvalidCep);
        }

        let url = self.endpoint();
        let span = tracing::info_span!(
            "forward_to_resolver",
            cep = %request.cep,
            url = %url,
            status = field::Empty,
            duration_ms = field::Empty,
            error = field::Empty,
        );

        let mut headers = HeaderMap::new();
        self.propagation.inject_span(&span, &mut headers);

        let relayed = traced(span.clone(), self.send(&url, headers, request)).await?;
        span.record("status", relayed.status.as_u16());
        Ok(relayed)
    }

    async fn send(
        &self,
        url: &str,
        headers: HeaderMap,
        request: &CepRequest,
    ) -> Result<RelayedResponse, PipelineError> {
        let res = self
            .http
            .post(url)
            .headers(headers)
            .json(request)
            .send()
            .await
            .map_err(|e| PipelineError::transport("Failed to forward request to resolver", e))?;

        let status = res.status();
        let content_type = res.headers().get(header::CONTENT_TYPE).cloned();
        let body = res
            .bytes()
            .await
            .map_err(|e| PipelineError::transport("Failed to read resolver response body", e))?;

        Ok(RelayedResponse { status, content_type, body })
    }
}
