use http::StatusCode;

/// Terminal failure of a single CEP resolution request.
///
/// Every variant maps to exactly one HTTP status. The transport detail is
/// kept for operator logs only; [`PipelineError::client_message`] never
/// includes it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PipelineError {
    #[error("invalid zipcode")]
    InvalidCep,

    #[error("zipcode not found")]
    CepNotFound,

    #[error("weather data unavailable")]
    WeatherUnavailable,

    #[error("upstream transport failure: {0}")]
    UpstreamTransport(String),
}

impl PipelineError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            PipelineError::InvalidCep => StatusCode::UNPROCESSABLE_ENTITY,
            PipelineError::CepNotFound | PipelineError::WeatherUnavailable => StatusCode::NOT_FOUND,
            PipelineError::UpstreamTransport(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short, stable message that is safe to hand to the caller.
    pub fn client_message(&self) -> &'static str {
        match self {
            PipelineError::InvalidCep => "invalid zipcode",
            PipelineError::CepNotFound => "can not find zipcode",
            PipelineError::WeatherUnavailable => "can not find weather",
            PipelineError::UpstreamTransport(_) => "internal error",
        }
    }

    pub(crate) fn transport(context: &str, err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() { "timeout" } else { "request" };
        tracing::warn!(error = %err, kind, "{context}");
        PipelineError::UpstreamTransport(format!("{context}: {err}"))
    }
}
