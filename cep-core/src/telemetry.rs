//! Logging and distributed tracing.
//!
//! [`Telemetry::init`] installs the `tracing` subscriber (fmt layer plus an
//! optional OTLP exporter) and returns a handle owned by the process entry
//! point. Trace-context propagation goes through [`TracePropagation`], which
//! is passed explicitly to whatever needs to inject or extract headers.

use anyhow::{Context as _, Result};
use http::{HeaderMap, HeaderName, HeaderValue};
use opentelemetry::{
    Context, KeyValue,
    propagation::{Extractor, Injector, TextMapPropagator},
    trace::TracerProvider as _,
};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{Resource, propagation::TraceContextPropagator, trace::SdkTracerProvider};
use tracing::Span;
use tracing_opentelemetry::OpenTelemetrySpanExt;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{LogConfig, LogFormat, TracingConfig};

/// W3C Trace Context header name
pub const TRACEPARENT: &str = "traceparent";

/// Adapter for extracting W3C Trace Context from HTTP headers
struct HeadersExtractor<'a>(&'a HeaderMap);

impl Extractor for HeadersExtractor<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.to_str().ok())
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(HeaderName::as_str).collect()
    }
}

/// Adapter for injecting W3C Trace Context into HTTP headers
struct HeadersInjector<'a>(&'a mut HeaderMap);

impl Injector for HeadersInjector<'_> {
    fn set(&mut self, key: &str, value: String) {
        if let (Ok(name), Ok(val)) =
            (HeaderName::from_bytes(key.as_bytes()), HeaderValue::from_str(&value))
        {
            self.0.insert(name, val);
        }
    }
}

/// W3C trace-context propagation across the gateway → resolver hop.
#[derive(Debug, Clone, Default)]
pub struct TracePropagation {
    propagator: TraceContextPropagator,
}

impl TracePropagation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write the context of `span` into outbound request headers.
    pub fn inject_span(&self, span: &Span, headers: &mut HeaderMap) {
        self.inject_context(&span.context(), headers);
    }

    pub fn inject_context(&self, cx: &Context, headers: &mut HeaderMap) {
        self.propagator.inject_context(cx, &mut HeadersInjector(headers));
    }

    pub fn extract(&self, headers: &HeaderMap) -> Context {
        self.propagator.extract(&HeadersExtractor(headers))
    }

    /// Make the caller's span (from inbound headers) the parent of `span`.
    pub fn set_parent_from_headers(&self, span: &Span, headers: &HeaderMap) {
        if headers.contains_key(TRACEPARENT) {
            let _ = span.set_parent(self.extract(headers));
        }
    }
}

/// Process-wide telemetry handle. Call [`Telemetry::shutdown`] before exit
/// so buffered spans reach the collector.
#[derive(Debug)]
pub struct Telemetry {
    provider: Option<SdkTracerProvider>,
    propagation: TracePropagation,
}

impl Telemetry {
    /// Install the subscriber. Fails if the exporter cannot be built or a
    /// subscriber is already installed.
    pub fn init(
        default_service: &str,
        log: &LogConfig,
        tracing_cfg: &TracingConfig,
    ) -> Result<Self> {
        let provider = if tracing_cfg.enabled {
            let service_name = tracing_cfg.service_name.as_deref().unwrap_or(default_service);
            Some(build_provider(service_name, &tracing_cfg.endpoint)?)
        } else {
            None
        };

        let otel_layer = provider.as_ref().map(|p| {
            tracing_opentelemetry::layer().with_tracer(p.tracer("cep-weather"))
        });

        let filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::try_new(&log.level)
                .with_context(|| format!("Invalid log level filter '{}'", log.level))?,
        };

        let fmt_layer = match log.format {
            LogFormat::Json => tracing_subscriber::fmt::layer().json().boxed(),
            LogFormat::Text => tracing_subscriber::fmt::layer().boxed(),
        };

        tracing_subscriber::registry()
            .with(otel_layer)
            .with(filter)
            .with(fmt_layer)
            .try_init()
            .context("Failed to install tracing subscriber")?;

        if tracing_cfg.enabled {
            tracing::info!(endpoint = %tracing_cfg.endpoint, "OTLP trace exporter enabled");
        }

        Ok(Self { provider, propagation: TracePropagation::new() })
    }

    /// Handle without a subscriber or exporter, for tests and embedding.
    pub fn disabled() -> Self {
        Self { provider: None, propagation: TracePropagation::new() }
    }

    pub fn propagation(&self) -> TracePropagation {
        self.propagation.clone()
    }

    /// Flush and stop the exporter.
    pub fn shutdown(self) {
        if let Some(provider) = self.provider {
            if let Err(e) = provider.shutdown() {
                tracing::warn!(error = %e, "Failed to shut down tracer provider");
            }
        }
    }
}

fn build_provider(service_name: &str, endpoint: &str) -> Result<SdkTracerProvider> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()
        .context("Failed to build OTLP span exporter")?;

    let resource = Resource::builder_empty()
        .with_attributes([KeyValue::new("service.name", service_name.to_string())])
        .build();

    Ok(SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(resource)
        .build())
}
