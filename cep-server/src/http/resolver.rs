//! Backend routes: `GET /cep/{cep}` and `POST /localizacao`.

use std::{sync::Arc, time::Instant};

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::HeaderMap,
    routing::{get, post},
};
use cep_core::{CepRequest, ResolutionPipeline, ResolvedOutput, TracePropagation};
use tracing::{Instrument, field};

use super::{error::{ApiError, log_failure}, healthz};

#[derive(Clone)]
struct ResolverState {
    pipeline: Arc<ResolutionPipeline>,
    propagation: TracePropagation,
}

pub fn router(pipeline: Arc<ResolutionPipeline>, propagation: TracePropagation) -> Router {
    Router::new()
        .route("/cep/{cep}", get(resolve_by_path))
        .route("/localizacao", post(resolve_by_body))
        .route("/healthz", get(healthz))
        .with_state(ResolverState { pipeline, propagation })
}

async fn resolve_by_path(
    State(state): State<ResolverState>,
    headers: HeaderMap,
    Path(cep): Path<String>,
) -> Result<Json<ResolvedOutput>, ApiError> {
    resolve(&state, &headers, &cep).await
}

async fn resolve_by_body(
    State(state): State<ResolverState>,
    headers: HeaderMap,
    payload: Result<Json<CepRequest>, JsonRejection>,
) -> Result<Json<ResolvedOutput>, ApiError> {
    let Json(request) = payload?;
    resolve(&state, &headers, &request.cep).await
}

async fn resolve(
    state: &ResolverState,
    headers: &HeaderMap,
    cep: &str,
) -> Result<Json<ResolvedOutput>, ApiError> {
    let span = tracing::info_span!(
        "resolve_cep",
        cep = %cep,
        city = field::Empty,
        duration_ms = field::Empty,
    );
    state.propagation.set_parent_from_headers(&span, headers);

    let started = Instant::now();
    let result = state.pipeline.resolve(cep).instrument(span.clone()).await;
    span.record("duration_ms", started.elapsed().as_millis() as u64);

    match result {
        Ok(output) => {
            span.record("city", output.city.as_str());
            Ok(Json(output))
        }
        Err(err) => {
            log_failure(&span, &err);
            Err(err.into())
        }
    }
}
