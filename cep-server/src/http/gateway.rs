//! Front routes: `POST /cep` relays the resolver's answer as-is.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use cep_core::{CepRequest, ForwardingGateway, TracePropagation};
use tracing::{Instrument, field};

use super::{
    error::{ApiError, log_failure},
    healthz,
};

#[derive(Clone)]
struct GatewayState {
    gateway: ForwardingGateway,
    propagation: TracePropagation,
}

pub fn router(gateway: ForwardingGateway, propagation: TracePropagation) -> Router {
    Router::new()
        .route("/cep", post(forward_cep))
        .route("/cep/", post(forward_cep))
        .route("/healthz", get(healthz))
        .with_state(GatewayState { gateway, propagation })
}

async fn forward_cep(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    payload: Result<Json<CepRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload?;

    let span = tracing::info_span!(
        "forward_cep",
        cep = %request.cep,
        status = field::Empty,
        duration_ms = field::Empty,
    );
    state.propagation.set_parent_from_headers(&span, &headers);

    let started = Instant::now();
    let result = state.gateway.forward(&request).instrument(span.clone()).await;
    span.record("duration_ms", started.elapsed().as_millis() as u64);

    match result {
        Ok(relayed) => {
            span.record("status", relayed.status.as_u16());
            let mut response = (relayed.status, relayed.body).into_response();
            match relayed.content_type {
                Some(content_type) => {
                    response.headers_mut().insert(header::CONTENT_TYPE, content_type);
                }
                None => {
                    response.headers_mut().remove(header::CONTENT_TYPE);
                }
            }
            Ok(response)
        }
        Err(err) => {
            log_failure(&span, &err);
            Err(err.into())
        }
    }
}
