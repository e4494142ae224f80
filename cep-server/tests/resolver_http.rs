//! Resolver routes through a real axum Router with stubbed providers.

mod common;

use std::sync::atomic::Ordering;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use cep_core::{Location, PipelineError, TracePropagation, WeatherReading};
use cep_server::http::resolver;
use tower::ServiceExt; // for oneshot

use common::{SAO_PAULO_JSON, body_string, sao_paulo_at_20, stubs};

fn get(uri: &str) -> Request<Body> {
    Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_owned()))
        .unwrap()
}

#[tokio::test]
async fn get_by_path_returns_temperatures() {
    let s = sao_paulo_at_20();
    let app = resolver::router(s.pipeline.clone(), TracePropagation::new());

    let response = app.oneshot(get("/cep/01001000")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, SAO_PAULO_JSON);
}

#[tokio::test]
async fn post_localizacao_returns_temperatures() {
    let s = sao_paulo_at_20();
    let app = resolver::router(s.pipeline.clone(), TracePropagation::new());

    let response = app
        .oneshot(post_json("/localizacao", r#"{"cep": "01001-000"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, SAO_PAULO_JSON);
}

#[tokio::test]
async fn repeated_requests_are_byte_identical() {
    let s = sao_paulo_at_20();
    let app = resolver::router(s.pipeline.clone(), TracePropagation::new());

    let first = body_string(app.clone().oneshot(get("/cep/01001000")).await.unwrap()).await;
    let second = body_string(app.oneshot(get("/cep/01001000")).await.unwrap()).await;

    assert_eq!(first, second);
}

#[tokio::test]
async fn invalid_cep_is_unprocessable_without_upstream_calls() {
    let s = sao_paulo_at_20();
    let app = resolver::router(s.pipeline.clone(), TracePropagation::new());

    let response = app.oneshot(get("/cep/1234")).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_string(response).await, r#"{"message":"invalid zipcode"}"#);
    assert_eq!(s.postal_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unknown_cep_is_not_found_and_skips_weather() {
    let s = stubs(Err(PipelineError::CepNotFound), Ok(WeatherReading { temp_c: 20.0 }));
    let app = resolver::router(s.pipeline.clone(), TracePropagation::new());

    let response = app.oneshot(get("/cep/00000000")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_string(response).await, r#"{"message":"can not find zipcode"}"#);
    assert_eq!(s.weather_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn missing_weather_is_not_found() {
    let s = stubs(
        Ok(Location { city: "Atlantis".into() }),
        Err(PipelineError::WeatherUnavailable),
    );
    let app = resolver::router(s.pipeline.clone(), TracePropagation::new());

    let response = app.oneshot(get("/cep/01001000")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_string(response).await, r#"{"message":"can not find weather"}"#);
}

#[tokio::test]
async fn transport_failure_is_internal_error_without_details() {
    let s = stubs(
        Err(PipelineError::UpstreamTransport("tcp connect error: 10.0.0.1:443".into())),
        Ok(WeatherReading { temp_c: 20.0 }),
    );
    let app = resolver::router(s.pipeline.clone(), TracePropagation::new());

    let response = app.oneshot(get("/cep/01001000")).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_string(response).await;
    assert_eq!(body, r#"{"message":"internal error"}"#);
    assert!(!body.contains("10.0.0.1"));
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let s = sao_paulo_at_20();
    let app = resolver::router(s.pipeline.clone(), TracePropagation::new());

    let response = app.oneshot(post_json("/localizacao", "{not json")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_string(response).await, r#"{"message":"invalid request body"}"#);
    assert_eq!(s.postal_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn body_without_cep_field_is_bad_request() {
    let s = sao_paulo_at_20();
    let app = resolver::router(s.pipeline.clone(), TracePropagation::new());

    let response = app.oneshot(post_json("/localizacao", r#"{"zip": "01001000"}"#)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn accepts_inbound_traceparent() {
    let s = sao_paulo_at_20();
    let app = resolver::router(s.pipeline.clone(), TracePropagation::new());

    let request = Request::builder()
        .method("GET")
        .uri("/cep/01001000")
        .header("traceparent", "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn healthz_is_ok() {
    let s = sao_paulo_at_20();
    let app = resolver::router(s.pipeline.clone(), TracePropagation::new());

    let response = app.oneshot(get("/healthz")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "ok");
}
