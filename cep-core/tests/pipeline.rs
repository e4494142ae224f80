//! ResolutionPipeline built from config, with both providers mocked.

use cep_core::{Config, PipelineError, ProviderConfig, ResolutionPipeline};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(mock: &MockServer) -> Config {
    let mut cfg = Config::default();
    cfg.default_provider = Some("weatherapi".into());
    cfg.providers.insert(
        "weatherapi".into(),
        ProviderConfig { api_key: "test-key".into(), base_url: Some(mock.uri()) },
    );
    cfg.postal.base_url = format!("{}/ws", mock.uri());
    cfg
}

#[tokio::test]
async fn resolves_end_to_end() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ws/01001000/json/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "localidade": "São Paulo"
        })))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/current.json"))
        .and(query_param("q", "São Paulo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "current": { "temp_c": 20.0 }
        })))
        .mount(&mock_server)
        .await;

    let pipeline = ResolutionPipeline::from_config(&config_for(&mock_server)).unwrap();
    let out = pipeline.resolve("01001-000").await.unwrap();

    assert_eq!(
        serde_json::to_string(&out).unwrap(),
        r#"{"city":"São Paulo","temp_C":20.0,"temp_F":68.0,"temp_K":293.15}"#
    );
}

#[tokio::test]
async fn unknown_cep_never_queries_weather() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ws/00000000/json/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "erro": "true" })),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/current.json"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let pipeline = ResolutionPipeline::from_config(&config_for(&mock_server)).unwrap();
    let err = pipeline.resolve("00000000").await.unwrap_err();

    assert_eq!(err, PipelineError::CepNotFound);
}
