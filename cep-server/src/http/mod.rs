//! axum adapters over `cep-core`. Handlers only decode, call the core and
//! encode; status mapping lives in [`cep_core::PipelineError`].

pub mod error;
pub mod gateway;
pub mod resolver;

pub use error::ApiError;

async fn healthz() -> &'static str {
    "ok"
}
