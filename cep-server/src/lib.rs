//! HTTP services for the `cep-weather` binary.
//!
//! - `resolver`: CEP → city → temperature, backed by [`cep_core::ResolutionPipeline`]
//! - `gateway`: validates and forwards to the resolver, relaying its JSON reply

pub mod http;
