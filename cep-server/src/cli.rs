use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use axum::Router;
use cep_core::{Config, ForwardingGateway, ProviderId, ResolutionPipeline, Telemetry};
use cep_server::http;
use clap::{Parser, Subcommand};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "cep-weather", version, about = "CEP temperature services")]
pub struct Cli {
    /// Config file; defaults to the platform config directory.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the resolver service (CEP -> city -> temperature).
    Resolver {
        /// Port override for the listen address.
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Run the gateway service that validates and forwards to the resolver.
    Gateway {
        /// Port override for the listen address.
        #[arg(short, long)]
        port: Option<u16>,

        /// Resolver base URL, e.g. http://localhost:8081.
        #[arg(long)]
        resolver_url: Option<String>,
    },

    /// Configure credentials for a weather provider.
    Configure {
        /// Provider short name, e.g. "weatherapi" or "openweather".
        provider: String,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let config = match &self.config {
            Some(path) => Config::load_from(path)?,
            None => Config::load()?,
        };

        match self.command {
            Command::Configure { provider } => configure(config, self.config.as_deref(), &provider),
            Command::Resolver { port } => run_resolver(with_env(config)?, port).await,
            Command::Gateway { port, resolver_url } => {
                let mut config = with_env(config)?;
                if let Some(url) = resolver_url {
                    config.gateway.resolver_url = url;
                }
                run_gateway(config, port).await
            }
        }
    }
}

fn with_env(mut config: Config) -> Result<Config> {
    config.apply_env_overrides(|key| std::env::var(key).ok())?;
    Ok(config)
}

fn configure(mut config: Config, path: Option<&Path>, provider: &str) -> Result<()> {
    let id = ProviderId::try_from(provider)?;

    let api_key = inquire::Password::new(&format!("API key for {id}:"))
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    let api_key = api_key.trim().to_string();
    anyhow::ensure!(!api_key.is_empty(), "API key must not be empty");

    config.upsert_provider_api_key(id, api_key);

    if config.default_provider_id().ok() != Some(id) {
        let make_default = inquire::Confirm::new(&format!("Make {id} the default provider?"))
            .with_default(false)
            .prompt()
            .context("Failed to read confirmation")?;
        if make_default {
            config.set_default_provider(id);
        }
    }

    let path = match path {
        Some(p) => p.to_path_buf(),
        None => Config::config_file_path()?,
    };
    config.save_to(&path)?;
    println!("Saved {id} credentials to {}", path.display());
    Ok(())
}

async fn run_resolver(config: Config, port: Option<u16>) -> Result<()> {
    let telemetry = Telemetry::init("cep-resolver", &config.log, &config.tracing)?;
    let addr = listen_addr(&config.resolver.listen, port)?;

    let result = match ResolutionPipeline::from_config(&config) {
        Ok(pipeline) => {
            let app = http::resolver::router(Arc::new(pipeline), telemetry.propagation());
            serve(app, addr).await
        }
        Err(e) => Err(e),
    };

    telemetry.shutdown();
    result
}

async fn run_gateway(config: Config, port: Option<u16>) -> Result<()> {
    let telemetry = Telemetry::init("cep-gateway", &config.log, &config.tracing)?;
    let addr = listen_addr(&config.gateway.listen, port)?;

    let result = match ForwardingGateway::from_config(&config, telemetry.propagation()) {
        Ok(gateway) => {
            tracing::info!(resolver = %config.gateway.resolver_url, "Forwarding to resolver");
            let app = http::gateway::router(gateway, telemetry.propagation());
            serve(app, addr).await
        }
        Err(e) => Err(e),
    };

    telemetry.shutdown();
    result
}

fn listen_addr(listen: &str, port: Option<u16>) -> Result<SocketAddr> {
    let mut addr: SocketAddr = listen
        .parse()
        .with_context(|| format!("Invalid listen address '{listen}'"))?;
    if let Some(port) = port {
        addr.set_port(port);
    }
    Ok(addr)
}

async fn serve(app: Router, addr: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
