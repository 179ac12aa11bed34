use anyhow::{Context, Result};
use clap::Parser;
use lib::config::{load_hospital_config, HospitalConfig, StorageEngineType};
use lib::repository::EntityRepository;
use lib::storage_engine::create_storage;
use log::{info, warn};
use schema::init_schema_service;
use std::future::Future;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::signal::unix::{signal, SignalKind};
use warp::Filter;

use crate::http::{routes, AppState};

#[derive(Parser, Debug, Default)]
#[clap(author, version, about = "Hospital administration HTTP server", long_about = None)]
#[clap(propagate_version = true)]
pub struct CliArgs {
    /// Path to the YAML configuration file
    #[clap(long, short = 'c', value_name = "PATH")]
    pub config: Option<PathBuf>,
    /// HTTP port; overrides the config file and HOSPITAL_PORT
    #[clap(long, short = 'p')]
    pub port: Option<u16>,
    /// Storage engine: postgresql or inmemory
    #[clap(long, value_name = "ENGINE")]
    pub storage: Option<StorageEngineType>,
    /// Reject appointment status changes the lifecycle does not allow
    #[clap(long)]
    pub enforce_status_transitions: bool,
}

impl CliArgs {
    /// Command-line flags win over the file and the environment.
    pub fn apply_to(&self, config: &mut HospitalConfig) {
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(engine) = self.storage {
            config.storage.storage_engine_type = engine;
        }
        if self.enforce_status_transitions {
            config.enforce_status_transitions = true;
        }
    }
}

pub async fn start_cli() -> Result<()> {
    let args = CliArgs::parse();
    let mut config = load_hospital_config(args.config.as_deref())?;
    args.apply_to(&mut config);
    run_server(config, shutdown_signal()).await
}

/// Builds the repository for `config` and serves the API until `shutdown`
/// resolves.
pub async fn run_server<S>(config: HospitalConfig, shutdown: S) -> Result<()>
where
    S: Future<Output = ()> + Send + 'static,
{
    let schema = init_schema_service()
        .await
        .context("Failed to register entity schemas")?;
    let store = create_storage(&config.storage)
        .await
        .with_context(|| format!("Failed to open {} storage", config.storage.storage_engine_type))?;
    info!(
        "Registered entities: {}",
        schema.entity_names().collect::<Vec<_>>().join(", ")
    );

    let repository = EntityRepository::new(schema, store).with_config(&config);
    let api = routes(AppState::new(repository)).with(warp::log("hospital_server::http"));

    let addr: SocketAddr = config
        .server
        .bind_address()
        .parse()
        .with_context(|| format!("Invalid listen address {}", config.server.bind_address()))?;
    let (bound, server) = warp::serve(api)
        .try_bind_with_graceful_shutdown(addr, shutdown)
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Hospital API listening on http://{}", bound);
    server.await;
    info!("Hospital API stopped");
    Ok(())
}

/// Resolves on SIGTERM or SIGINT.
pub async fn shutdown_signal() {
    let handlers = (signal(SignalKind::terminate()), signal(SignalKind::interrupt()));
    let (mut sigterm, mut sigint) = match handlers {
        (Ok(term), Ok(int)) => (term, int),
        _ => {
            warn!("Could not install signal handlers, waiting for Ctrl-C instead");
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => {
            info!("Received SIGTERM, shutting down gracefully...");
        }
        _ = sigint.recv() => {
            info!("Received SIGINT, shutting down gracefully...");
        }
    }
}
