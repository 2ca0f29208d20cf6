//! gravity-server: HTTP surface for the demo site's event plumbing.
//!
//! Two POST endpoints, both thin adapters over gravity-core:
//!   /api/insertMetricEvent  — warehouse metric insert
//!   /api/runSimulation      — batch synthetic signup generator

mod config;
mod error;
mod metrics_api;
mod simulation_api;

use axum::{routing::post, Router};
use gravity_core::{
    config::SimConfig,
    flags::{FlagClient, StaticFlagClient},
    store::MetricStore,
};
use std::sync::{Arc, Mutex};
use tower_http::cors::{Any, CorsLayer};

use crate::config::ServerConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Mutex<MetricStore>>,
    pub flags: Arc<dyn FlagClient>,
    pub sim_config: Arc<SimConfig>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let _ = dotenvy::dotenv();

    // Missing required configuration aborts here, before anything binds.
    let config = ServerConfig::from_env()?;

    let store = MetricStore::open(&config.warehouse_db_path)?;
    store.migrate()?;

    let flags: Arc<dyn FlagClient> = match &config.flags_file {
        Some(path) => Arc::new(StaticFlagClient::from_file(path)?),
        None => Arc::new(StaticFlagClient::new()),
    };

    let state = AppState {
        store: Arc::new(Mutex::new(store)),
        flags,
        sim_config: Arc::new(SimConfig::bundled()?),
    };

    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    log::info!("gravity-server listening on http://{}", config.bind_address);
    axum::serve(listener, app).await?;
    Ok(())
}

/// POST-only routes; axum answers 405 for every other method.
fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/insertMetricEvent", post(metrics_api::insert_metric_event))
        .route("/api/runSimulation", post(simulation_api::run_simulation))
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod test_support {
    use super::*;

    pub fn test_state() -> AppState {
        test_state_with_flags(Arc::new(StaticFlagClient::new()))
    }

    pub fn test_state_with_flags(flags: Arc<StaticFlagClient>) -> AppState {
        let store = MetricStore::in_memory().expect("in-memory store");
        store.migrate().expect("migration");
        AppState {
            store: Arc::new(Mutex::new(store)),
            flags,
            sim_config: Arc::new(SimConfig::bundled().expect("bundled config")),
        }
    }
}
