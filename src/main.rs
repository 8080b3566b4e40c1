use anyhow::Result;
use axum::extract::DefaultBodyLimit;
use axum::Router;
use parking_lot::Mutex;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

mod config;
mod error;
mod logging;
mod routes;
mod services;
pub mod models;
pub mod clients;

use clients::ProductRegistryClient;
use services::catalog::{Catalog, Selection};
use services::simulation::{Forecaster, RandomMultiplierForecaster};
use services::upload_workflow::UploadWorkflow;

// Room for multipart boundaries and headers around the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    logging::init_logging()?;

    // Load configuration
    let config = config::load_config()?;
    let addr = config.bind_addr;
    let body_limit = config.max_file_size + MULTIPART_OVERHEAD;

    // Build our application state
    let state = Arc::new(AppState::new(config));

    let app = Router::new()
        .merge(routes::routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    tracing::info!("listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// Application state
pub struct AppState {
    config: config::Config,
    uploads: UploadWorkflow,
    catalog: Catalog,
    selection: Mutex<Selection>,
    forecaster: Box<dyn Forecaster>,
    registry: ProductRegistryClient,
}

impl AppState {
    fn new(config: config::Config) -> Self {
        let forecaster = RandomMultiplierForecaster::new(config.simulation_seed);
        let registry = ProductRegistryClient::new(config.product_api_base_url.clone());
        Self {
            config,
            uploads: UploadWorkflow::new(),
            catalog: Catalog::demo(),
            selection: Mutex::new(Selection::default()),
            forecaster: Box::new(forecaster),
            registry,
        }
    }
}
