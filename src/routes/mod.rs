use axum::{http::Method, routing::get, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::AppState;

pub mod registry;
pub mod simulator;
pub mod uploads;

pub fn routes() -> Router<Arc<AppState>> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(3600));

    Router::new()
        .route("/health", get(health_check))
        .merge(uploads::routes())
        .merge(simulator::routes())
        .merge(registry::routes())
        .layer(cors)
}

async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
pub(crate) fn test_state() -> Arc<AppState> {
    let config = crate::config::Config {
        simulation_seed: Some(11),
        product_api_base_url: "http://127.0.0.1:1/api".to_string(),
        ..Default::default()
    };
    Arc::new(AppState::new(config))
}
