use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use std::sync::Arc;

use crate::{
    AppState,
    error::AppError,
    models::{Product, ProductPatch},
};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/registry/productos", get(list_products).post(create_product))
        .route("/registry/productos/:id", put(update_product).delete(delete_product))
}

async fn list_products(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Product>>, AppError> {
    let products = state.registry.list().await?;
    tracing::info!("Registry returned {} products", products.len());
    Ok(Json(products))
}

async fn create_product(
    State(state): State<Arc<AppState>>,
    Json(product): Json<Product>,
) -> Result<(StatusCode, Json<Product>), AppError> {
    let created = state.registry.create(&product).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(patch): Json<ProductPatch>,
) -> Result<Json<Product>, AppError> {
    Ok(Json(state.registry.update(id, &patch).await?))
}

async fn delete_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<StatusCode, AppError> {
    state.registry.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_state;

    #[tokio::test]
    async fn test_unreachable_registry_maps_to_registry_error() {
        let state = test_state();
        let err = list_products(State(state)).await.unwrap_err();
        assert!(matches!(err, AppError::Registry(_)));
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_invalid_product_rejected_before_request() {
        let state = test_state();
        let product = Product {
            id: None,
            codigo: String::new(),
            nombre: "X".into(),
            descripcion: "X".into(),
            stock: 1,
            costo: "1".into(),
            precio_venta: "2".into(),
            pais: "Chile".into(),
            tiempo_llegada: "30".into(),
            cantidad_minima_compra: 1,
        };
        let err = create_product(State(state), Json(product)).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }
}
