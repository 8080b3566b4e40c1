use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use crate::error::AppError;
use crate::models::{Product, ProductPatch};

static PRICE_PATTERN: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^\d+(\.\d{1,2})?$").ok());

/// Thin JSON client for the `/productos/` resource. Failures are surfaced
/// once; nothing is retried.
#[derive(Debug, Clone)]
pub struct ProductRegistryClient {
    http: Client,
    base_url: String,
}

impl ProductRegistryClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn collection_url(&self) -> String {
        format!("{}/productos/", self.base_url)
    }

    fn item_url(&self, id: u64) -> String {
        format!("{}/productos/{}/", self.base_url, id)
    }

    pub async fn list(&self) -> Result<Vec<Product>, AppError> {
        tracing::debug!("GET {}", self.collection_url());
        let response = self.http.get(self.collection_url()).send().await?;
        read_json(response, "list products").await
    }

    pub async fn create(&self, product: &Product) -> Result<Product, AppError> {
        validate_product(product)?;
        tracing::info!("Creating product {} in registry", product.codigo);
        let response = self
            .http
            .post(self.collection_url())
            .json(product)
            .send()
            .await?;
        read_json(response, "create product").await
    }

    pub async fn update(&self, id: u64, patch: &ProductPatch) -> Result<Product, AppError> {
        validate_patch(patch)?;
        tracing::info!("Updating product {} in registry", id);
        let response = self.http.put(self.item_url(id)).json(patch).send().await?;
        read_json(response, "update product").await
    }

    pub async fn delete(&self, id: u64) -> Result<(), AppError> {
        tracing::info!("Deleting product {} from registry", id);
        let response = self.http.delete(self.item_url(id)).send().await?;
        ensure_success(response, "delete product").map(|_| ())
    }
}

fn ensure_success(response: Response, action: &str) -> Result<Response, AppError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        tracing::error!("Registry failed to {}: status {}", action, status);
        Err(AppError::Registry(format!(
            "Failed to {}. Status: {}",
            action, status
        )))
    }
}

async fn read_json<T: DeserializeOwned>(response: Response, action: &str) -> Result<T, AppError> {
    ensure_success(response, action)?
        .json::<T>()
        .await
        .map_err(|e| AppError::Registry(format!("Failed to decode {} response: {}", action, e)))
}

fn require_text(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        Err(AppError::InvalidInput(format!("{} is required", field)))
    } else {
        Ok(())
    }
}

fn require_positive(field: &str, value: u32) -> Result<(), AppError> {
    if value == 0 {
        Err(AppError::InvalidInput(format!("{} must be a positive number", field)))
    } else {
        Ok(())
    }
}

fn require_price(field: &str, value: &str) -> Result<(), AppError> {
    if PRICE_PATTERN.as_ref().map_or(false, |re| re.is_match(value.trim())) {
        Ok(())
    } else {
        Err(AppError::InvalidInput(format!("{} is not a valid amount: {:?}", field, value)))
    }
}

pub fn validate_product(product: &Product) -> Result<(), AppError> {
    require_text("codigo", &product.codigo)?;
    require_text("nombre", &product.nombre)?;
    require_text("descripcion", &product.descripcion)?;
    require_text("pais", &product.pais)?;
    require_text("tiempo_llegada", &product.tiempo_llegada)?;
    require_positive("stock", product.stock)?;
    require_positive("cantidad_minima_compra", product.cantidad_minima_compra)?;
    require_price("costo", &product.costo)?;
    require_price("precio_venta", &product.precio_venta)
}

/// Same rules as [`validate_product`], applied only to the fields present.
pub fn validate_patch(patch: &ProductPatch) -> Result<(), AppError> {
    let texts = [
        ("codigo", &patch.codigo),
        ("nombre", &patch.nombre),
        ("descripcion", &patch.descripcion),
        ("pais", &patch.pais),
        ("tiempo_llegada", &patch.tiempo_llegada),
    ];
    for (field, value) in texts {
        if let Some(value) = value {
            require_text(field, value)?;
        }
    }
    if let Some(stock) = patch.stock {
        require_positive("stock", stock)?;
    }
    if let Some(min) = patch.cantidad_minima_compra {
        require_positive("cantidad_minima_compra", min)?;
    }
    if let Some(costo) = &patch.costo {
        require_price("costo", costo)?;
    }
    if let Some(precio) = &patch.precio_venta {
        require_price("precio_venta", precio)?;
    }
    Ok(())
}
