use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceSensitivity {
    Alta,
    Media,
    Baja,
}

/// A product as seen by the simulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogProduct {
    pub code: String,
    pub name: String,
    pub country: String,
    /// Days between ordering and arrival.
    pub lead_time: u32,
    pub min_quantity: u32,
    pub price_sensitivity: PriceSensitivity,
    pub stock: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesPoint {
    pub month: String,
    pub sales: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationParams {
    pub months: u8,
    #[serde(default)]
    pub has_rain: bool,
    #[serde(default)]
    pub has_promotion: bool,
    #[serde(default)]
    pub has_fair: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub product_code: String,
    pub historical: Vec<SalesPoint>,
    pub predictions: Vec<SalesPoint>,
    pub stock: u32,
    pub stock_sufficient: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shortfall: Option<u32>,
}

impl SimulationResult {
    pub fn total_predicted(&self) -> u32 {
        self.predictions.iter().map(|p| p.sales).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scenario {
    Conservative,
    #[default]
    Realistic,
    Optimistic,
}

impl Scenario {
    pub fn demand_factor(self) -> f64 {
        match self {
            Scenario::Conservative => 0.8,
            Scenario::Realistic => 1.0,
            Scenario::Optimistic => 1.3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseSuggestion {
    pub item: String,
    pub current_stock: u32,
    pub projected_demand: u32,
    pub suggested_purchase: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockoutAlert {
    pub product: String,
    pub current_stock: u32,
    pub projected_shortfall: u32,
    pub days_until_stockout: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverstockAlert {
    pub product: String,
    pub current_stock: u32,
    pub projected_demand: u32,
    pub excess_units: u32,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct InventoryAlerts {
    pub stockout: Vec<StockoutAlert>,
    pub overstock: Vec<OverstockAlert>,
}

/// Product record held by the external product registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub codigo: String,
    pub nombre: String,
    pub descripcion: String,
    pub stock: u32,
    pub costo: String,
    pub precio_venta: String,
    pub pais: String,
    pub tiempo_llegada: String,
    pub cantidad_minima_compra: u32,
}

/// Partial update sent to the registry; absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codigo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descripcion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub costo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precio_venta: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pais: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tiempo_llegada: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cantidad_minima_compra: Option<u32>,
}
