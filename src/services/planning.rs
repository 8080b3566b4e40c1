use ::csv::WriterBuilder;

use crate::error::AppError;
use crate::models::{
    InventoryAlerts, OverstockAlert, PurchaseSuggestion, Scenario, SimulationResult,
    StockoutAlert,
};
use crate::services::catalog::Catalog;

const DAYS_PER_MONTH: f64 = 30.0;
const OVERSTOCK_RATIO: u32 = 2;

fn item_label(catalog: &Catalog, code: &str) -> String {
    catalog
        .get(code)
        .map(|p| format!("{} - {}", p.code, p.name))
        .unwrap_or_else(|| code.to_string())
}

fn projected_demand(result: &SimulationResult, scenario: Scenario) -> u32 {
    (result.total_predicted() as f64 * scenario.demand_factor()).round() as u32
}

/// Units to buy per product so that stock covers the scenario's demand.
/// Any positive amount is raised to the product's minimum order quantity.
pub fn purchase_suggestions(
    catalog: &Catalog,
    results: &[SimulationResult],
    scenario: Scenario,
) -> Vec<PurchaseSuggestion> {
    results
        .iter()
        .map(|result| {
            let demand = projected_demand(result, scenario);
            let missing = demand.saturating_sub(result.stock);
            let min_quantity = catalog
                .get(&result.product_code)
                .map_or(0, |p| p.min_quantity);
            let suggested_purchase = if missing > 0 { missing.max(min_quantity) } else { 0 };

            PurchaseSuggestion {
                item: item_label(catalog, &result.product_code),
                current_stock: result.stock,
                projected_demand: demand,
                suggested_purchase,
            }
        })
        .collect()
}

pub fn inventory_alerts(catalog: &Catalog, results: &[SimulationResult]) -> InventoryAlerts {
    let mut alerts = InventoryAlerts::default();

    for result in results {
        let demand = projected_demand(result, Scenario::Realistic);
        let horizon_days = result.predictions.len() as f64 * DAYS_PER_MONTH;

        if demand > result.stock {
            let daily_demand = demand as f64 / horizon_days;
            alerts.stockout.push(StockoutAlert {
                product: item_label(catalog, &result.product_code),
                current_stock: result.stock,
                projected_shortfall: demand - result.stock,
                days_until_stockout: (result.stock as f64 / daily_demand).floor() as u32,
            });
        } else if result.stock > demand.saturating_mul(OVERSTOCK_RATIO) {
            alerts.overstock.push(OverstockAlert {
                product: item_label(catalog, &result.product_code),
                current_stock: result.stock,
                projected_demand: demand,
                excess_units: result.stock - demand,
            });
        }
    }

    alerts.stockout.sort_by_key(|a| a.days_until_stockout);
    alerts
}

/// Renders suggestions as a downloadable CSV report.
pub fn purchase_report_csv(suggestions: &[PurchaseSuggestion]) -> Result<String, AppError> {
    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    writer.write_record(["producto", "stock_actual", "demanda_proyectada", "sugerencia_compra"])?;
    for s in suggestions {
        writer.write_record([
            s.item.clone(),
            s.current_stock.to_string(),
            s.projected_demand.to_string(),
            s.suggested_purchase.to_string(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("Failed to flush report: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| AppError::Internal(e.to_string()))
}
