use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    AppState,
    error::AppError,
    models::{CatalogProduct, InventoryAlerts, PurchaseSuggestion, Scenario, SimulationParams, SimulationResult},
    services::{planning, simulation},
};

/// Horizon and event flags used when purchasing and alert views are
/// computed without an explicit simulation.
const PLANNING_PARAMS: SimulationParams = SimulationParams {
    months: 3,
    has_rain: false,
    has_promotion: false,
    has_fair: false,
};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/products", get(list_products))
        .route("/selection", get(get_selection).delete(clear_selection))
        .route("/selection/toggle", post(toggle_product))
        .route("/selection/toggle-all", post(toggle_all))
        .route("/selection/search", post(search_and_sync))
        .route("/simulations", post(run_simulation))
        .route("/purchasing", get(purchasing))
        .route("/purchasing/report.csv", get(purchasing_report))
        .route("/alerts", get(alerts))
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    q: String,
}

#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    code: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    query: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ScenarioQuery {
    #[serde(default)]
    scenario: Scenario,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationRequest {
    #[serde(default)]
    product_codes: Option<Vec<String>>,
    #[serde(flatten)]
    params: SimulationParams,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionResponse {
    selected: Vec<String>,
    visible_selected: usize,
    products: Vec<CatalogProduct>,
}

fn selection_response(state: &AppState, query: &str) -> SelectionResponse {
    let visible = state.catalog.search(query);
    let codes: Vec<&str> = visible.iter().map(|p| p.code.as_str()).collect();
    let selection = state.selection.lock();
    SelectionResponse {
        selected: selection.codes().to_vec(),
        visible_selected: selection.visible_count(&codes),
        products: visible.into_iter().cloned().collect(),
    }
}

async fn list_products(
    State(state): State<Arc<AppState>>,
    Query(search): Query<SearchQuery>,
) -> Json<Vec<CatalogProduct>> {
    Json(state.catalog.search(&search.q).into_iter().cloned().collect())
}

async fn get_selection(State(state): State<Arc<AppState>>) -> Json<SelectionResponse> {
    Json(selection_response(&state, ""))
}

async fn clear_selection(State(state): State<Arc<AppState>>) -> Json<SelectionResponse> {
    state.selection.lock().clear();
    Json(selection_response(&state, ""))
}

async fn toggle_product(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ToggleRequest>,
) -> Result<Json<SelectionResponse>, AppError> {
    if state.catalog.get(&request.code).is_none() {
        return Err(AppError::NotFound(format!("Product {}", request.code)));
    }
    state.selection.lock().toggle(&request.code);
    Ok(Json(selection_response(&state, "")))
}

async fn toggle_all(
    State(state): State<Arc<AppState>>,
    Json(request): Json<QueryRequest>,
) -> Json<SelectionResponse> {
    let visible = state.catalog.search(&request.query);
    let codes: Vec<&str> = visible.iter().map(|p| p.code.as_str()).collect();
    state.selection.lock().toggle_all(&codes);
    Json(selection_response(&state, &request.query))
}

/// Filters the catalog and drops selections that fall out of view.
async fn search_and_sync(
    State(state): State<Arc<AppState>>,
    Json(request): Json<QueryRequest>,
) -> Json<SelectionResponse> {
    let visible = state.catalog.search(&request.query);
    let codes: Vec<&str> = visible.iter().map(|p| p.code.as_str()).collect();
    state.selection.lock().retain_visible(&codes);
    Json(selection_response(&state, &request.query))
}

async fn run_simulation(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SimulationRequest>,
) -> Result<Json<Vec<SimulationResult>>, AppError> {
    let start = std::time::Instant::now();
    let codes = match request.product_codes {
        Some(codes) => codes,
        None => state.selection.lock().codes().to_vec(),
    };

    let results = simulation::simulate(&state.catalog, &codes, &request.params, state.forecaster.as_ref())?;
    tracing::info!("Simulation of {} products completed in {:?}", results.len(), start.elapsed());
    Ok(Json(results))
}

fn planning_results(state: &AppState) -> Result<Vec<SimulationResult>, AppError> {
    let codes: Vec<String> = state.catalog.products().iter().map(|p| p.code.clone()).collect();
    simulation::simulate(&state.catalog, &codes, &PLANNING_PARAMS, state.forecaster.as_ref())
}

async fn purchasing(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ScenarioQuery>,
) -> Result<Json<Vec<PurchaseSuggestion>>, AppError> {
    let results = planning_results(&state)?;
    Ok(Json(planning::purchase_suggestions(&state.catalog, &results, query.scenario)))
}

async fn purchasing_report(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ScenarioQuery>,
) -> Result<impl IntoResponse, AppError> {
    let results = planning_results(&state)?;
    let suggestions = planning::purchase_suggestions(&state.catalog, &results, query.scenario);
    let report = planning::purchase_report_csv(&suggestions)?;
    tracing::info!("Generated purchase report with {} rows", suggestions.len());

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"reporte_compras.csv\""),
        ],
        report,
    ))
}

async fn alerts(State(state): State<Arc<AppState>>) -> Result<Json<InventoryAlerts>, AppError> {
    let results = planning_results(&state)?;
    Ok(Json(planning::inventory_alerts(&state.catalog, &results)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_state;

    fn request(codes: Option<Vec<&str>>, months: u8) -> SimulationRequest {
        SimulationRequest {
            product_codes: codes.map(|c| c.into_iter().map(str::to_string).collect()),
            params: SimulationParams {
                months,
                has_rain: false,
                has_promotion: true,
                has_fair: false,
            },
        }
    }

    #[tokio::test]
    async fn test_list_products_filters() {
        let state = test_state();
        let Json(all) = list_products(State(state.clone()), Query(SearchQuery::default())).await;
        assert_eq!(all.len(), 4);
        let Json(hits) = list_products(State(state), Query(SearchQuery { q: "BETA".into() })).await;
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].code, "OUR2000");
    }

    #[tokio::test]
    async fn test_selection_flow() {
        let state = test_state();
        let Json(first) = toggle_product(State(state.clone()), Json(ToggleRequest { code: "OUR1000".into() }))
            .await
            .unwrap();
        assert_eq!(first.selected, vec!["OUR1000"]);
        let Json(all) = toggle_all(State(state.clone()), Json(QueryRequest { query: "gamma".into() })).await;
        assert_eq!(all.selected, vec!["OUR1000", "OUR3000"]);
        assert_eq!(all.visible_selected, 1);

        let Json(synced) = search_and_sync(State(state.clone()), Json(QueryRequest { query: "our3".into() })).await;
        assert_eq!(synced.selected, vec!["OUR3000"]);

        let unknown = toggle_product(State(state.clone()), Json(ToggleRequest { code: "NOPE".into() })).await;
        assert!(matches!(unknown, Err(AppError::NotFound(_))));

        let Json(cleared) = clear_selection(State(state)).await;
        assert!(cleared.selected.is_empty());
    }

    #[tokio::test]
    async fn test_simulation_uses_selection_when_no_codes_given() {
        let state = test_state();
        assert!(matches!(
            run_simulation(State(state.clone()), Json(request(None, 3))).await,
            Err(AppError::InvalidInput(_))
        ));

        state.selection.lock().toggle("OUR2000");
        let Json(results) = run_simulation(State(state), Json(request(None, 3))).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].product_code, "OUR2000");
        assert_eq!(results[0].predictions.len(), 3);
    }

    #[tokio::test]
    async fn test_simulation_explicit_codes() {
        let state = test_state();
        let Json(results) = run_simulation(State(state.clone()), Json(request(Some(vec!["OUR1000", "OUR4000"]), 6)))
            .await
            .unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.predictions.len() == 6));

        let bad_horizon = run_simulation(State(state), Json(request(Some(vec!["OUR1000"]), 5))).await;
        assert!(matches!(bad_horizon, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_purchasing_and_alerts() {
        let state = test_state();
        let Json(suggestions) = purchasing(State(state.clone()), Query(ScenarioQuery::default()))
            .await
            .unwrap();
        assert_eq!(suggestions.len(), 4);
        assert!(suggestions
            .iter()
            .all(|s| s.suggested_purchase == 0 || s.current_stock + s.suggested_purchase >= s.projected_demand));

        let Json(alerts) = alerts(State(state)).await.unwrap();
        // OUR1000 ends its history at 443/month against 120 units of stock.
        assert!(alerts.stockout.iter().any(|a| a.product.starts_with("OUR1000")));
    }

    #[tokio::test]
    async fn test_report_download() {
        let state = test_state();
        let response = purchasing_report(State(state), Query(ScenarioQuery { scenario: Scenario::Optimistic }))
            .await
            .unwrap()
            .into_response();
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/csv; charset=utf-8");
    }

    #[test]
    fn test_simulation_request_shape() {
        let request: SimulationRequest = serde_json::from_str(
            r#"{"productCodes":["OUR1000"],"months":2,"hasRain":true,"hasPromotion":false,"hasFair":true}"#,
        )
        .unwrap();
        assert_eq!(request.product_codes, Some(vec!["OUR1000".to_string()]));
        assert_eq!(request.params.months, 2);
        assert!(request.params.has_rain);
        assert!(request.params.has_fair);
    }
}
