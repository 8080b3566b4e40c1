use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::AppError;
use crate::models::{SalesPoint, SimulationParams, SimulationResult};
use crate::services::catalog::Catalog;

pub const FORECAST_MONTHS: [&str; 6] = ["nov-25", "dic-25", "ene-26", "feb-26", "mar-26", "abr-26"];
const ALLOWED_HORIZONS: [u8; 4] = [1, 2, 3, 6];
const DEFAULT_BASE_SALES: u32 = 100;

const PROMOTION_FACTOR: f64 = 1.3;
const FAIR_FACTOR: f64 = 1.2;
const RAIN_FACTOR: f64 = 0.85;

/// Projects future monthly sales from a product's history.
pub trait Forecaster: Send + Sync {
    fn forecast(&self, history: &[SalesPoint], params: &SimulationParams) -> Vec<SalesPoint>;
}

/// Placeholder model: last observed month times a random factor in
/// `[0.8, 1.2)`, scaled by the event multipliers.
pub struct RandomMultiplierForecaster {
    rng: Mutex<StdRng>,
}

impl RandomMultiplierForecaster {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng: Mutex::new(rng) }
    }
}

impl Forecaster for RandomMultiplierForecaster {
    fn forecast(&self, history: &[SalesPoint], params: &SimulationParams) -> Vec<SalesPoint> {
        // A zero last month counts as missing data.
        let base = history
            .last()
            .map(|p| p.sales)
            .filter(|&sales| sales > 0)
            .unwrap_or(DEFAULT_BASE_SALES) as f64;
        let mut rng = self.rng.lock();

        FORECAST_MONTHS
            .iter()
            .take(params.months as usize)
            .map(|month| {
                let mut predicted = base * rng.gen_range(0.8..1.2);
                if params.has_promotion {
                    predicted *= PROMOTION_FACTOR;
                }
                if params.has_fair {
                    predicted *= FAIR_FACTOR;
                }
                if params.has_rain {
                    predicted *= RAIN_FACTOR;
                }
                SalesPoint {
                    month: month.to_string(),
                    sales: predicted.round() as u32,
                }
            })
            .collect()
    }
}

pub fn validate_params(params: &SimulationParams) -> Result<(), AppError> {
    if ALLOWED_HORIZONS.contains(&params.months) {
        Ok(())
    } else {
        Err(AppError::InvalidInput(format!(
            "months must be one of {:?}, got {}",
            ALLOWED_HORIZONS, params.months
        )))
    }
}

pub fn simulate(
    catalog: &Catalog,
    codes: &[String],
    params: &SimulationParams,
    forecaster: &dyn Forecaster,
) -> Result<Vec<SimulationResult>, AppError> {
    validate_params(params)?;
    if codes.is_empty() {
        return Err(AppError::InvalidInput(
            "Select at least one product".to_string(),
        ));
    }

    tracing::info!(
        "Simulating {} products over {} months (rain={}, promotion={}, fair={})",
        codes.len(),
        params.months,
        params.has_rain,
        params.has_promotion,
        params.has_fair
    );

    codes
        .iter()
        .map(|code| {
            let product = catalog
                .get(code)
                .ok_or_else(|| AppError::NotFound(format!("Product {}", code)))?;
            let historical = catalog.history(code).to_vec();
            let predictions = forecaster.forecast(&historical, params);
            let total: u32 = predictions.iter().map(|p| p.sales).sum();

            Ok(SimulationResult {
                product_code: code.clone(),
                historical,
                predictions,
                stock: product.stock,
                stock_sufficient: product.stock >= total,
                shortfall: (product.stock < total).then(|| total - product.stock),
            })
        })
        .collect()
}
