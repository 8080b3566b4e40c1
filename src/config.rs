use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::net::SocketAddr;
use std::str::FromStr;

use crate::services::csv::PREVIEW_ROWS;

const DEFAULT_PRODUCT_API_BASE_URL: &str = "http://127.0.0.1:8000/api";

fn default_max_file_size() -> usize {
    // 10 MB in bytes
    10 * 1024 * 1024
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub max_file_size: usize,
    pub product_api_base_url: String,
    pub preview_rows: usize,
    /// Fixes the mock forecaster's random stream when set.
    pub simulation_seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            max_file_size: default_max_file_size(),
            product_api_base_url: DEFAULT_PRODUCT_API_BASE_URL.to_string(),
            preview_rows: PREVIEW_ROWS,
            simulation_seed: None,
        }
    }
}

impl Config {
    /// Builds a config from an arbitrary variable lookup, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let bind_addr = parse_var(&lookup, "BIND_ADDR")?.unwrap_or(defaults.bind_addr);
        let max_file_size = parse_var(&lookup, "MAX_FILE_SIZE")?.unwrap_or(defaults.max_file_size);
        let preview_rows = parse_var(&lookup, "PREVIEW_ROWS")?.unwrap_or(defaults.preview_rows);
        let simulation_seed = parse_var(&lookup, "SIMULATION_SEED")?;
        let product_api_base_url = lookup("PRODUCT_API_BASE_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.product_api_base_url);

        Ok(Config {
            bind_addr,
            max_file_size,
            product_api_base_url,
            preview_rows,
            simulation_seed,
        })
    }
}

fn parse_var<T, F>(lookup: &F, name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .with_context(|| format!("Invalid value for {}: {:?}", name, raw)),
        _ => Ok(None),
    }
}

pub fn load_config() -> Result<Config> {
    // Load .env file first
    dotenv().ok();

    let config = Config::from_lookup(|name| std::env::var(name).ok())?;
    tracing::info!(
        "Configuration loaded: bind={}, max_file_size={}B, registry={}",
        config.bind_addr,
        config.max_file_size,
        config.product_api_base_url
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:3000");
        assert_eq!(config.max_file_size, 10 * 1024 * 1024);
        assert_eq!(config.preview_rows, 3);
        assert_eq!(config.product_api_base_url, "http://127.0.0.1:8000/api");
        assert!(config.simulation_seed.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("BIND_ADDR", "0.0.0.0:8080"),
            ("MAX_FILE_SIZE", "2048"),
            ("PREVIEW_ROWS", "5"),
            ("SIMULATION_SEED", "42"),
            ("PRODUCT_API_BASE_URL", "http://registry.local/api"),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.max_file_size, 2048);
        assert_eq!(config.preview_rows, 5);
        assert_eq!(config.simulation_seed, Some(42));
        assert_eq!(config.product_api_base_url, "http://registry.local/api");
    }

    #[test]
    fn test_invalid_number_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[("MAX_FILE_SIZE", "lots")])).unwrap_err();
        assert!(err.to_string().contains("MAX_FILE_SIZE"));
    }
}
