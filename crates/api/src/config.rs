//! Application configuration loaded from environment variables.

use fulfillment::{CoordinatorConfig, DEFAULT_ORDER_NUMBER_PREFIX};

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `3000`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `DATABASE_URL`: PostgreSQL URL; unset runs on the in-memory store
/// - `ORDER_NUMBER_PREFIX`: order number prefix (default: `"wanttar"`)
/// - `SERVICE_CHARGE_RATE`: platform fee in `[0, 1)` (default: `0.10`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub database_url: Option<String>,
    pub order_number_prefix: String,
    pub service_charge_rate: f64,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("HOST").unwrap_or(defaults.host),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            log_level: std::env::var("RUST_LOG").unwrap_or(defaults.log_level),
            database_url: std::env::var("DATABASE_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            order_number_prefix: std::env::var("ORDER_NUMBER_PREFIX")
                .ok()
                .filter(|prefix| !prefix.trim().is_empty())
                .unwrap_or(defaults.order_number_prefix),
            service_charge_rate: parse_service_charge_rate(
                std::env::var("SERVICE_CHARGE_RATE").ok().as_deref(),
            ),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the order coordinator's share of the configuration.
    pub fn coordinator(&self) -> CoordinatorConfig {
        CoordinatorConfig {
            order_number_prefix: self.order_number_prefix.clone(),
            service_charge_rate: self.service_charge_rate,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let coordinator = CoordinatorConfig::default();
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            database_url: None,
            order_number_prefix: DEFAULT_ORDER_NUMBER_PREFIX.to_string(),
            service_charge_rate: coordinator.service_charge_rate,
        }
    }
}

/// Parses a service charge rate, falling back to the default when the
/// value is missing, unparsable or outside `[0, 1)`.
fn parse_service_charge_rate(raw: Option<&str>) -> f64 {
    let default = CoordinatorConfig::default().service_charge_rate;
    match raw.map(|r| r.trim().parse::<f64>()) {
        Some(Ok(rate)) if (0.0..1.0).contains(&rate) => rate,
        Some(_) => {
            tracing::warn!(?raw, default, "invalid SERVICE_CHARGE_RATE, using default");
            default
        }
        None => default,
    }
}
