use std::env;
use tracing_subscriber::EnvFilter;

const DEFAULT_CURRENCY: &str = "Rs";
const DEFAULT_LOG_FILTER: &str = "warn";

/// Runtime configuration read from the environment (and `.env`, if present).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub currency: String,
    pub log_filter: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            currency: DEFAULT_CURRENCY.to_string(),
            log_filter: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        Self {
            currency: non_empty("CASHFLOW_CURRENCY").unwrap_or(defaults.currency),
            log_filter: non_empty("CASHFLOW_LOG"),
        }
    }
}

/// Initialize logging and tracing; logs go to stderr so stdout carries only the plan.
pub fn init_logging(config: &AppConfig) {
    let filter = match &config.log_filter {
        Some(directives) => EnvFilter::try_new(directives).ok(),
        None => EnvFilter::try_from_default_env().ok(),
    }
    .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
