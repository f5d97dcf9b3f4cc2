use serde::Deserialize;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // Database configuration
    pub database_url: String,
    pub db_max_connections: u32,

    // Refresh policy
    /// Cached records older than this are recalculated before being served
    pub staleness_window_hours: i64,

    // Calculation limits
    /// Overall budget for the multi-query metrics gather, per user
    pub metrics_timeout_secs: u64,
    /// Most recent history entries to keep; `None` keeps everything
    pub history_max_entries: Option<usize>,

    // Post-report recalculation
    pub report_recalc_delay_ms: u64,

    // Service configuration
    pub service_name: String,
    pub environment: String,
}

impl Config {
    pub fn from_env() -> Result<Self, crate::error::ReputationError> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").map_err(|_| {
            crate::error::ReputationError::Config("DATABASE_URL must be set".to_string())
        })?;

        Ok(Self {
            database_url,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "20".to_string())
                .parse()
                .unwrap_or(20),
            staleness_window_hours: env::var("STALENESS_WINDOW_HOURS")
                .unwrap_or_else(|_| "24".to_string())
                .parse()
                .unwrap_or(24),
            metrics_timeout_secs: env::var("METRICS_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),
            history_max_entries: env::var("HISTORY_MAX_ENTRIES")
                .ok()
                .and_then(|v| v.parse().ok()),
            report_recalc_delay_ms: env::var("REPORT_RECALC_DELAY_MS")
                .unwrap_or_else(|_| "500".to_string())
                .parse()
                .unwrap_or(500),
            service_name: env::var("SERVICE_NAME")
                .unwrap_or_else(|_| "reputation-service".to_string()),
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
        })
    }

    pub fn metrics_timeout(&self) -> Duration {
        Duration::from_secs(self.metrics_timeout_secs)
    }

    pub fn report_recalc_delay(&self) -> Duration {
        Duration::from_millis(self.report_recalc_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        env::set_var("DATABASE_URL", "postgres://test");
        let config = Config::from_env().unwrap();
        assert_eq!(config.staleness_window_hours, 24);
        assert_eq!(config.metrics_timeout_secs, 10);
        assert_eq!(config.history_max_entries, None);
        assert_eq!(config.service_name, "reputation-service");
    }
}
