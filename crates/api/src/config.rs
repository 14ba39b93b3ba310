//! Application configuration loaded from environment variables.

use std::time::Duration;

const DEFAULT_PORT: u16 = 8082;
const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `8082`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `USER_SERVICE_ADDR`: identity service gRPC address (default: `"http://localhost:50051"`)
/// - `PRODUCT_SERVICE_BASEURL`: catalog base URL (default: `"http://localhost:8081"`)
/// - `DATABASE_URL`: PostgreSQL URL; orders are kept in memory when unset
/// - `COLLABORATOR_TIMEOUT_MS`: per-call timeout for remote services (default: `5000`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub user_service_addr: String,
    pub product_service_base_url: String,
    pub database_url: Option<String>,
    pub collaborator_timeout: Duration,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup.
    ///
    /// Empty and unparsable values fall back to the default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            host: get("HOST").unwrap_or(defaults.host),
            port: get("PORT")
                .and_then(|p| p.trim().parse().ok())
                .unwrap_or(defaults.port),
            log_level: get("RUST_LOG").unwrap_or(defaults.log_level),
            user_service_addr: get("USER_SERVICE_ADDR").unwrap_or(defaults.user_service_addr),
            product_service_base_url: get("PRODUCT_SERVICE_BASEURL")
                .unwrap_or(defaults.product_service_base_url),
            database_url: get("DATABASE_URL"),
            collaborator_timeout: get("COLLABORATOR_TIMEOUT_MS")
                .and_then(|ms| ms.trim().parse::<u64>().ok())
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis)
                .unwrap_or(defaults.collaborator_timeout),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            log_level: "info".to_string(),
            user_service_addr: "http://localhost:50051".to_string(),
            product_service_base_url: "http://localhost:8081".to_string(),
            database_url: None,
            collaborator_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn from_pairs(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8082);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.user_service_addr, "http://localhost:50051");
        assert_eq!(config.product_service_base_url, "http://localhost:8081");
        assert!(config.database_url.is_none());
        assert_eq!(config.collaborator_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_addr_formatting() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 8080,
            ..Config::default()
        };
        assert_eq!(config.addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_values_read_from_lookup() {
        let config = from_pairs(&[
            ("PORT", "9000"),
            ("USER_SERVICE_ADDR", "users:50051"),
            ("PRODUCT_SERVICE_BASEURL", "http://catalog:8081"),
            ("DATABASE_URL", "postgres://orders@db/orders"),
            ("COLLABORATOR_TIMEOUT_MS", "250"),
        ]);
        assert_eq!(config.port, 9000);
        assert_eq!(config.user_service_addr, "users:50051");
        assert_eq!(config.product_service_base_url, "http://catalog:8081");
        assert_eq!(config.database_url.as_deref(), Some("postgres://orders@db/orders"));
        assert_eq!(config.collaborator_timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_bad_values_fall_back_to_defaults() {
        let config = from_pairs(&[
            ("PORT", "eighty"),
            ("DATABASE_URL", "  "),
            ("COLLABORATOR_TIMEOUT_MS", "0"),
        ]);
        assert_eq!(config.port, 8082);
        assert!(config.database_url.is_none());
        assert_eq!(config.collaborator_timeout, Duration::from_secs(5));
    }
}
