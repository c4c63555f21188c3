//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional; defaults target local development.
//!
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront (default: http://localhost:3000)
//! - `STOREFRONT_DATA_DIR` - Directory holding the JSON slots (default: ./data)
//! - `STOREFRONT_EPHEMERAL` - Keep all slots in memory instead (default: false)
//! - `PRODUCT_API_URL` - Product API base URL (default: <https://fakestoreapi.com>)
//! - `PRODUCT_CACHE_TTL_SECS` - Product API cache TTL (default: 300)
//! - `CONTACT_RELAY_URL` - Formspree-compatible endpoint for the contact form
//! - `STOREFRONT_TAX_RATE` - Sales tax applied at checkout (default: 0.08)
//! - `STOREFRONT_LOW_STOCK_THRESHOLD` - Stock level below which items are flagged (default: 10)
//! - `STOREFRONT_DEMO_ACCOUNTS` - Accept the built-in demo logins (default: true)
//! - `STOREFRONT_ALLOW_ADMIN_SIGNUP` - Let signup request the admin role (default: false)
//! - `STOREFRONT_RATE_LIMIT` - Rate limit `/api/auth` (default: true)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_PRODUCT_API_URL: &str = "https://fakestoreapi.com";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Where slots are persisted
    pub storage: StorageConfig,
    /// Product API client configuration
    pub catalog: CatalogConfig,
    /// Contact form relay endpoint (contains the form id)
    pub contact_relay_url: Option<SecretString>,
    /// Shop rules: tax, stock alerts, demo logins
    pub shop: ShopConfig,
    /// Whether `/api/auth` is rate limited
    pub rate_limiting: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Slot storage backend selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    /// One JSON file per slot under this directory.
    Directory(PathBuf),
    /// In-process only; everything is lost on restart.
    Ephemeral,
}

/// Product API configuration.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Base URL, e.g. `https://fakestoreapi.com`
    pub base_url: Url,
    /// How long product responses are cached
    pub cache_ttl: Duration,
}

/// Business rules that vary per deployment.
#[derive(Debug, Clone)]
pub struct ShopConfig {
    /// Sales tax rate applied to the cart subtotal at checkout
    pub tax_rate: Decimal,
    /// Items with less stock than this are reported as low stock
    pub low_stock_threshold: u32,
    /// Accept the built-in `user@demo.com` / `admin@demo.com` logins
    pub demo_accounts: bool,
    /// Allow signup requests to create admin users
    pub allow_admin_signup: bool,
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            tax_rate: Decimal::new(8, 2),
            low_stock_threshold: 10,
            demo_accounts: true,
            allow_admin_signup: false,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = parse_env("STOREFRONT_HOST", "127.0.0.1")?;
        let port = parse_env("STOREFRONT_PORT", "3000")?;
        let base_url = get_env_or_default("STOREFRONT_BASE_URL", "http://localhost:3000");

        let storage = if parse_bool_env("STOREFRONT_EPHEMERAL", false)? {
            StorageConfig::Ephemeral
        } else {
            StorageConfig::Directory(PathBuf::from(get_env_or_default(
                "STOREFRONT_DATA_DIR",
                "./data",
            )))
        };

        let catalog = CatalogConfig::from_env()?;
        let contact_relay_url = get_optional_env("CONTACT_RELAY_URL").map(SecretString::from);
        let shop = ShopConfig::from_env()?;
        let rate_limiting = parse_bool_env("STOREFRONT_RATE_LIMIT", true)?;

        Ok(Self {
            host,
            port,
            base_url,
            storage,
            catalog,
            contact_relay_url,
            shop,
            rate_limiting,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// In-memory configuration pointed at the given product API.
    ///
    /// Used by tests and the CLI's dry runs: no files, no rate limiting,
    /// no Sentry.
    #[must_use]
    pub fn ephemeral(product_api_url: Url) -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            storage: StorageConfig::Ephemeral,
            catalog: CatalogConfig {
                base_url: product_api_url,
                cache_ttl: Duration::from_secs(300),
            },
            contact_relay_url: None,
            shop: ShopConfig::default(),
            rate_limiting: false,
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl CatalogConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let raw = get_env_or_default("PRODUCT_API_URL", DEFAULT_PRODUCT_API_URL);
        let base_url = Url::parse(&raw)
            .map_err(|e| ConfigError::InvalidEnvVar("PRODUCT_API_URL".to_string(), e.to_string()))?;
        let ttl_secs: u64 = parse_env("PRODUCT_CACHE_TTL_SECS", "300")?;

        Ok(Self {
            base_url,
            cache_ttl: Duration::from_secs(ttl_secs),
        })
    }
}

impl ShopConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let tax_rate: Decimal = parse_env("STOREFRONT_TAX_RATE", "0.08")?;
        if tax_rate.is_sign_negative() || tax_rate >= Decimal::ONE {
            return Err(ConfigError::InvalidEnvVar(
                "STOREFRONT_TAX_RATE".to_string(),
                format!("must be in [0, 1), got {tax_rate}"),
            ));
        }

        Ok(Self {
            tax_rate,
            low_stock_threshold: parse_env("STOREFRONT_LOW_STOCK_THRESHOLD", "10")?,
            demo_accounts: parse_bool_env("STOREFRONT_DEMO_ACCOUNTS", true)?,
            allow_admin_signup: parse_bool_env("STOREFRONT_ALLOW_ADMIN_SIGNUP", false)?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable. Empty values count as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse a boolean flag (`true/false`, `1/0`, `yes/no`, `on/off`).
fn parse_bool_env(key: &str, default: bool) -> Result<bool, ConfigError> {
    match get_optional_env(key) {
        None => Ok(default),
        Some(value) => parse_bool(&value)
            .ok_or_else(|| ConfigError::InvalidEnvVar(key.to_string(), format!("not a boolean: {value}"))),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool(" off "), Some(false));
        assert_eq!(parse_bool("1"), Some(true));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn test_shop_defaults() {
        let shop = ShopConfig::default();
        assert_eq!(shop.tax_rate, Decimal::new(8, 2));
        assert_eq!(shop.low_stock_threshold, 10);
        assert!(shop.demo_accounts);
        assert!(!shop.allow_admin_signup);
    }

    #[test]
    fn test_ephemeral_config() {
        let config = StorefrontConfig::ephemeral(Url::parse("http://127.0.0.1:9999").unwrap());
        assert_eq!(config.storage, StorageConfig::Ephemeral);
        assert!(!config.rate_limiting);
        assert_eq!(config.catalog.base_url.as_str(), "http://127.0.0.1:9999/");
    }

    #[test]
    fn test_socket_addr() {
        let mut config = StorefrontConfig::ephemeral(Url::parse("http://localhost").unwrap());
        config.port = 8080;
        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 8080);
    }

    #[test]
    fn test_debug_redacts_contact_relay() {
        let mut config = StorefrontConfig::ephemeral(Url::parse("http://localhost").unwrap());
        config.contact_relay_url = Some(SecretString::from("https://formspree.io/f/secretform"));
        let debug_output = format!("{config:?}");
        assert!(!debug_output.contains("secretform"));
    }
}
