use std::env;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Session token settings shared by the auth extractor and the auth handlers.
#[derive(Clone)]
pub struct SessionConfig {
    pub jwt_secret: String,
    pub ttl_secs: i64,
    pub cookie_secure: bool,
}

/// Settings for the hosted payment provider.
#[derive(Clone)]
pub struct PaymentConfig {
    pub secret_key: String,
    pub webhook_secret: String,
    pub api_base: String,
    /// Frontend origin used to build checkout success/cancel URLs.
    pub app_base_url: String,
    pub currency: String,
}

/// In-process cache settings.
#[derive(Clone, Debug)]
pub struct CacheConfig {
    pub user_ttl: Duration,
    pub user_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            user_ttl: Duration::from_secs(60),
            user_capacity: 10_000,
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    pub run_migrations: bool,
    pub session: SessionConfig,
    pub payments: PaymentConfig,
    pub cache: CacheConfig,
}

impl AppConfig {
    /// Load configuration from the process environment (after `.env`).
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            database_url: required("DATABASE_URL")?,
            port: parsed("PORT", 8080)?,
            run_migrations: parsed("RUN_MIGRATIONS", true)?,
            session: SessionConfig {
                jwt_secret: required("JWT_SECRET")?,
                ttl_secs: parsed("SESSION_TTL_SECS", 7 * 24 * 3600)?,
                cookie_secure: parsed("COOKIE_SECURE", false)?,
            },
            payments: PaymentConfig {
                secret_key: required("STRIPE_SECRET_KEY")?,
                webhook_secret: required("STRIPE_WEBHOOK_SECRET")?,
                api_base: optional("PAYMENT_API_BASE", "https://api.stripe.com"),
                app_base_url: optional("APP_BASE_URL", "http://localhost:3000"),
                currency: optional("CURRENCY", "usd"),
            },
            cache: CacheConfig {
                user_ttl: Duration::from_secs(parsed("CACHE_TTL_USERS", 60)?),
                user_capacity: parsed("CACHE_CAPACITY_USERS", 10_000)?,
            },
        })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::Missing(name))
}

fn optional(name: &'static str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parsed<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}
