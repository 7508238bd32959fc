use anyhow::Context;
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;
use std::str::FromStr;

/// Process configuration, read once at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// When unset the service runs on the in-process store.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub token_ttl_secs: i64,
    pub password_hash: PasswordHashConfig,
    pub cors_origin: String,
    pub request_timeout_secs: u64,
}

/// Argon2 cost parameters.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PasswordHashConfig {
    pub memory_kib: u32,
    pub iterations: u32,
}

impl Default for PasswordHashConfig {
    fn default() -> Self {
        Self {
            memory_kib: argon2::Params::DEFAULT_M_COST,
            iterations: argon2::Params::DEFAULT_T_COST,
        }
    }
}

pub const MIN_SECRET_LEN: usize = 32;
pub const MAX_TOKEN_TTL_SECS: i64 = 30 * 24 * 60 * 60;
pub const MAX_REQUEST_TIMEOUT_SECS: u64 = 60 * 60;

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let _ = dotenv().is_ok();

        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET missing, it is required")?;
        let defaults = PasswordHashConfig::default();

        let config = Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_or("PORT", 3001)?,
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.is_empty()),
            database_max_connections: parse_or("DATABASE_MAX_CONNECTIONS", 10)?,
            jwt_secret,
            token_ttl_secs: parse_or("TOKEN_TTL_SECS", 3600)?,
            password_hash: PasswordHashConfig {
                memory_kib: parse_or("PASSWORD_HASH_MEMORY_KIB", defaults.memory_kib)?,
                iterations: parse_or("PASSWORD_HASH_ITERATIONS", defaults.iterations)?,
            },
            cors_origin: env::var("CORS_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            request_timeout_secs: parse_or("REQUEST_TIMEOUT_SECS", 30)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Range checks for values that parse but cannot be used.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.jwt_secret.len() < MIN_SECRET_LEN {
            anyhow::bail!("JWT_SECRET must be at least {MIN_SECRET_LEN} bytes long");
        }
        if !(1..=MAX_TOKEN_TTL_SECS).contains(&self.token_ttl_secs) {
            anyhow::bail!("TOKEN_TTL_SECS must be between 1 and {MAX_TOKEN_TTL_SECS}");
        }
        if !(1..=MAX_REQUEST_TIMEOUT_SECS).contains(&self.request_timeout_secs) {
            anyhow::bail!("REQUEST_TIMEOUT_SECS must be between 1 and {MAX_REQUEST_TIMEOUT_SECS}");
        }
        Ok(())
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("{key} must be a valid {}", std::any::type_name::<T>())),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 3001,
        database_url: None,
        database_max_connections: 1,
        jwt_secret: "test-secret-key-at-least-32-bytes-long".to_string(),
        token_ttl_secs: 3600,
        password_hash: PasswordHashConfig {
            memory_kib: 256,
            iterations: 1,
        },
        cors_origin: "http://localhost:3000".to_string(),
        request_timeout_secs: 30,
    }
}
