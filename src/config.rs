/*
 * Responsibility
 * - Load settings from the environment (.env supported)
 * - Validate them; a missing or invalid value aborts startup
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::services::auth::KeyAlgorithm;

const MAX_JWKS_TIMEOUT_SECONDS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn parse(value: Option<&str>) -> Self {
        match value
            .unwrap_or("development")
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Clone)]
pub struct Config {
    pub addr: SocketAddr,

    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,

    // identity provider base URL, no trailing slash
    pub supabase_url: String,
    pub supabase_anon_key: String,

    pub jwks_timeout: Duration,
    // Zero disables caching: every verification refetches the key set.
    pub jwks_cache_ttl: Duration,
    pub default_key_alg: Option<KeyAlgorithm>,
    pub jwt_leeway_seconds: u64,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print the api key
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("app_env", &self.app_env)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("supabase_url", &self.supabase_url)
            .field("jwks_timeout", &self.jwks_timeout)
            .field("jwks_cache_ttl", &self.jwks_cache_ttl)
            .field("default_key_alg", &self.default_key_alg)
            .field("jwt_leeway_seconds", &self.jwt_leeway_seconds)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build from any key → value lookup (the process env in production).
    pub fn from_vars<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port: u16 = match var("PORT") {
            Some(s) => s.parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 3000,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(var("APP_ENV").as_deref());

        let cors_allowed_origins = var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let supabase_url = var("SUPABASE_URL").ok_or(ConfigError::Missing("SUPABASE_URL"))?;
        let supabase_url = normalize_base_url(&supabase_url)?;

        let supabase_anon_key = var("SUPABASE_ANON_KEY")
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::Missing("SUPABASE_ANON_KEY"))?;

        let jwks_timeout_seconds = match var("JWKS_TIMEOUT_SECONDS") {
            Some(s) => s
                .parse::<u64>()
                .map_err(|_| ConfigError::Invalid("JWKS_TIMEOUT_SECONDS"))?,
            None => MAX_JWKS_TIMEOUT_SECONDS,
        };
        let jwks_timeout =
            Duration::from_secs(jwks_timeout_seconds.clamp(1, MAX_JWKS_TIMEOUT_SECONDS));

        let jwks_cache_ttl = match var("JWKS_CACHE_TTL_SECONDS") {
            Some(s) => Duration::from_secs(
                s.parse::<u64>()
                    .map_err(|_| ConfigError::Invalid("JWKS_CACHE_TTL_SECONDS"))?,
            ),
            None => Duration::ZERO,
        };

        let default_key_alg = match var("JWT_DEFAULT_KEY_ALG").as_deref() {
            None => Some(KeyAlgorithm::Es256),
            Some(s) if s.eq_ignore_ascii_case("none") => None,
            Some(s) => Some(
                s.parse::<KeyAlgorithm>()
                    .map_err(|_| ConfigError::Invalid("JWT_DEFAULT_KEY_ALG"))?,
            ),
        };

        let jwt_leeway_seconds = match var("JWT_LEEWAY_SECONDS") {
            Some(s) => s
                .parse::<u64>()
                .map_err(|_| ConfigError::Invalid("JWT_LEEWAY_SECONDS"))?,
            None => 0,
        };

        Ok(Self {
            addr,
            app_env,
            cors_allowed_origins,
            supabase_url,
            supabase_anon_key,
            jwks_timeout,
            jwks_cache_ttl,
            default_key_alg,
            jwt_leeway_seconds,
        })
    }
}

fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let url = url::Url::parse(raw.trim()).map_err(|_| ConfigError::Invalid("SUPABASE_URL"))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(ConfigError::Invalid("SUPABASE_URL"));
    }
    Ok(url.as_str().trim_end_matches('/').to_string())
}
