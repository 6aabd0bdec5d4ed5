use anyhow::{bail, Context};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
}

/// Argon2 cost parameters.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub struct HashConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashConfig {
    fn default() -> Self {
        Self {
            memory_kib: 19_456,
            iterations: 2,
            parallelism: 1,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub host: String,
    pub port: u16,
    pub jwt: JwtConfig,
    pub hash: HashConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source. Required values
    /// that are missing or blank are an error.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> anyhow::Result<String> {
            match lookup(key) {
                Some(v) if !v.trim().is_empty() => Ok(v),
                _ => bail!("{key} missing in environment"),
            }
        };
        let optional = |key: &str, default: &str| -> String {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let database_url = required("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: required("JWT_SECRET")?,
            issuer: optional("JWT_ISSUER", "account-service"),
            audience: optional("JWT_AUDIENCE", "account-service-users"),
        };

        let defaults = HashConfig::default();
        let hash = HashConfig {
            memory_kib: parse_or(&lookup, "ARGON2_MEMORY_KIB", defaults.memory_kib)?,
            iterations: parse_or(&lookup, "ARGON2_ITERATIONS", defaults.iterations)?,
            parallelism: parse_or(&lookup, "ARGON2_PARALLELISM", defaults.parallelism)?,
        };

        let port = match lookup("APP_PORT").or_else(|| lookup("PORT")) {
            Some(v) => v
                .trim()
                .parse::<u16>()
                .with_context(|| format!("invalid port {v:?}"))?,
            None => 3001,
        };

        Ok(Self {
            database_url,
            max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?,
            host: optional("APP_HOST", "0.0.0.0"),
            port,
            jwt,
            hash,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(v) if !v.trim().is_empty() => v
            .trim()
            .parse::<T>()
            .with_context(|| format!("invalid value for {key}: {v:?}")),
        _ => Ok(default),
    }
}
