use std::path::PathBuf;

use anyhow::{Context, Result, bail};

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "dev-secret-change-me",
    "secret",
];

const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

/// Token settings, fixed for the life of the process.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl: chrono::Duration,
}

impl AuthConfig {
    pub fn new(jwt_secret: impl Into<String>, token_ttl: chrono::Duration) -> Result<Self> {
        let jwt_secret = jwt_secret.into();
        if jwt_secret.trim().is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("MIXBOARD_JWT_SECRET is unset or still a placeholder");
        }
        if token_ttl <= chrono::Duration::zero() {
            bail!("token lifetime must be positive");
        }
        Ok(Self {
            jwt_secret,
            token_ttl,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub auth: AuthConfig,
    pub db_path: PathBuf,
    pub host: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup. Fails on the first bad value so
    /// the server refuses to start rather than erroring per request.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let ttl_hours: i64 = match lookup("MIXBOARD_TOKEN_TTL_HOURS") {
            Some(v) => v.parse().context("MIXBOARD_TOKEN_TTL_HOURS must be an integer")?,
            None => DEFAULT_TOKEN_TTL_HOURS,
        };
        let token_ttl = chrono::Duration::try_hours(ttl_hours)
            .context("MIXBOARD_TOKEN_TTL_HOURS is out of range")?;
        let auth = AuthConfig::new(lookup("MIXBOARD_JWT_SECRET").unwrap_or_default(), token_ttl)?;

        let port: u16 = lookup("MIXBOARD_PORT")
            .unwrap_or_else(|| "3000".into())
            .parse()
            .context("MIXBOARD_PORT must be a port number")?;

        Ok(Self {
            auth,
            db_path: lookup("MIXBOARD_DB_PATH").unwrap_or_else(|| "mixboard.db".into()).into(),
            host: lookup("MIXBOARD_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
        })
    }
}
