use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;

// Leaderboard service configuration sourced from environment variables.
// Built once at process start and passed by reference; no hidden globals.
#[derive(Debug, Clone)]
pub struct LeaderboardConfig {
    // HTTP API bind address.
    pub bind_addr: SocketAddr,
    // Metrics HTTP listener bind address.
    pub metrics_bind: SocketAddr,
    // HS256 secret shared with the token issuer.
    pub token_secret: String,
    // Expected issuer claim on bearer tokens.
    pub token_issuer: String,
    // Expected audience claim on bearer tokens.
    pub token_audience: String,
    // Max time to wait for credential validation.
    pub identity_timeout_ms: u64,
    // Max time to wait for a store read or write.
    pub store_timeout_ms: u64,
    // Max time to wait for one push delivery; siblings are unaffected.
    pub push_timeout_ms: u64,
}

const DEFAULT_IDENTITY_TIMEOUT_MS: u64 = 2_000;
const DEFAULT_STORE_TIMEOUT_MS: u64 = 2_000;
const DEFAULT_PUSH_TIMEOUT_MS: u64 = 1_000;

#[derive(Debug, Deserialize)]
struct LeaderboardConfigOverride {
    bind_addr: Option<String>,
    metrics_bind: Option<String>,
    token_secret: Option<String>,
    token_issuer: Option<String>,
    token_audience: Option<String>,
    identity_timeout_ms: Option<u64>,
    store_timeout_ms: Option<u64>,
    push_timeout_ms: Option<u64>,
}

impl LeaderboardConfig {
    pub fn from_env() -> Result<Self> {
        // Environment variables provide defaults for local development.
        let bind_addr = std::env::var("CREST_BIND")
            .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
            .parse()
            .with_context(|| "parse CREST_BIND")?;
        let metrics_bind = std::env::var("CREST_METRICS_BIND")
            .unwrap_or_else(|_| "0.0.0.0:9100".to_string())
            .parse()
            .with_context(|| "parse CREST_METRICS_BIND")?;
        let token_secret =
            std::env::var("CREST_TOKEN_SECRET").unwrap_or_else(|_| "crest-dev-secret".to_string());
        let token_issuer =
            std::env::var("CREST_TOKEN_ISSUER").unwrap_or_else(|_| "crest-auth".to_string());
        let token_audience = std::env::var("CREST_TOKEN_AUDIENCE")
            .unwrap_or_else(|_| "crest-leaderboard".to_string());
        let identity_timeout_ms =
            env_u64("CREST_IDENTITY_TIMEOUT_MS", DEFAULT_IDENTITY_TIMEOUT_MS)?;
        let store_timeout_ms = env_u64("CREST_STORE_TIMEOUT_MS", DEFAULT_STORE_TIMEOUT_MS)?;
        let push_timeout_ms = env_u64("CREST_PUSH_TIMEOUT_MS", DEFAULT_PUSH_TIMEOUT_MS)?;
        Ok(Self {
            bind_addr,
            metrics_bind,
            token_secret,
            token_issuer,
            token_audience,
            identity_timeout_ms,
            store_timeout_ms,
            push_timeout_ms,
        })
    }

    pub fn from_env_or_yaml() -> Result<Self> {
        let mut config = Self::from_env()?;
        if let Ok(path) = std::env::var("CREST_CONFIG") {
            let contents =
                fs::read_to_string(&path).with_context(|| format!("read CREST_CONFIG: {path}"))?;
            let override_cfg: LeaderboardConfigOverride = serde_yaml::from_str(&contents)
                .with_context(|| "parse leaderboard config yaml")?;
            if let Some(value) = override_cfg.bind_addr {
                config.bind_addr = value.parse().with_context(|| "parse bind_addr")?;
            }
            if let Some(value) = override_cfg.metrics_bind {
                config.metrics_bind = value.parse().with_context(|| "parse metrics_bind")?;
            }
            if let Some(value) = override_cfg.token_secret {
                config.token_secret = value;
            }
            if let Some(value) = override_cfg.token_issuer {
                config.token_issuer = value;
            }
            if let Some(value) = override_cfg.token_audience {
                config.token_audience = value;
            }
            if let Some(value) = override_cfg.identity_timeout_ms {
                config.identity_timeout_ms = value;
            }
            if let Some(value) = override_cfg.store_timeout_ms {
                config.store_timeout_ms = value;
            }
            if let Some(value) = override_cfg.push_timeout_ms {
                config.push_timeout_ms = value;
            }
        }
        Ok(config)
    }
}

fn env_u64(key: &str, default: u64) -> Result<u64> {
    match std::env::var(key) {
        Ok(value) => value.parse().with_context(|| format!("parse {key}")),
        Err(_) => Ok(default),
    }
}
