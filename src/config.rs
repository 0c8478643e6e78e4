use crate::origin::Origin;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

/// Runtime configuration for the widget server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub enable_cors: bool,
    pub script_cache_max_age: Duration,
    /// Fixed origin for generated iframes; overrides the request headers when set.
    pub public_origin: Option<Origin>,
    pub default_host: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            enable_cors: false,
            script_cache_max_age: Duration::from_secs(3600),
            public_origin: None,
            default_host: "localhost:3000".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Self::default();

        let bind_addr = match lookup("BIND_ADDR") {
            Some(raw) => raw.parse().context("failed to parse BIND_ADDR")?,
            None => defaults.bind_addr,
        };

        let enable_cors = lookup("ENABLE_CORS")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(defaults.enable_cors);

        let script_cache_max_age = match lookup("SCRIPT_CACHE_MAX_AGE_SECS") {
            Some(raw) => Duration::from_secs(
                raw.trim()
                    .parse::<u64>()
                    .context("failed to parse SCRIPT_CACHE_MAX_AGE_SECS")?,
            ),
            None => defaults.script_cache_max_age,
        };

        let public_origin = lookup("PUBLIC_ORIGIN")
            .filter(|v| !v.trim().is_empty())
            .map(|v| Origin::parse(v.trim()))
            .transpose()
            .context("failed to parse PUBLIC_ORIGIN")?;

        let default_host = lookup("DEFAULT_HOST")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.default_host);

        Ok(Self {
            bind_addr,
            enable_cors,
            script_cache_max_age,
            public_origin,
            default_host,
        })
    }

    pub fn cache_control(&self) -> String {
        format!("public, max-age={}", self.script_cache_max_age.as_secs())
    }
}
