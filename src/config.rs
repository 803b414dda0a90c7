// src/config.rs

use anyhow::{Context, Result};
use std::env;
use std::net::SocketAddr;
use tracing::warn;
use url::Url;

pub const UPSTREAM_URL_VAR: &str = "LOANLENS_UPSTREAM_URL";
pub const AUTH_KEY_VAR: &str = "LOANLENS_AUTH_KEY";
pub const BIND_ADDR_VAR: &str = "LOANLENS_BIND_ADDR";

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8787";

/// Runtime configuration for the proxy, read from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub upstream_url: Url,
    pub bind_addr: SocketAddr,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let raw_upstream = env::var(UPSTREAM_URL_VAR)
            .with_context(|| format!("{} must be set", UPSTREAM_URL_VAR))?;
        let upstream_url = Url::parse(&raw_upstream)
            .with_context(|| format!("invalid upstream URL '{}'", raw_upstream))?;

        let raw_bind = env::var(BIND_ADDR_VAR).unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let bind_addr: SocketAddr = raw_bind
            .parse()
            .with_context(|| format!("invalid bind address '{}'", raw_bind))?;

        if env::var(AUTH_KEY_VAR).is_err() {
            warn!("{} is not set; POST forwards will carry an empty authKey", AUTH_KEY_VAR);
        }

        Ok(Config {
            upstream_url,
            bind_addr,
        })
    }
}

/// The write credential, read at request time so a restart is not needed to
/// pick up a rotated value. Absence degrades to an empty string.
pub fn auth_key() -> String {
    match env::var(AUTH_KEY_VAR) {
        Ok(k) => k,
        Err(_) => {
            warn!("{} missing at request time", AUTH_KEY_VAR);
            String::new()
        }
    }
}
