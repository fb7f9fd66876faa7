use std::{net::SocketAddr, str::FromStr, time::Duration};

use anyhow::Context;
use quotebook_connect::{QuoteMapping, DEFAULT_REMOTE_URL};
use quotebook_core::constants::DEFAULT_SYNC_INTERVAL_SECS;
use quotebook_core::sync::MergePolicyKind;
use tracing::warn;

pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    pub remote_url: String,
    pub remote_mapping: QuoteMapping,
    /// `None` disables the background scheduler
    pub sync_interval: Option<Duration>,
    pub merge_policy: MergePolicyKind,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    ///
    /// Invalid values fall back to their defaults with a warning; only an
    /// unparsable listen address is an error.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let listen_raw = lookup("QB_LISTEN_ADDR").unwrap_or_else(|| "0.0.0.0:8080".to_string());
        let listen_addr: SocketAddr = listen_raw
            .parse()
            .with_context(|| format!("Invalid QB_LISTEN_ADDR '{}'", listen_raw))?;

        let db_path = lookup("QB_DB_PATH").unwrap_or_else(|| "./db/quotebook.db".into());
        let remote_url = lookup("QB_REMOTE_URL").unwrap_or_else(|| DEFAULT_REMOTE_URL.into());
        let remote_mapping = parse_or_default(&lookup, "QB_REMOTE_MAPPING", QuoteMapping::default());
        let merge_policy = parse_or_default(&lookup, "QB_MERGE_POLICY", MergePolicyKind::default());

        let interval_secs: u64 =
            parse_or_default(&lookup, "QB_SYNC_INTERVAL_SECS", DEFAULT_SYNC_INTERVAL_SECS);
        let sync_interval = (interval_secs > 0).then(|| Duration::from_secs(interval_secs));

        let cors_allow = lookup("QB_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let timeout_ms: u64 = parse_or_default(&lookup, "QB_REQUEST_TIMEOUT_MS", 30000);

        Ok(Self {
            listen_addr,
            db_path,
            remote_url,
            remote_mapping,
            sync_interval,
            merge_policy,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
        })
    }
}

fn parse_or_default<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|e| {
            warn!("Ignoring invalid {} '{}': {}", key, raw, e);
            default
        }),
    }
}
