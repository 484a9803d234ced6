use std::{fmt::Display, net::SocketAddr, str::FromStr, time::Duration};

use saweria_relay_core::{
    constants::{
        DEFAULT_CLEANUP_INTERVAL_SECS, DEFAULT_DELIVERED_RETENTION_SECS, DEFAULT_MAX_AGE_SECS,
        DEFAULT_QUEUE_CAPACITY,
    },
    RetentionPolicy,
};
use tracing::{info, warn};

/// Which repository backs the donation service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Sqlite,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(StorageBackend::Sqlite),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(format!("unknown storage backend '{other}'")),
        }
    }
}

pub struct Config {
    pub listen_addr: SocketAddr,
    pub storage: StorageBackend,
    pub db_path: String,
    pub queue_capacity: usize,
    pub retention: RetentionPolicy,
    pub cleanup_interval: Duration,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            storage: StorageBackend::Sqlite,
            db_path: "./db/donations.db".to_string(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            retention: RetentionPolicy {
                delivered_retention: Duration::from_secs(DEFAULT_DELIVERED_RETENTION_SECS),
                max_age: Duration::from_secs(DEFAULT_MAX_AGE_SECS),
            },
            cleanup_interval: Duration::from_secs(DEFAULT_CLEANUP_INTERVAL_SECS),
            cors_allow: vec!["*".to_string()],
            request_timeout: Duration::from_millis(30_000),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let host: String = env_or("RELAY_HOST", "0.0.0.0".to_string());
        let port: u16 = env_or("PORT", defaults.listen_addr.port());
        let listen_addr = format!("{host}:{port}").parse().unwrap_or_else(|e| {
            warn!("Invalid listen address {host}:{port}: {e}, using default");
            defaults.listen_addr
        });

        let cors_allow = std::env::var("RELAY_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Self {
            listen_addr,
            storage: env_or("RELAY_STORAGE", defaults.storage),
            db_path: env_or("RELAY_DB_PATH", defaults.db_path),
            queue_capacity: env_or("RELAY_QUEUE_CAPACITY", defaults.queue_capacity),
            retention: RetentionPolicy {
                delivered_retention: Duration::from_secs(env_or(
                    "RELAY_DELIVERED_RETENTION_SECS",
                    DEFAULT_DELIVERED_RETENTION_SECS,
                )),
                max_age: Duration::from_secs(env_or("RELAY_MAX_AGE_SECS", DEFAULT_MAX_AGE_SECS)),
            },
            cleanup_interval: Duration::from_secs(
                env_or("RELAY_CLEANUP_INTERVAL_SECS", DEFAULT_CLEANUP_INTERVAL_SECS).max(1),
            ),
            cors_allow,
            request_timeout: Duration::from_millis(env_or("RELAY_REQUEST_TIMEOUT_MS", 30_000u64)),
        }
    }
}

/// Reads `key`, falling back to `default` when unset or unparsable.
fn env_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: Display,
{
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|e| {
            warn!("Invalid {key} value '{raw}': {e}, using default");
            default
        }),
        Err(_) => {
            info!("{key} not set, using default");
            default
        }
    }
}
