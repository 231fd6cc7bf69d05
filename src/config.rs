use std::{fmt::Display, net::SocketAddr, str::FromStr, time::Duration};

use anyhow::{anyhow, bail};

/// Settings read from the environment (and `.env`, if present).
#[derive(Debug, Clone)]
pub struct Config {
    /// Anything sqlx's SQLite driver accepts, e.g. `sqlite://chat.db?mode=rwc`.
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub max_connections: u32,
    /// How long a participant may go without a heartbeat.
    pub stale_after: Duration,
    pub sweep_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite::memory:".to_owned(),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 5000)),
            max_connections: 16,
            stale_after: Duration::from_secs(10),
            sweep_interval: Duration::from_secs(15),
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key: &str| dotenv::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Self::default();

        let sweep_interval = Duration::from_secs(parse(
            &lookup,
            "SWEEP_INTERVAL_SECS",
            defaults.sweep_interval.as_secs(),
        )?);
        if sweep_interval.is_zero() {
            bail!("SWEEP_INTERVAL_SECS must be at least 1");
        }

        Ok(Self {
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            bind_addr: parse(&lookup, "BIND_ADDR", defaults.bind_addr)?,
            max_connections: parse(&lookup, "MAX_CONNECTIONS", defaults.max_connections)?,
            stale_after: Duration::from_secs(parse(
                &lookup,
                "STALE_AFTER_SECS",
                defaults.stale_after.as_secs(),
            )?),
            sweep_interval,
        })
    }
}

fn parse<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|err| anyhow!("{key}={raw:?} is invalid: {err}")),
        None => Ok(default),
    }
}
