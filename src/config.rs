use std::time::Duration;

use anyhow::{Context, Result};

use crate::mqtt::BrokerAddress;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub mqtt_broker: BrokerAddress,
    pub mqtt_username: Option<String>,
    pub mqtt_password: Option<String>,
    pub mqtt_client_id: String,
    /// Connect timeout handed to the MQTT client, in seconds.
    pub mqtt_connect_timeout_secs: u64,
    pub mqtt_keep_alive_secs: u64,
    /// Bound of the queue between the MQTT event loop and the ingest worker.
    pub ingest_queue_capacity: usize,
    pub server_host: String,
    pub server_port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. `from_env` is the only
    /// production caller; tests feed a map instead of mutating the process
    /// environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| -> Result<String> {
            lookup(key).with_context(|| format!("missing required env var: {key}"))
        };
        let optional = |key: &str, default: &str| -> String {
            lookup(key).unwrap_or_else(|| default.to_owned())
        };

        let broker_url = required("MQTT_BROKER_URL")?;
        let mqtt_broker = broker_url
            .parse::<BrokerAddress>()
            .with_context(|| format!("MQTT_BROKER_URL is not a valid broker URL: {broker_url:?}"))?;

        let ingest_queue_capacity: usize = optional("INGEST_QUEUE_CAPACITY", "100")
            .parse()
            .context("INGEST_QUEUE_CAPACITY must be a positive integer")?;
        anyhow::ensure!(
            ingest_queue_capacity > 0,
            "INGEST_QUEUE_CAPACITY must be greater than zero"
        );

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            mqtt_broker,
            mqtt_username: lookup("MQTT_USER").filter(|s| !s.is_empty()),
            mqtt_password: lookup("MQTT_PASS"),
            mqtt_client_id: optional("MQTT_CLIENT_ID", "cooling-system-bridge"),
            mqtt_connect_timeout_secs: optional("MQTT_CONNECT_TIMEOUT_SECS", "10")
                .parse()
                .context("MQTT_CONNECT_TIMEOUT_SECS must be a positive integer")?,
            mqtt_keep_alive_secs: optional("MQTT_KEEP_ALIVE_SECS", "30")
                .parse()
                .context("MQTT_KEEP_ALIVE_SECS must be a positive integer")?,
            ingest_queue_capacity,
            server_host: optional("SERVER_HOST", "0.0.0.0"),
            server_port: optional("PORT", "3000")
                .parse()
                .context("PORT must be a valid port number")?,
        })
    }

    pub fn mqtt_keep_alive(&self) -> Duration {
        Duration::from_secs(self.mqtt_keep_alive_secs)
    }
}
