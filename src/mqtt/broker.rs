use std::{fmt, str::FromStr};

use thiserror::Error;

const DEFAULT_PORT: u16 = 1883;
const DEFAULT_TLS_PORT: u16 = 8883;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BrokerUrlError {
    #[error("broker URL is empty")]
    Empty,
    #[error("unsupported broker URL scheme: {0:?}")]
    UnsupportedScheme(String),
    #[error("invalid port in broker URL: {0:?}")]
    InvalidPort(String),
}

/// Where the MQTT broker lives and whether the connection is TLS.
///
/// Accepts `mqtt://`, `tcp://`, `mqtts://`, `ssl://` or a bare `host[:port]`.
/// Bare hosts are plain TCP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerAddress {
    pub host: String,
    pub port: u16,
    pub tls: bool,
}

impl FromStr for BrokerAddress {
    type Err = BrokerUrlError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(BrokerUrlError::Empty);
        }

        let (tls, rest) = match raw.split_once("://") {
            Some(("mqtt" | "tcp", rest)) => (false, rest),
            Some(("mqtts" | "ssl", rest)) => (true, rest),
            Some((scheme, _)) => return Err(BrokerUrlError::UnsupportedScheme(scheme.to_owned())),
            None => (false, raw),
        };

        // Anything after the authority (e.g. a websocket path) is not ours.
        let authority = rest.split('/').next().unwrap_or_default();

        let (host, port) = match authority.rsplit_once(':') {
            Some((host, port)) => {
                let port = port
                    .parse::<u16>()
                    .map_err(|_| BrokerUrlError::InvalidPort(port.to_owned()))?;
                (host, port)
            }
            None if tls => (authority, DEFAULT_TLS_PORT),
            None => (authority, DEFAULT_PORT),
        };

        if host.is_empty() {
            return Err(BrokerUrlError::Empty);
        }

        Ok(Self {
            host: host.to_owned(),
            port,
            tls,
        })
    }
}

impl fmt::Display for BrokerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scheme = if self.tls { "mqtts" } else { "mqtt" };
        write!(f, "{scheme}://{}:{}", self.host, self.port)
    }
}
