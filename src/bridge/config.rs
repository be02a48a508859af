//! Gateway configuration

use std::net::SocketAddr;

use crate::client::ClientConfig;

/// Environment variable holding the gateway listen port
pub const PORT_ENV: &str = "PORT";

/// Port used when `PORT` is unset or unparsable
pub const DEFAULT_PORT: u16 = 8080;

/// Push-transport gateway configuration
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Address the HTTP/WebSocket listener binds to
    pub bind_addr: SocketAddr,

    /// Upstream streaming-transport client
    pub client: ClientConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            client: ClientConfig::default(),
        }
    }
}

impl GatewayConfig {
    /// Listen port from `PORT`, upstream target from `STREAMSWITCH_TARGET`
    pub fn from_env() -> Self {
        let port = std::env::var(PORT_ENV).ok();
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], Self::resolve_port(port.as_deref()))),
            client: ClientConfig::from_flag_or_env(None),
        }
    }

    /// Parse a port value, falling back to [`DEFAULT_PORT`]
    pub fn resolve_port(value: Option<&str>) -> u16 {
        value
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(DEFAULT_PORT)
    }

    /// Set the bind address
    pub fn bind(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Set the upstream client configuration
    pub fn client(mut self, client: ClientConfig) -> Self {
        self.client = client;
        self
    }
}
