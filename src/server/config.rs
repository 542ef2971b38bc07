//! Server configuration

use std::net::SocketAddr;
use std::time::Duration;

use crate::protocol::constants::*;
use crate::relay::RelayConfig;

/// Server configuration options
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to
    pub bind_addr: SocketAddr,

    /// WebSocket endpoint path
    pub path: String,

    /// Origins allowed to open a browser connection (`*` = any)
    pub allowed_origins: Vec<String>,

    /// Maximum concurrent connections (0 = unlimited)
    pub max_connections: usize,

    /// Enable TCP_NODELAY (disable Nagle's algorithm)
    pub tcp_nodelay: bool,

    /// Depth of each peer's outbound message queue
    ///
    /// Messages for a peer whose queue is full are dropped, never waited on.
    pub outbound_queue_capacity: usize,

    /// How long one WebSocket write may stall before the session is closed
    pub send_timeout: Duration,

    /// Largest inbound WebSocket message accepted
    pub max_message_size: usize,

    /// Relay behavior
    pub relay: RelayConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            path: DEFAULT_PATH.to_string(),
            allowed_origins: vec![ANY_ORIGIN.to_string()],
            max_connections: 0, // Unlimited
            tcp_nodelay: true,
            outbound_queue_capacity: DEFAULT_OUTBOUND_QUEUE,
            send_timeout: Duration::from_secs(5),
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            relay: RelayConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Create a new config with custom bind address
    pub fn with_addr(addr: SocketAddr) -> Self {
        Self {
            bind_addr: addr,
            ..Default::default()
        }
    }

    /// Set the bind address
    pub fn bind(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Set the WebSocket endpoint path
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Restrict browser connections to the given origins
    pub fn allowed_origins<I, S>(mut self, origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_origins = origins.into_iter().map(Into::into).collect();
        self
    }

    /// Set maximum connections
    pub fn max_connections(mut self, max: usize) -> Self {
        self.max_connections = max;
        self
    }

    /// Set the per-peer outbound queue depth
    pub fn outbound_queue_capacity(mut self, capacity: usize) -> Self {
        self.outbound_queue_capacity = capacity.max(1);
        self
    }

    /// Set the per-write socket timeout
    pub fn send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = timeout;
        self
    }

    /// Set the maximum inbound message size
    pub fn max_message_size(mut self, size: usize) -> Self {
        self.max_message_size = size;
        self
    }

    /// Reply `recipient-unavailable` instead of dropping silently
    pub fn notify_unreachable(mut self, enabled: bool) -> Self {
        self.relay.notify_unreachable = enabled;
        self
    }

    /// Whether a browser `Origin` header passes the allowed-origin policy
    pub fn origin_allowed(&self, origin: &str) -> bool {
        self.allowed_origins
            .iter()
            .any(|allowed| allowed == ANY_ORIGIN || allowed.eq_ignore_ascii_case(origin))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();

        assert_eq!(config.bind_addr.port(), DEFAULT_PORT);
        assert_eq!(config.path, "/signaling-server");
        assert_eq!(config.max_connections, 0);
        assert_eq!(config.outbound_queue_capacity, DEFAULT_OUTBOUND_QUEUE);
        assert!(config.tcp_nodelay);
        assert!(!config.relay.notify_unreachable);
        assert!(config.origin_allowed("https://anything.example"));
    }

    #[test]
    fn test_with_addr() {
        let addr: SocketAddr = "127.0.0.1:9000".parse().unwrap();
        let config = ServerConfig::with_addr(addr);

        assert_eq!(config.bind_addr.port(), 9000);
    }

    #[test]
    fn test_allowed_origins() {
        let config = ServerConfig::default()
            .allowed_origins(["https://app.example", "http://localhost:3000"]);

        assert!(config.origin_allowed("https://app.example"));
        assert!(config.origin_allowed("HTTPS://APP.EXAMPLE"));
        assert!(!config.origin_allowed("https://evil.example"));
    }

    #[test]
    fn test_builder_queue_capacity_floor() {
        let config = ServerConfig::default().outbound_queue_capacity(0);

        assert_eq!(config.outbound_queue_capacity, 1);
    }

    #[test]
    fn test_builder_chaining() {
        let addr: SocketAddr = "127.0.0.1:8443".parse().unwrap();
        let config = ServerConfig::default()
            .bind(addr)
            .path("/ws")
            .max_connections(50)
            .send_timeout(Duration::from_millis(250))
            .max_message_size(1024)
            .notify_unreachable(true);

        assert_eq!(config.bind_addr, addr);
        assert_eq!(config.path, "/ws");
        assert_eq!(config.max_connections, 50);
        assert_eq!(config.send_timeout, Duration::from_millis(250));
        assert_eq!(config.max_message_size, 1024);
        assert!(config.relay.notify_unreachable);
    }
}
