//! Signaling server listener
//!
//! Handles the TCP accept loop and spawns one connection task per peer.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinSet;

use crate::error::{Error, Result};
use crate::relay::SignalingHub;
use crate::server::config::ServerConfig;
use crate::server::connection::Connection;
use crate::server::handler::SignalingHandler;

/// WebSocket signaling server
pub struct SignalingServer<H: SignalingHandler> {
    config: Arc<ServerConfig>,
    handler: Arc<H>,
    hub: Arc<SignalingHub>,
    next_session_id: AtomicU64,
    connection_semaphore: Option<Arc<Semaphore>>,
}

impl<H: SignalingHandler> SignalingServer<H> {
    /// Create a new server with the given configuration and handler
    pub fn new(config: ServerConfig, handler: H) -> Self {
        let connection_semaphore = if config.max_connections > 0 {
            Some(Arc::new(Semaphore::new(config.max_connections)))
        } else {
            None
        };

        let hub = Arc::new(SignalingHub::with_config(config.relay.clone()));

        Self {
            config: Arc::new(config),
            handler: Arc::new(handler),
            hub,
            next_session_id: AtomicU64::new(1),
            connection_semaphore,
        }
    }

    /// Get a reference to the relay hub
    pub fn hub(&self) -> &Arc<SignalingHub> {
        &self.hub
    }

    /// Get the bind address
    pub fn bind_addr(&self) -> SocketAddr {
        self.config.bind_addr
    }

    /// Run the server
    ///
    /// This method runs until the listener fails to bind.
    pub async fn run(&self) -> Result<()> {
        self.run_until(std::future::pending()).await
    }

    /// Run the server with graceful shutdown
    pub async fn run_until<F>(&self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        self.serve(listener, shutdown).await
    }

    /// Serve on an already bound listener until `shutdown` resolves
    ///
    /// On shutdown every open session is closed and unregistered before
    /// this returns.
    pub async fn serve<F>(&self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let local_addr = listener.local_addr().map_err(Error::Io)?;
        tracing::info!(addr = %local_addr, path = %self.config.path, "Signaling server listening");

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let mut connections = JoinSet::new();
        tokio::pin!(shutdown);

        loop {
            let accepted = tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("Shutdown signal received");
                    break;
                }
                accepted = listener.accept() => accepted,
                // Reap finished sessions
                Some(_) = connections.join_next(), if !connections.is_empty() => continue,
            };

            match accepted {
                Ok((socket, peer_addr)) => {
                    self.handle_connection(socket, peer_addr, &mut connections, shutdown_rx.clone());
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to accept connection");
                }
            }
        }

        let _ = shutdown_tx.send(true);
        let open = connections.len();
        while connections.join_next().await.is_some() {}
        tracing::info!(closed = open, "Signaling server stopped");

        Ok(())
    }

    fn handle_connection(
        &self,
        socket: TcpStream,
        peer_addr: SocketAddr,
        connections: &mut JoinSet<()>,
        shutdown: watch::Receiver<bool>,
    ) {
        // Check connection limit
        let permit = if let Some(ref sem) = self.connection_semaphore {
            match sem.clone().try_acquire_owned() {
                Ok(permit) => Some(permit),
                Err(_) => {
                    tracing::warn!(peer = %peer_addr, "Connection rejected: limit reached");
                    return;
                }
            }
        } else {
            None
        };

        let session_id = self.next_session_id.fetch_add(1, Ordering::Relaxed);

        tracing::debug!(
            session_id = session_id,
            peer = %peer_addr,
            "New connection"
        );

        if let Err(e) = self.configure_socket(&socket) {
            tracing::error!(error = %e, "Failed to configure socket");
            return;
        }

        let connection = Connection::new(
            session_id,
            socket,
            peer_addr,
            Arc::clone(&self.config),
            Arc::clone(&self.handler),
            Arc::clone(&self.hub),
            shutdown,
        );

        connections.spawn(async move {
            let _permit = permit;

            if let Err(e) = connection.run().await {
                tracing::debug!(
                    session_id = session_id,
                    error = %e,
                    "Connection error"
                );
            }

            tracing::debug!(session_id = session_id, "Connection closed");
        });
    }

    fn configure_socket(&self, socket: &TcpStream) -> std::io::Result<()> {
        if self.config.tcp_nodelay {
            socket.set_nodelay(true)?;
        }
        Ok(())
    }
}
