//! Per-connection task
//!
//! Drives one WebSocket from upgrade to close:
//!
//! ```text
//! upgrade ─► on_connection ─► hub.on_connect ─► read loop ─► hub.on_disconnect ─► on_disconnect
//!                                  │                 │
//!                          PeerLink (registry)   hub.on_message (in arrival order)
//!                                  │
//!                        outbound queue ─► writer task ─► WebSocket sink
//! ```

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio_tungstenite::accept_hdr_async_with_config;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::{header, StatusCode};
use tokio_tungstenite::tungstenite::protocol::WebSocketConfig;
use tokio_tungstenite::tungstenite::Message;

use crate::error::Result;
use crate::registry::{PeerId, PeerLink};
use crate::relay::SignalingHub;
use crate::server::config::ServerConfig;
use crate::server::handler::SignalingHandler;
use crate::session::SessionContext;

/// How long the writer may take to flush and send a close frame
const WRITER_DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

/// One accepted TCP connection
pub(crate) struct Connection<H: SignalingHandler> {
    session_id: u64,
    socket: TcpStream,
    peer_addr: SocketAddr,
    config: Arc<ServerConfig>,
    handler: Arc<H>,
    hub: Arc<SignalingHub>,
    shutdown: watch::Receiver<bool>,
}

impl<H: SignalingHandler> Connection<H> {
    pub(crate) fn new(
        session_id: u64,
        socket: TcpStream,
        peer_addr: SocketAddr,
        config: Arc<ServerConfig>,
        handler: Arc<H>,
        hub: Arc<SignalingHub>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            session_id,
            socket,
            peer_addr,
            config,
            handler,
            hub,
            shutdown,
        }
    }

    /// Run the session until the peer leaves or the server shuts down
    pub(crate) async fn run(self) -> Result<()> {
        let Connection {
            session_id,
            socket,
            peer_addr,
            config,
            handler,
            hub,
            mut shutdown,
        } = self;

        let mut origin = None;
        let callback = |request: &Request, response: Response| -> std::result::Result<Response, ErrorResponse> {
            origin = authorize_upgrade(&config, request)?;
            Ok(response)
        };

        let mut ws_config = WebSocketConfig::default();
        ws_config.max_message_size = Some(config.max_message_size);

        let ws = accept_hdr_async_with_config(socket, callback, Some(ws_config)).await?;

        let peer_id = PeerId::generate();
        let ctx = SessionContext::new(session_id, peer_id.clone(), peer_addr, origin);
        let (mut sink, mut stream) = ws.split();

        if !handler.on_connection(&ctx).await {
            tracing::info!(session_id = session_id, peer = %peer_id, "Connection rejected by handler");
            let _ = sink.send(Message::Close(None)).await;
            return Ok(());
        }

        let (link, mut outbound) = PeerLink::channel(config.outbound_queue_capacity);
        let write_timeout = config.send_timeout;

        // Ends once every clone of the link is gone or the socket fails or stalls
        let mut writer = tokio::spawn(async move {
            while let Some(text) = outbound.recv().await {
                match tokio::time::timeout(write_timeout, sink.send(Message::Text(text))).await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => {
                        tracing::debug!(error = %e, "WebSocket write failed");
                        return;
                    }
                    Err(_) => {
                        tracing::warn!(timeout_ms = write_timeout.as_millis() as u64, "WebSocket write stalled");
                        return;
                    }
                }
            }
            let _ = sink.close().await;
        });

        if let Err(e) = hub.on_connect(peer_id.clone(), link).await {
            tracing::warn!(session_id = session_id, error = %e, "Peer registration failed");
            drain_writer(&mut writer).await;
            return Err(e.into());
        }

        tracing::info!(
            session_id = session_id,
            peer = %peer_id,
            addr = %peer_addr,
            origin = ?ctx.origin(),
            "Peer connected"
        );

        let mut writer_done = false;
        loop {
            tokio::select! {
                frame = stream.next() => match frame {
                    Some(Ok(Message::Text(text))) => {
                        let outcome = hub.on_message(&peer_id, &text).await;
                        handler.on_message(&ctx, outcome).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::debug!(session_id = session_id, error = %e, "WebSocket read failed");
                        break;
                    }
                },
                _ = &mut writer, if !writer_done => {
                    tracing::debug!(session_id = session_id, "Writer stopped, closing session");
                    writer_done = true;
                    break;
                }
                _ = shutdown.changed() => {
                    tracing::debug!(session_id = session_id, "Closing for server shutdown");
                    break;
                }
            }
        }

        hub.on_disconnect(&peer_id).await;
        handler.on_disconnect(&ctx).await;
        if !writer_done {
            drain_writer(&mut writer).await;
        }

        tracing::info!(
            session_id = session_id,
            peer = %peer_id,
            duration_secs = ctx.duration().as_secs(),
            "Peer disconnected"
        );

        Ok(())
    }
}

async fn drain_writer(writer: &mut tokio::task::JoinHandle<()>) {
    if tokio::time::timeout(WRITER_DRAIN_TIMEOUT, &mut *writer)
        .await
        .is_err()
    {
        writer.abort();
    }
}

/// Apply the endpoint path and allowed-origin policy to an upgrade request
///
/// Returns the request's `Origin` header on success.
pub(crate) fn authorize_upgrade(
    config: &ServerConfig,
    request: &Request,
) -> std::result::Result<Option<String>, ErrorResponse> {
    if request.uri().path() != config.path {
        return Err(rejection(StatusCode::NOT_FOUND, "Unknown endpoint"));
    }

    let origin = match request.headers().get(header::ORIGIN) {
        Some(value) => match value.to_str() {
            Ok(origin) => Some(origin.to_string()),
            Err(_) => return Err(rejection(StatusCode::BAD_REQUEST, "Invalid origin header")),
        },
        None => None,
    };

    if let Some(ref origin) = origin {
        if !config.origin_allowed(origin) {
            tracing::warn!(origin = %origin, "Origin not allowed");
            return Err(rejection(StatusCode::FORBIDDEN, "Origin not allowed"));
        }
    }

    Ok(origin)
}

fn rejection(status: StatusCode, reason: &str) -> ErrorResponse {
    let mut response = ErrorResponse::new(Some(reason.to_string()));
    *response.status_mut() = status;
    response
}
