//! Server callback hooks
//!
//! Implement [`SignalingHandler`] to observe or gate sessions. Every method
//! has a default, and `()` is the no-op handler.

use std::future::Future;

use crate::relay::RouteOutcome;
use crate::session::SessionContext;

/// Callbacks invoked by each connection task
pub trait SignalingHandler: Send + Sync + 'static {
    /// Called after the WebSocket upgrade, before the peer is registered
    ///
    /// Return `false` to close the connection without registering it.
    fn on_connection(&self, _ctx: &SessionContext) -> impl Future<Output = bool> + Send {
        async { true }
    }

    /// Called after each inbound text frame has been routed
    fn on_message(
        &self,
        _ctx: &SessionContext,
        _outcome: RouteOutcome,
    ) -> impl Future<Output = ()> + Send {
        async {}
    }

    /// Called once after the peer has been unregistered
    fn on_disconnect(&self, _ctx: &SessionContext) -> impl Future<Output = ()> + Send {
        async {}
    }
}

impl SignalingHandler for () {}
