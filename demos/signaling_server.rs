//! Standalone WebRTC signaling server
//!
//! Run with: cargo run --example signaling_server [BIND_ADDR]
//!
//! Examples:
//!   cargo run --example signaling_server                    # binds to 0.0.0.0:8080
//!   cargo run --example signaling_server localhost          # binds to 127.0.0.1:8080
//!   cargo run --example signaling_server 127.0.0.1:9000     # binds to 127.0.0.1:9000
//!
//! Browsers connect to ws://HOST:PORT/signaling-server and receive a
//! `peer-list` message whenever someone joins or leaves. To negotiate, send
//!
//!   {"type":"offer","to":"<peer id>","payload":<RTCSessionDescription>}
//!
//! and reply with `answer` / `ice-candidate` the same way. The relay stamps
//! `from` on everything it forwards.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use signal_relay::{RouteOutcome, ServerConfig, SessionContext, SignalingHandler, SignalingServer};

/// Logs session events and keeps a running relay count
struct LoggingHandler {
    relayed: AtomicU64,
    dropped: AtomicU64,
}

impl LoggingHandler {
    fn new() -> Self {
        Self {
            relayed: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
        }
    }
}

impl SignalingHandler for LoggingHandler {
    async fn on_connection(&self, ctx: &SessionContext) -> bool {
        println!(
            "[{}] {} joined from {} (origin {:?})",
            ctx.session_id,
            ctx.peer_id,
            ctx.peer_addr,
            ctx.origin()
        );
        true
    }

    async fn on_message(&self, ctx: &SessionContext, outcome: RouteOutcome) {
        if outcome.is_dropped() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(peer = %ctx.peer_id, outcome = ?outcome, "Message dropped");
        } else if outcome == RouteOutcome::Relayed {
            self.relayed.fetch_add(1, Ordering::Relaxed);
        }
    }

    async fn on_disconnect(&self, ctx: &SessionContext) {
        println!(
            "[{}] {} left after {}s (relayed={} dropped={})",
            ctx.session_id,
            ctx.peer_id,
            ctx.duration().as_secs(),
            self.relayed.load(Ordering::Relaxed),
            self.dropped.load(Ordering::Relaxed),
        );
    }
}

/// Parse bind address from command line argument.
///
/// Accepts formats:
/// - "localhost" -> 127.0.0.1:8080
/// - "localhost:9000" -> 127.0.0.1:9000
/// - "127.0.0.1" -> 127.0.0.1:8080
/// - "0.0.0.0:9000" -> 0.0.0.0:9000
fn parse_bind_addr(arg: &str) -> Result<SocketAddr, String> {
    const DEFAULT_PORT: u16 = 8080;

    let normalized = arg.replace("localhost", "127.0.0.1");

    if let Ok(addr) = normalized.parse::<SocketAddr>() {
        return Ok(addr);
    }

    if let Ok(ip) = normalized.parse::<std::net::IpAddr>() {
        return Ok(SocketAddr::new(ip, DEFAULT_PORT));
    }

    Err(format!(
        "Invalid bind address: '{}'. Expected format: IP:PORT or IP or 'localhost'",
        arg
    ))
}

fn print_usage() {
    eprintln!("Usage: signaling_server [BIND_ADDR]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  BIND_ADDR    Address to bind to (default: 0.0.0.0:8080)");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return Ok(());
    }

    let mut config = ServerConfig::default();
    if let Some(addr_str) = args.get(1) {
        match parse_bind_addr(addr_str) {
            Ok(addr) => config = config.bind(addr),
            Err(e) => {
                eprintln!("Error: {}", e);
                eprintln!();
                print_usage();
                std::process::exit(1);
            }
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("signal_relay=debug".parse()?)
                .add_directive("signaling_server=debug".parse()?),
        )
        .init();

    println!(
        "Signaling server on ws://{}{}",
        config.bind_addr, config.path
    );

    let server = SignalingServer::new(config, LoggingHandler::new());

    server
        .run_until(async {
            let _ = tokio::signal::ctrl_c().await;
            println!("\nShutting down...");
        })
        .await?;

    Ok(())
}
