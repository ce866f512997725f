//! Gymtrack Pairing Relay
//!
//! Relays sync instructions between two paired gymtrack devices. Immediate
//! messages are forwarded while both peers are connected; transfers are
//! held in a per-peer mailbox until the recipient connects.
//!
//! # Configuration
//!
//! Environment variables:
//! - `GYMTRACK_RELAY_PORT`: Port to listen on (default: 8093)
//!
//! # Endpoints
//!
//! - `GET /health`: Health check endpoint
//! - `GET /sync?pair=<code>&role=<primary|companion>`: WebSocket endpoint

use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gymtrack::relay::{router, RelayState};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gymtrack_relay=info,gymtrack=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let port = std::env::var("GYMTRACK_RELAY_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8093);

    let app = router(Arc::new(RelayState::default())).layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Starting relay on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
