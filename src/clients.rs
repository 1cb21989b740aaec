use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use dashmap::DashSet;
use tracing::debug;

use crate::SharedState;

/// Distinct client addresses seen since the server started.
///
/// Lives for the whole process and is only ever added to.
#[derive(Debug, Default)]
pub struct ClientRegistry {
    seen: DashSet<String>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true the first time an address is seen.
    pub fn record(&self, addr: impl Into<String>) -> bool {
        self.seen.insert(addr.into())
    }

    /// Sorted copy of every address recorded so far.
    pub fn snapshot(&self) -> Vec<String> {
        let mut addrs: Vec<String> = self.seen.iter().map(|a| a.key().clone()).collect();
        addrs.sort();
        addrs
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// Records the caller's address before passing the request on.
pub async fn track_clients(
    State(state): State<SharedState>,
    request: Request,
    next: Next,
) -> Response {
    if let Some(addr) = client_addr(&request) {
        if state.clients.record(addr.clone()) {
            debug!("New client {}", addr);
        }
    }
    next.run(request).await
}

/// First `X-Forwarded-For` hop when present, otherwise the peer IP.
fn client_addr(request: &Request) -> Option<String> {
    let forwarded = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|hop| !hop.is_empty());

    match forwarded {
        Some(hop) => Some(hop.to_string()),
        None => request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(peer)| peer.ip().to_string()),
    }
}
