//! Shared helpers for integration tests: an in-process mock API server and a
//! client pointed at it.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use lingo::{Translator, TranslatorOptions};

/// Serves the router on an ephemeral local port and returns its address.
pub async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind test listener");
    let addr = listener.local_addr().expect("listener has no local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server failed");
    });
    addr
}

/// A client configured against the given mock server, with a short retry
/// budget so failure tests stay fast.
pub fn client_for(addr: SocketAddr) -> Translator {
    client_with_retries(addr, 2)
}

pub fn client_with_retries(addr: SocketAddr, max_network_retries: u32) -> Translator {
    let options = TranslatorOptions {
        server_url: Some(format!("http://{addr}")),
        max_network_retries,
        min_connection_timeout: Duration::from_secs(2),
        ..TranslatorOptions::default()
    };
    Translator::new("test-key:fx", options).expect("failed to build test client")
}
