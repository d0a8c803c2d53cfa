//! Shared test utilities and fixtures

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use studioflow_client::types::SessionToken;
use studioflow_client::{Client, ClientOptions, SessionEvent, SessionStore};
use tokio::sync::broadcast::{self, error::TryRecvError};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_TOKEN: &str = "test-session-token";

pub fn options_for(server: &MockServer) -> ClientOptions {
    ClientOptions::new(&server.uri())
        .expect("mock server URI")
        .with_request_timeout(Duration::from_secs(5))
}

/// Client over an in-memory store that starts empty.
pub fn client_for(server: &MockServer) -> Client {
    client_with(Arc::new(SessionStore::in_memory()), options_for(server))
}

pub fn client_with(store: Arc<SessionStore>, options: ClientOptions) -> Client {
    Client::new(options, store).expect("client")
}

/// Client whose store already holds [`TEST_TOKEN`].
pub fn authenticated_client(server: &MockServer) -> Client {
    let store = Arc::new(SessionStore::in_memory());
    store.set(token(TEST_TOKEN));
    client_with(store, options_for(server))
}

pub fn token(raw: &str) -> SessionToken {
    SessionToken::new(raw).expect("token")
}

pub async fn mount_login(server: &MockServer, access_token: &str) {
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": access_token,
            "token_type": "bearer"
        })))
        .mount(server)
        .await;
}

pub async fn mount_status(server: &MockServer, http_method: &str, route: &str, status: u16) {
    Mock::given(method(http_method))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_json(json!({"detail": "nope"})))
        .mount(server)
        .await;
}

/// Drain every event currently queued on `rx`.
pub fn drain(rx: &mut broadcast::Receiver<SessionEvent>) -> Vec<SessionEvent> {
    let mut events = Vec::new();
    loop {
        match rx.try_recv() {
            Ok(event) => events.push(event),
            Err(TryRecvError::Empty | TryRecvError::Closed) => return events,
            Err(TryRecvError::Lagged(_)) => {}
        }
    }
}
