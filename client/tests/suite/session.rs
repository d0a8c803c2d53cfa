//! Durable sessions across client instances

use std::sync::Arc;

use studioflow_client::SessionStore;
use studioflow_client::types::PostFilter;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{client_with, mount_login, mount_status, options_for};

#[tokio::test]
async fn login_persists_across_restarts() {
    let server = MockServer::start().await;
    mount_login(&server, "durable-token").await;
    Mock::given(method("GET"))
        .and(path("/posts/"))
        .and(header("authorization", "Bearer durable-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(1)
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().expect("tempdir");
    let session_file = dir.path().join("session.json");

    let first = client_with(Arc::new(SessionStore::open(&session_file)), options_for(&server));
    first.auth().login("ada@example.com", "pw").await.expect("login");
    drop(first);

    let second = client_with(Arc::new(SessionStore::open(&session_file)), options_for(&server));
    assert!(second.session().is_authenticated());
    second
        .posts()
        .list(&PostFilter::all())
        .await
        .expect("list with restored token");
}

#[tokio::test]
async fn unauthorized_removes_the_session_file() {
    let server = MockServer::start().await;
    mount_login(&server, "soon-expired").await;
    mount_status(&server, "GET", "/users/me", 401).await;
    let dir = tempfile::tempdir().expect("tempdir");
    let session_file = dir.path().join("nested").join("session.json");

    let client = client_with(Arc::new(SessionStore::open(&session_file)), options_for(&server));
    client.auth().login("ada@example.com", "pw").await.expect("login");
    assert!(session_file.exists());

    client.auth().current_user().await.unwrap_err();

    assert!(!session_file.exists());
    assert!(!SessionStore::open(&session_file).is_authenticated());
}

#[tokio::test]
async fn concurrent_requests_share_one_store() {
    let server = MockServer::start().await;
    mount_login(&server, "shared").await;
    Mock::given(method("GET"))
        .and(path("/posts/"))
        .and(header("authorization", "Bearer shared"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(4)
        .mount(&server)
        .await;
    let client = client_with(Arc::new(SessionStore::in_memory()), options_for(&server));
    client.auth().login("ada@example.com", "pw").await.expect("login");

    let filter = PostFilter::all();
    let posts = client.posts();
    let results = futures_util::future::join_all((0..4).map(|_| posts.list(&filter))).await;

    assert!(results.iter().all(Result::is_ok));
}
