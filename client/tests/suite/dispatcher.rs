//! Request dispatch against a mock backend

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use studioflow_client::types::PostFilter;
use studioflow_client::{
    ClientOptions, DispatchError, ErrorKind, LoginRequiredReason, SessionEvent, SessionStore,
    TransportFailure,
};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{
    TEST_TOKEN, authenticated_client, client_for, client_with, drain, mount_status, options_for,
    token,
};

#[tokio::test]
async fn unauthenticated_list_gets_401_and_signals_once() {
    let server = MockServer::start().await;
    mount_status(&server, "GET", "/posts/", 401).await;
    let client = client_for(&server);
    let mut rx = client.subscribe();

    let err = client.posts().list(&PostFilter::all()).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert!(!client.session().is_authenticated());
    assert_eq!(
        drain(&mut rx),
        vec![SessionEvent::LoginRequired(LoginRequiredReason::Unauthorized {
            path: "/posts/".into()
        })]
    );
    let sent = server.received_requests().await.expect("recording");
    assert!(sent[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn stored_token_is_attached_as_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/me"))
        .and(header("authorization", format!("Bearer {TEST_TOKEN}").as_str()))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": 1, "email": "ada@example.com"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let profile = authenticated_client(&server)
        .auth()
        .current_user()
        .await
        .expect("profile");

    assert_eq!(profile.email.as_deref(), Some("ada@example.com"));
}

#[tokio::test]
async fn expired_token_is_cleared_on_401() {
    let server = MockServer::start().await;
    mount_status(&server, "GET", "/users/me", 401).await;
    let client = authenticated_client(&server);
    let mut rx = client.subscribe();

    let err = client.auth().current_user().await.unwrap_err();

    assert!(matches!(err, DispatchError::Unauthorized { ref path, .. } if path == "/users/me"));
    assert!(!client.session().is_authenticated());
    assert_eq!(drain(&mut rx).len(), 1);
}

#[tokio::test]
async fn non_401_failures_keep_session_and_stay_quiet() {
    let server = MockServer::start().await;
    mount_status(&server, "GET", "/posts/404", 404).await;
    mount_status(&server, "GET", "/posts/500", 500).await;
    let client = authenticated_client(&server);
    let mut rx = client.subscribe();

    for id in [404, 500] {
        let err = client.posts().get(id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RemoteRejected);
        assert_eq!(err.status(), Some(u16::try_from(id).expect("status")));
        assert!(err.to_string().contains("nope"));
    }

    assert!(client.session().is_authenticated());
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test]
async fn timeout_is_transport_failure_and_keeps_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/posts/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;
    let store = Arc::new(SessionStore::in_memory());
    store.set(token(TEST_TOKEN));
    let client = client_with(
        Arc::clone(&store),
        options_for(&server).with_request_timeout(Duration::from_millis(200)),
    );
    let mut rx = client.subscribe();

    let err = client.posts().list(&PostFilter::all()).await.unwrap_err();

    assert!(matches!(
        err,
        DispatchError::Transport {
            kind: TransportFailure::Timeout,
            ..
        }
    ));
    assert!(store.is_authenticated());
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test]
async fn empty_success_body_is_accepted() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/posts/3"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    authenticated_client(&server)
        .posts()
        .delete(3)
        .await
        .expect("delete");
}

#[tokio::test]
async fn non_json_success_body_is_invalid_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/posts/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy</html>"))
        .mount(&server)
        .await;

    let err = authenticated_client(&server)
        .posts()
        .list(&PostFilter::all())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidPayload);
}

#[tokio::test]
async fn default_headers_and_query_are_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/posts/"))
        .and(query_param("status", "pending_approval"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    authenticated_client(&server)
        .posts()
        .list(&PostFilter::with_status("pending_approval"))
        .await
        .expect("list");

    let sent = server.received_requests().await.expect("recording");
    let agent = sent[0]
        .headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(agent.starts_with("studioflow/"));
}

#[tokio::test]
async fn base_url_path_prefix_is_preserved() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/users/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 9})))
        .expect(1)
        .mount(&server)
        .await;
    let options = ClientOptions::new(&format!("{}/api/v1/", server.uri())).expect("options");
    let store = Arc::new(SessionStore::in_memory());
    store.set(token(TEST_TOKEN));

    let profile = client_with(store, options)
        .auth()
        .current_user()
        .await
        .expect("profile");

    assert_eq!(profile.id, Some(9));
}

#[tokio::test]
async fn redirects_are_not_followed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/posts/"))
        .respond_with(ResponseTemplate::new(307).insert_header("location", "/elsewhere"))
        .mount(&server)
        .await;

    let err = authenticated_client(&server)
        .posts()
        .list(&PostFilter::all())
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(307));
}

#[tokio::test]
async fn stored_token_unfit_for_a_header_is_refused_before_sending() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;
    let store = Arc::new(SessionStore::in_memory());
    store.set(token("abc\ndef"));
    let client = client_with(store, options_for(&server));

    let err = client.auth().current_user().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidRequest);
    assert!(client.session().is_authenticated());
}
