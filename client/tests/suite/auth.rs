//! Login, signup, logout flows against a mock backend

use std::sync::Arc;

use serde_json::json;
use studioflow_client::types::SignupRequest;
use studioflow_client::{ErrorKind, LoginRequiredReason, SessionEvent, SessionStore};
use wiremock::matchers::{body_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{
    TEST_TOKEN, authenticated_client, client_for, client_with, drain, mount_login, mount_status,
    options_for, token,
};

#[tokio::test]
async fn login_then_requests_carry_the_new_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("username=ada%40example.com"))
        .and(body_string_contains("grant_type=password"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "fresh-token",
            "token_type": "bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/me"))
        .and(header("authorization", "Bearer fresh-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1,
            "email": "ada@example.com",
            "full_name": "Ada",
            "brand_voice_style": "Professional"
        })))
        .expect(1)
        .mount(&server)
        .await;
    let client = client_for(&server);

    let grant = client
        .auth()
        .login("ada@example.com", "correct horse")
        .await
        .expect("login");
    let profile = client.auth().current_user().await.expect("profile");

    assert_eq!(grant.token_type.as_deref(), Some("bearer"));
    assert_eq!(profile.full_name.as_deref(), Some("Ada"));
    assert!(client.session().is_authenticated());
}

#[tokio::test]
async fn bad_credentials_are_unauthorized() {
    let server = MockServer::start().await;
    mount_status(&server, "POST", "/auth/login", 401).await;
    let client = client_for(&server);
    let mut rx = client.subscribe();

    let err = client.auth().login("ada@example.com", "wrong").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert!(!client.session().is_authenticated());
    assert_eq!(drain(&mut rx).len(), 1);
}

#[tokio::test]
async fn signup_does_not_start_a_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users/"))
        .and(body_json(json!({
            "email": "new@example.com",
            "password": "pw",
            "full_name": "New User",
            "brand_voice_style": "Witty"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 2,
            "email": "new@example.com",
            "full_name": "New User",
            "brand_voice_style": "Witty",
            "is_active": true
        })))
        .expect(1)
        .mount(&server)
        .await;
    let client = client_for(&server);

    let request =
        SignupRequest::new("new@example.com", "pw", "New User").with_brand_voice_style("Witty");
    let profile = client.auth().signup(&request).await.expect("signup");

    assert_eq!(profile.id, Some(2));
    assert_eq!(profile.extra.get("is_active"), Some(&json!(true)));
    assert!(!client.session().is_authenticated());
}

#[tokio::test]
async fn logout_invalidates_remotely_then_locally() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .and(header("authorization", format!("Bearer {TEST_TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    let store = Arc::new(SessionStore::in_memory());
    store.set(token(TEST_TOKEN));
    let client = client_with(
        store,
        options_for(&server).with_logout_path(Some("/auth/logout".into())),
    );
    let mut rx = client.subscribe();

    client.auth().logout().await;

    assert!(!client.session().is_authenticated());
    assert_eq!(
        drain(&mut rx),
        vec![SessionEvent::LoginRequired(LoginRequiredReason::LoggedOut)]
    );
}

#[tokio::test]
async fn logout_whose_remote_call_is_rejected_signals_once() {
    let server = MockServer::start().await;
    mount_status(&server, "POST", "/auth/logout", 401).await;
    let store = Arc::new(SessionStore::in_memory());
    store.set(token(TEST_TOKEN));
    let client = client_with(
        store,
        options_for(&server).with_logout_path(Some("/auth/logout".into())),
    );
    let mut rx = client.subscribe();

    client.auth().logout().await;

    assert!(!client.session().is_authenticated());
    assert_eq!(
        drain(&mut rx),
        vec![SessionEvent::LoginRequired(LoginRequiredReason::LoggedOut)]
    );
}

#[tokio::test]
async fn logout_survives_unreachable_backend() {
    let server = MockServer::start().await;
    mount_status(&server, "POST", "/auth/logout", 503).await;
    let store = Arc::new(SessionStore::in_memory());
    store.set(token(TEST_TOKEN));
    let client = client_with(
        store,
        options_for(&server).with_logout_path(Some("/auth/logout".into())),
    );

    client.auth().logout().await;

    assert!(!client.session().is_authenticated());
}

#[tokio::test]
async fn social_link_returns_auth_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/social/link/linkedin"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"auth_url": "https://www.linkedin.com/oauth/v2/authorization?x=1"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let link = authenticated_client(&server)
        .auth()
        .social_link("linkedin")
        .await
        .expect("link");

    assert!(link.auth_url.starts_with("https://www.linkedin.com/"));
}

#[tokio::test]
async fn login_response_without_token_is_invalid_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token_type": "bearer"})))
        .mount(&server)
        .await;
    let client = client_for(&server);

    let err = client.auth().login("a", "b").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidPayload);
    assert!(!client.session().is_authenticated());
}

#[tokio::test]
async fn login_token_with_control_characters_is_refused() {
    let server = MockServer::start().await;
    mount_login(&server, "abc\ndef").await;
    let client = client_for(&server);

    let err = client.auth().login("a", "b").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidPayload);
    assert!(!client.session().is_authenticated());
}

#[tokio::test]
async fn linked_accounts_are_listed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/social/accounts"))
        .and(header("authorization", format!("Bearer {TEST_TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 9, "platform": "linkedin", "profile_name": "Ada's linkedin",
             "access_token": "mock_access_token_9"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let accounts = authenticated_client(&server)
        .auth()
        .linked_accounts()
        .await
        .expect("accounts");

    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].id, Some(9));
    assert_eq!(accounts[0].profile_name.as_deref(), Some("Ada's linkedin"));
}
