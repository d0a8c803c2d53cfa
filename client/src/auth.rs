//! Credential exchange: login, signup, profile lookup, logout, social linking.

use std::sync::Arc;

use studioflow_types::{
    Profile, SessionToken, SignupRequest, SocialAccount, SocialLink, TokenGrant,
};
use tracing::{info, warn};

use crate::dispatch::{Dispatch, bearer_header, fetch_json};
use crate::error::DispatchError;
use crate::request::{RequestDescriptor, path_segment};
use crate::session::{LoginRequiredReason, Session};

pub const LOGIN_PATH: &str = "/auth/login";
pub const SIGNUP_PATH: &str = "/users/";
pub const CURRENT_USER_PATH: &str = "/users/me";
pub const SOCIAL_LINK_PATH: &str = "/auth/social/link";
pub const SOCIAL_ACCOUNTS_PATH: &str = "/auth/social/accounts";

#[derive(Clone)]
pub struct AuthClient {
    dispatcher: Arc<dyn Dispatch>,
    session: Session,
    logout_path: Option<String>,
}

impl AuthClient {
    pub(crate) fn new(
        dispatcher: Arc<dyn Dispatch>,
        session: Session,
        logout_path: Option<String>,
    ) -> Self {
        Self {
            dispatcher,
            session,
            logout_path,
        }
    }

    /// Exchange credentials for a session token and store it.
    ///
    /// A success response without a usable `access_token` (missing, blank, or
    /// not representable in an `Authorization` header) is an
    /// [`DispatchError::InvalidPayload`] and leaves the store untouched.
    pub async fn login(&self, identifier: &str, secret: &str) -> Result<TokenGrant, DispatchError> {
        let request = RequestDescriptor::post(LOGIN_PATH).with_form([
            ("username", identifier),
            ("password", secret),
            ("grant_type", "password"),
        ]);
        let grant: TokenGrant = fetch_json(self.dispatcher.as_ref(), request).await?;

        let token = grant
            .access_token
            .as_deref()
            .and_then(|raw| SessionToken::new(raw).ok())
            .ok_or_else(|| DispatchError::InvalidPayload {
                path: LOGIN_PATH.to_string(),
                message: "login response carried no access_token".to_string(),
            })?;
        if bearer_header(token.expose_secret(), LOGIN_PATH).is_err() {
            return Err(DispatchError::InvalidPayload {
                path: LOGIN_PATH.to_string(),
                message: "access_token is not usable as a bearer credential".to_string(),
            });
        }
        self.session.store().set(token);
        info!("Session established");
        Ok(grant)
    }

    /// Create an account. Does not log in.
    pub async fn signup(&self, request: &SignupRequest) -> Result<Profile, DispatchError> {
        let request = RequestDescriptor::post(SIGNUP_PATH).with_json(request)?;
        fetch_json(self.dispatcher.as_ref(), request).await
    }

    pub async fn current_user(&self) -> Result<Profile, DispatchError> {
        fetch_json(self.dispatcher.as_ref(), RequestDescriptor::get(CURRENT_USER_PATH)).await
    }

    /// End the session locally, after asking the backend to invalidate it when
    /// a logout path is configured. Always succeeds and always announces
    /// exactly one login-required event.
    pub async fn logout(&self) {
        if let Some(path) = &self.logout_path
            && self.session.is_authenticated()
        {
            match self.dispatcher.send(RequestDescriptor::post(path.as_str())).await {
                Ok(_) => {}
                // The dispatcher already tore the session down as a logout.
                Err(DispatchError::Unauthorized { .. }) => return,
                Err(e) => warn!("Remote logout failed; clearing local session anyway: {e}"),
            }
        }
        self.session.teardown(LoginRequiredReason::LoggedOut);
    }

    /// Start linking a social account; returns the provider authorization URL.
    pub async fn social_link(&self, platform: &str) -> Result<SocialLink, DispatchError> {
        if platform.trim().is_empty() {
            return Err(DispatchError::InvalidRequest(
                "platform must not be empty".to_string(),
            ));
        }
        let path = format!("{SOCIAL_LINK_PATH}/{}", path_segment(platform.trim()));
        fetch_json(self.dispatcher.as_ref(), RequestDescriptor::get(path)).await
    }

    /// Social accounts already linked to the logged-in user.
    pub async fn linked_accounts(&self) -> Result<Vec<SocialAccount>, DispatchError> {
        fetch_json(self.dispatcher.as_ref(), RequestDescriptor::get(SOCIAL_ACCOUNTS_PATH)).await
    }
}
