//! Typed client for the StudioFlow backend.
//!
//! # Architecture
//!
//! - [`SessionStore`] holds the bearer token (memory or file backed)
//! - [`HttpDispatcher`] attaches it to every request and classifies outcomes;
//!   a `401` tears the [`Session`] down and broadcasts [`SessionEvent::LoginRequired`]
//! - Domain clients ([`AuthClient`], [`PostsClient`], [`CalendarClient`],
//!   [`VaultClient`], [`AgentClient`]) build requests and decode responses
//!
//! ```no_run
//! # async fn demo() -> Result<(), studioflow_client::DispatchError> {
//! use std::sync::Arc;
//! use studioflow_client::{Client, ClientOptions, SessionStore};
//!
//! let options = ClientOptions::new("http://localhost:8000").expect("valid URL");
//! let client = Client::new(options, Arc::new(SessionStore::in_memory()))?;
//! client.auth().login("ada@example.com", "secret").await?;
//! let drafts = client.posts().list(&Default::default()).await?;
//! # let _ = drafts;
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod auth;
pub mod calendar;
pub mod dispatch;
pub mod error;
pub mod posts;
pub mod request;
pub mod session;
pub mod vault;

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::broadcast;
use url::Url;

pub use agent::AgentClient;
pub use auth::AuthClient;
pub use calendar::CalendarClient;
pub use dispatch::{Dispatch, DispatchFut, HttpDispatcher};
pub use error::{DispatchError, ErrorKind, TransportFailure};
pub use posts::PostsClient;
pub use request::{Method, RequestBody, RequestDescriptor, ResponseEnvelope};
pub use session::{LoginRequiredReason, Session, SessionEvent, SessionEvents, SessionStore};
pub use vault::VaultClient;

pub use studioflow_types as types;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ClientOptionsError {
    #[error("invalid base URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

/// Where the backend lives and how long to wait for it.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    base_url: Url,
    request_timeout: Duration,
    connect_timeout: Duration,
    logout_path: Option<String>,
}

impl ClientOptions {
    /// Validate `base_url` (must be absolute `http` or `https`) and apply default timeouts.
    pub fn new(base_url: &str) -> Result<Self, ClientOptionsError> {
        let invalid = |reason: String| ClientOptionsError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason,
        };
        let url = Url::parse(base_url.trim()).map_err(|e| invalid(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
        }
        if url.cannot_be_a_base() || url.host_str().is_none() {
            return Err(invalid("URL has no host".to_string()));
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(invalid("query and fragment are not allowed".to_string()));
        }

        Ok(Self {
            base_url: url,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            logout_path: None,
        })
    }

    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_logout_path(mut self, path: Option<String>) -> Self {
        self.logout_path = path.filter(|p| !p.trim().is_empty());
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    #[must_use]
    pub fn logout_path(&self) -> Option<&str> {
        self.logout_path.as_deref()
    }
}

/// Entry point: one session, one dispatcher, and the domain clients over them.
#[derive(Clone)]
pub struct Client {
    dispatcher: Arc<dyn Dispatch>,
    session: Session,
    options: ClientOptions,
}

impl Client {
    pub fn new(options: ClientOptions, store: Arc<SessionStore>) -> Result<Self, DispatchError> {
        let session = Session::new(store);
        let dispatcher = HttpDispatcher::new(&options, session.clone())?;
        Ok(Self::with_dispatcher(
            Arc::new(dispatcher),
            session,
            options,
        ))
    }

    /// Wire a caller-supplied dispatcher. It must share `session` so that
    /// unauthorized responses reach this client's subscribers.
    #[must_use]
    pub fn with_dispatcher(
        dispatcher: Arc<dyn Dispatch>,
        session: Session,
        options: ClientOptions,
    ) -> Self {
        Self {
            dispatcher,
            session,
            options,
        }
    }

    #[must_use]
    pub fn auth(&self) -> AuthClient {
        AuthClient::new(
            Arc::clone(&self.dispatcher),
            self.session.clone(),
            self.options.logout_path().map(str::to_string),
        )
    }

    #[must_use]
    pub fn posts(&self) -> PostsClient {
        PostsClient::new(Arc::clone(&self.dispatcher))
    }

    #[must_use]
    pub fn calendar(&self) -> CalendarClient {
        CalendarClient::new(Arc::clone(&self.dispatcher))
    }

    #[must_use]
    pub fn vault(&self) -> VaultClient {
        VaultClient::new(Arc::clone(&self.dispatcher))
    }

    #[must_use]
    pub fn agent(&self) -> AgentClient {
        AgentClient::new(Arc::clone(&self.dispatcher))
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.session.subscribe()
    }

    #[must_use]
    pub fn options(&self) -> &ClientOptions {
        &self.options
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("session", &self.session)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
