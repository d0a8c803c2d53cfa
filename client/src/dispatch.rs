//! Request dispatch: the seam domain clients talk through, and its HTTP implementation.

use std::future::Future;
use std::pin::Pin;
use std::time::{Duration, Instant};

use reqwest::StatusCode;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::ClientOptions;
use crate::error::DispatchError;
use crate::request::{RequestBody, RequestDescriptor, ResponseEnvelope};
use crate::session::{LoginRequiredReason, Session};

/// Maximum bytes of an error body kept for diagnostics.
pub const MAX_ERROR_BODY_BYTES: usize = 32 * 1024;

const TCP_KEEPALIVE_SECS: u64 = 60;
const POOL_IDLE_TIMEOUT_SECS: u64 = 90;
const POOL_MAX_IDLE_PER_HOST: usize = 4;

const USER_AGENT: &str = concat!("studioflow/", env!("CARGO_PKG_VERSION"));

pub type DispatchFut<'a> =
    Pin<Box<dyn Future<Output = Result<ResponseEnvelope, DispatchError>> + Send + 'a>>;

/// Executes one request and classifies its outcome.
///
/// Implementations that observe a rejected credential must tear the session down
/// before returning [`DispatchError::Unauthorized`].
pub trait Dispatch: Send + Sync {
    fn send(&self, request: RequestDescriptor) -> DispatchFut<'_>;
}

/// Send `request` and deserialize the response body as `T`.
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    dispatcher: &dyn Dispatch,
    request: RequestDescriptor,
) -> Result<T, DispatchError> {
    let path = request.path.clone();
    dispatcher.send(request).await?.decode(&path)
}

/// Build the HTTP client every dispatcher shares.
pub fn http_client(options: &ClientOptions) -> Result<reqwest::Client, reqwest::Error> {
    let mut default_headers = HeaderMap::new();
    default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    reqwest::Client::builder()
        .connect_timeout(options.connect_timeout())
        .redirect(reqwest::redirect::Policy::none())
        .tcp_keepalive(Some(Duration::from_secs(TCP_KEEPALIVE_SECS)))
        .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
        .pool_idle_timeout(Some(Duration::from_secs(POOL_IDLE_TIMEOUT_SECS)))
        .user_agent(USER_AGENT)
        .default_headers(default_headers)
        .build()
}

/// Read at most [`MAX_ERROR_BODY_BYTES`] of a response body as lossy UTF-8.
pub async fn read_capped_error_body(response: reqwest::Response) -> String {
    use futures_util::StreamExt;
    let mut body = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let Ok(chunk) = chunk else { break };
        body.extend_from_slice(&chunk);
        if body.len() > MAX_ERROR_BODY_BYTES {
            body.truncate(MAX_ERROR_BODY_BYTES);
            let text = String::from_utf8_lossy(&body);
            return format!("{text}...(truncated)");
        }
    }
    String::from_utf8_lossy(&body).into_owned()
}

/// [`Dispatch`] over HTTP against a single backend origin.
#[derive(Debug, Clone)]
pub struct HttpDispatcher {
    http: reqwest::Client,
    base_url: Url,
    request_timeout: Duration,
    logout_path: Option<String>,
    session: Session,
}

impl HttpDispatcher {
    pub fn new(options: &ClientOptions, session: Session) -> Result<Self, DispatchError> {
        let http = http_client(options).map_err(|e| {
            DispatchError::InvalidRequest(format!("failed to build HTTP client: {e}"))
        })?;
        Ok(Self::with_http_client(http, options, session))
    }

    #[must_use]
    pub fn with_http_client(
        http: reqwest::Client,
        options: &ClientOptions,
        session: Session,
    ) -> Self {
        Self {
            http,
            base_url: options.base_url().clone(),
            request_timeout: options.request_timeout(),
            logout_path: options.logout_path().map(str::to_string),
            session,
        }
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Resolve a request path and query against the base URL.
    ///
    /// Any path prefix on the base URL is kept; a trailing slash on it is not doubled.
    pub fn url_for(&self, request: &RequestDescriptor) -> Result<Url, DispatchError> {
        let mut raw = self.base_url.as_str().trim_end_matches('/').to_string();
        if !request.path.starts_with('/') {
            raw.push('/');
        }
        raw.push_str(&request.path);

        let mut url = Url::parse(&raw)
            .map_err(|e| DispatchError::InvalidRequest(format!("invalid URL {raw}: {e}")))?;
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&request.query);
        }
        Ok(url)
    }

    /// A rejected remote logout still reads as the logout the caller asked for.
    fn teardown_reason(&self, path: &str) -> LoginRequiredReason {
        if self.logout_path.as_deref() == Some(path) {
            LoginRequiredReason::LoggedOut
        } else {
            LoginRequiredReason::Unauthorized {
                path: path.to_string(),
            }
        }
    }

    async fn execute(&self, request: RequestDescriptor) -> Result<ResponseEnvelope, DispatchError> {
        let url = self.url_for(&request)?;
        let RequestDescriptor {
            method, path, body, ..
        } = request;

        let mut builder = self
            .http
            .request(method.to_reqwest(), url)
            .timeout(self.request_timeout);
        if let Some(token) = self.session.token() {
            builder = builder.header(AUTHORIZATION, bearer_header(token.expose_secret(), &path)?);
        }
        builder = match body {
            Some(RequestBody::Json(value)) => builder.json(&value),
            Some(RequestBody::Form(pairs)) => builder
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(encode_form(&pairs)),
            None => builder,
        };

        let started = Instant::now();
        let response = builder.send().await.map_err(|e| {
            let err = DispatchError::transport(&e);
            warn!(%method, %path, "Request failed: {err}");
            err
        })?;
        let status = response.status();
        debug!(
            %method,
            %path,
            status = status.as_u16(),
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "Request completed"
        );

        if status == StatusCode::UNAUTHORIZED {
            let body = read_capped_error_body(response).await;
            self.session.teardown(self.teardown_reason(&path));
            return Err(DispatchError::Unauthorized { path, body });
        }
        if !status.is_success() {
            let body = read_capped_error_body(response).await;
            return Err(DispatchError::RemoteRejected {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| DispatchError::transport(&e))?;
        let data = if bytes.iter().all(u8::is_ascii_whitespace) {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).map_err(|e| DispatchError::InvalidPayload {
                path: path.clone(),
                message: format!("response is not JSON: {e}"),
            })?
        };

        Ok(ResponseEnvelope::new(status.as_u16(), data))
    }
}

impl Dispatch for HttpDispatcher {
    fn send(&self, request: RequestDescriptor) -> DispatchFut<'_> {
        Box::pin(self.execute(request))
    }
}

/// `Authorization: Bearer <token>`, refusing tokens that cannot travel in a header.
pub(crate) fn bearer_header(token: &str, path: &str) -> Result<HeaderValue, DispatchError> {
    let mut value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
        DispatchError::InvalidRequest(format!(
            "session token for {path} contains characters not allowed in a header"
        ))
    })?;
    value.set_sensitive(true);
    Ok(value)
}

fn encode_form(pairs: &[(String, String)]) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}
