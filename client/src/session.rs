//! Session token storage and session lifecycle notifications.
//!
//! [`SessionStore`] holds at most one token and is the single source of truth
//! for "authenticated". [`Session`] pairs the store with a broadcast channel so
//! that any layer can tear the session down and every subscriber hears about it
//! exactly once per teardown.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use serde_json::Value;
use studioflow_types::SessionToken;
use studioflow_utils::{AtomicWriteOptions, FileSyncPolicy, ParentDirSyncPolicy};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Field holding the token inside the persisted session file.
pub const SESSION_TOKEN_KEY: &str = "token";

const EVENT_CHANNEL_CAPACITY: usize = 16;

#[derive(Debug)]
enum Backing {
    Memory,
    File(PathBuf),
}

/// Holds the current session token, optionally mirrored to a file that
/// survives restarts.
///
/// Every operation is infallible from the caller's point of view: a file that
/// cannot be read or written is logged and the in-memory state stays authoritative.
/// Reads never wait on file I/O.
#[derive(Debug)]
pub struct SessionStore {
    token: RwLock<Option<SessionToken>>,
    /// Serializes writers so the file ends in the same state as memory.
    persist: Mutex<()>,
    backing: Backing,
}

impl SessionStore {
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            token: RwLock::new(None),
            persist: Mutex::new(()),
            backing: Backing::Memory,
        }
    }

    /// Open a file-backed store, loading any token persisted earlier.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let token = load_token(&path);
        if token.is_some() {
            debug!(path = %path.display(), "Loaded persisted session");
        }
        Self {
            token: RwLock::new(token),
            persist: Mutex::new(()),
            backing: Backing::File(path),
        }
    }

    #[must_use]
    pub fn get(&self) -> Option<SessionToken> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set(&self, token: SessionToken) {
        let _persist = self.persist.lock().unwrap_or_else(PoisonError::into_inner);
        self.replace(Some(token.clone()));
        if let Backing::File(path) = &self.backing
            && let Err(e) = persist_token(path, &token)
        {
            warn!(path = %path.display(), "Failed to persist session: {e}");
        }
    }

    pub fn clear(&self) {
        let _persist = self.persist.lock().unwrap_or_else(PoisonError::into_inner);
        self.replace(None);
        if let Backing::File(path) = &self.backing
            && let Err(e) = studioflow_utils::remove_if_exists(path)
        {
            warn!(path = %path.display(), "Failed to remove session file: {e}");
        }
    }

    fn replace(&self, token: Option<SessionToken>) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = token;
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Backing file, if this store persists.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match &self.backing {
            Backing::Memory => None,
            Backing::File(path) => Some(path),
        }
    }
}

fn load_token(path: &Path) -> Option<SessionToken> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
        Err(e) => {
            warn!(path = %path.display(), "Failed to read session file: {e}");
            return None;
        }
    };
    let value: Value = match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            warn!(path = %path.display(), "Ignoring malformed session file: {e}");
            return None;
        }
    };
    value
        .get(SESSION_TOKEN_KEY)
        .and_then(Value::as_str)
        .and_then(|token| SessionToken::new(token).ok())
}

fn persist_token(path: &Path, token: &SessionToken) -> io::Result<()> {
    let body = serde_json::json!({ SESSION_TOKEN_KEY: token.expose_secret() });
    let bytes = serde_json::to_vec(&body).map_err(io::Error::other)?;
    studioflow_utils::atomic_write_with_options(
        path,
        &bytes,
        AtomicWriteOptions {
            file_sync: FileSyncPolicy::SyncAll,
            parent_dir_sync: ParentDirSyncPolicy::SyncBestEffort,
        },
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginRequiredReason {
    /// The backend rejected the credential on this request path.
    Unauthorized { path: String },
    /// The user logged out explicitly.
    LoggedOut,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    LoginRequired(LoginRequiredReason),
}

/// Broadcast channel for [`SessionEvent`]s.
#[derive(Debug, Clone)]
pub struct SessionEvents {
    tx: broadcast::Sender<SessionEvent>,
}

impl SessionEvents {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { tx }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    pub fn emit(&self, event: SessionEvent) {
        // No subscribers is fine.
        let receivers = self.tx.send(event).unwrap_or(0);
        debug!(receivers, "Session event emitted");
    }
}

impl Default for SessionEvents {
    fn default() -> Self {
        Self::new()
    }
}

/// The shared session: token store plus lifecycle notifications.
#[derive(Debug, Clone)]
pub struct Session {
    store: Arc<SessionStore>,
    events: SessionEvents,
}

impl Session {
    #[must_use]
    pub fn new(store: Arc<SessionStore>) -> Self {
        Self {
            store,
            events: SessionEvents::new(),
        }
    }

    #[must_use]
    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    #[must_use]
    pub fn events(&self) -> &SessionEvents {
        &self.events
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    #[must_use]
    pub fn token(&self) -> Option<SessionToken> {
        self.store.get()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.store.is_authenticated()
    }

    /// Clear the stored credential, then announce that a login is required.
    pub fn teardown(&self, reason: LoginRequiredReason) {
        self.store.clear();
        info!(?reason, "Session cleared; login required");
        self.events.emit(SessionEvent::LoginRequired(reason));
    }
}
