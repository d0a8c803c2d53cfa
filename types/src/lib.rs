//! Core domain types for the StudioFlow API client.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! The payload shapes mirror what the backend sends and accepts; fields the client does
//! not model explicitly are preserved in a flattened `extra` map so they round-trip.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory

mod agent;
mod auth;
mod calendar;
mod post;
mod vault;

pub use agent::{AgentRun, AgentStatus, ApprovalAction, ApprovalOutcome, ChatReply, ChatRole, ChatTurn};
pub use auth::{Profile, SignupRequest, SocialAccount, SocialLink, TokenGrant};
pub use calendar::{CalendarEvent, CalendarEventProps, Schedule, ScheduleSource};
pub use post::{NewPost, Post, PostFilter, PostId, PostPatch};
pub use vault::{VaultAck, VaultContents, VaultEntry, VaultKeySet, VaultSearchHit};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fields a payload carries that the client does not model explicitly.
pub type ExtraFields = serde_json::Map<String, serde_json::Value>;

// ============================================================================
// NonEmpty String Types
// ============================================================================

/// A string guaranteed to be non-empty (after trimming).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NonEmptyString(String);

#[derive(Debug, Error)]
#[error("value must not be empty")]
pub struct EmptyStringError;

impl NonEmptyString {
    pub fn new(value: impl Into<String>) -> Result<Self, EmptyStringError> {
        let value = value.into();
        if value.trim().is_empty() {
            Err(EmptyStringError)
        } else {
            Ok(Self(value))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl TryFrom<String> for NonEmptyString {
    type Error = EmptyStringError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for NonEmptyString {
    type Error = EmptyStringError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

impl std::ops::Deref for NonEmptyString {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.as_str()
    }
}

impl AsRef<str> for NonEmptyString {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for NonEmptyString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Session Token
// ============================================================================

/// Opaque bearer credential proving an authenticated identity to the backend.
///
/// Surrounding whitespace is trimmed; a blank token is unrepresentable.
///
/// Note: `Debug` is manually implemented to redact the token value, preventing accidental
/// credential disclosure in logs or error messages. There is deliberately no `Display`.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

#[derive(Debug, Error)]
#[error("session token must not be empty")]
pub struct EmptyTokenError;

impl SessionToken {
    pub fn new(value: impl Into<String>) -> Result<Self, EmptyTokenError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(EmptyTokenError);
        }
        if trimmed.len() == value.len() {
            Ok(Self(value))
        } else {
            Ok(Self(trimmed.to_string()))
        }
    }

    /// The raw token, for placing on the wire or in the session file.
    #[must_use]
    pub fn expose_secret(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SessionToken(<redacted>)")
    }
}
