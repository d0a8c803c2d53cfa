//! Content records (posts and drafts).

use serde::{Deserialize, Serialize};

use crate::ExtraFields;

pub type PostId = i64;

/// A content draft as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// ISO-8601 timestamp; `None` means the post is not on the schedule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_for: Option<String>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl Post {
    #[must_use]
    pub fn is_scheduled(&self) -> bool {
        self.scheduled_for
            .as_deref()
            .is_some_and(|when| !when.trim().is_empty())
    }
}

/// Body of `POST /posts/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPost {
    pub content: String,
    #[serde(default = "default_platform")]
    pub platform: String,
    pub scheduled_for: Option<String>,
}

fn default_platform() -> String {
    "twitter".to_string()
}

impl NewPost {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            platform: default_platform(),
            scheduled_for: None,
        }
    }

    #[must_use]
    pub fn on_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = platform.into();
        self
    }

    #[must_use]
    pub fn scheduled_for(mut self, when: impl Into<String>) -> Self {
        self.scheduled_for = Some(when.into());
        self
    }
}

/// Body of `PATCH /posts/{id}`. Only set fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_for: Option<String>,
}

impl PostPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_none() && self.status.is_none() && self.scheduled_for.is_none()
    }
}

/// Query for `GET /posts/`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFilter {
    /// e.g. `pending_approval`, `published`, `rejected`.
    pub status: Option<String>,
}

impl PostFilter {
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_status(status: impl Into<String>) -> Self {
        Self {
            status: Some(status.into()),
        }
    }
}
