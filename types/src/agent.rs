//! Agent workflow and chat payloads.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Response of `POST /agent/run`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRun {
    pub thread_id: String,
    /// Graph nodes the workflow is paused before; empty once finished.
    #[serde(default)]
    pub next_step: Option<Vec<String>>,
    #[serde(default)]
    pub values: Option<Value>,
}

/// Response of `GET /agent/status/{thread_id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentStatus {
    /// Only set by the backend for unknown or finished threads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default)]
    pub next_step: Option<Vec<String>>,
    #[serde(default)]
    pub values: Option<Value>,
}

impl AgentStatus {
    /// True while the workflow is paused waiting for a human decision.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.next_step.as_ref().is_some_and(|steps| !steps.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalAction {
    Approve,
    Reject,
}

impl ApprovalAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
        }
    }
}

/// Response of `POST /agent/approve/{thread_id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalOutcome {
    pub status: String,
    #[serde(default)]
    pub values: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
    System,
}

/// One prior message in a chat conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Response of `POST /agent/chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
}
