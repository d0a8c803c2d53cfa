//! Knowledge vault and provider key payloads.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Named provider secrets, e.g. `openai_api_key`.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VaultKeySet(BTreeMap<String, String>);

impl VaultKeySet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_key(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// Manual Debug impl to prevent leaking key values in logs.
impl std::fmt::Debug for VaultKeySet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.0.iter().map(|(name, value)| {
                let masked = if value.is_empty() { "" } else { "[REDACTED]" };
                (name, masked)
            }))
            .finish()
    }
}

/// A stored knowledge chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultEntry {
    pub id: i64,
    pub content: String,
}

/// What `GET /vault/` returns: either a key set or stored knowledge entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VaultContents {
    Keys(VaultKeySet),
    Entries(Vec<VaultEntry>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultAck {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VaultSearchHit {
    pub content: String,
    #[serde(default)]
    pub score: f64,
}
