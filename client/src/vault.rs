//! Secret key set and knowledge vault.

use std::sync::Arc;

use serde_json::{Value, json};
use studioflow_types::{VaultAck, VaultContents, VaultKeySet, VaultSearchHit};

use crate::dispatch::{Dispatch, fetch_json};
use crate::error::DispatchError;
use crate::request::RequestDescriptor;

pub const VAULT_PATH: &str = "/vault/";
pub const VAULT_UPDATE_PATH: &str = "/vault/update";
pub const VAULT_ADD_PATH: &str = "/vault/add";
pub const VAULT_SEARCH_PATH: &str = "/vault/search";

pub const DEFAULT_SEARCH_LIMIT: u32 = 5;

#[derive(Clone)]
pub struct VaultClient {
    dispatcher: Arc<dyn Dispatch>,
}

impl VaultClient {
    pub(crate) fn new(dispatcher: Arc<dyn Dispatch>) -> Self {
        Self { dispatcher }
    }

    pub async fn keys(&self) -> Result<VaultContents, DispatchError> {
        fetch_json(self.dispatcher.as_ref(), RequestDescriptor::get(VAULT_PATH)).await
    }

    /// Replace stored provider keys. The backend's reply is passed through untouched.
    pub async fn update_keys(&self, keys: &VaultKeySet) -> Result<Value, DispatchError> {
        let request = RequestDescriptor::post(VAULT_UPDATE_PATH).with_json(keys)?;
        Ok(self.dispatcher.send(request).await?.data)
    }

    pub async fn add(&self, content: &str) -> Result<VaultAck, DispatchError> {
        if content.trim().is_empty() {
            return Err(DispatchError::InvalidRequest(
                "vault content must not be empty".to_string(),
            ));
        }
        let request =
            RequestDescriptor::post(VAULT_ADD_PATH).with_json(&json!({ "content": content }))?;
        fetch_json(self.dispatcher.as_ref(), request).await
    }

    /// Semantic search; `limit` of `None` uses [`DEFAULT_SEARCH_LIMIT`].
    pub async fn search(
        &self,
        query: &str,
        limit: Option<u32>,
    ) -> Result<Vec<VaultSearchHit>, DispatchError> {
        let body = json!({
            "query": query,
            "limit": limit.unwrap_or(DEFAULT_SEARCH_LIMIT),
        });
        let request = RequestDescriptor::post(VAULT_SEARCH_PATH).with_json(&body)?;
        fetch_json(self.dispatcher.as_ref(), request).await
    }
}
