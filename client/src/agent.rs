//! Agent workflow control and brand chat.

use std::sync::Arc;

use serde_json::json;
use studioflow_types::{
    AgentRun, AgentStatus, ApprovalAction, ApprovalOutcome, ChatReply, ChatTurn, NonEmptyString,
};

use crate::dispatch::{Dispatch, fetch_json};
use crate::error::DispatchError;
use crate::request::{RequestDescriptor, path_segment};

pub const AGENT_RUN_PATH: &str = "/agent/run";
pub const AGENT_STATUS_PATH: &str = "/agent/status";
pub const AGENT_APPROVE_PATH: &str = "/agent/approve";
pub const AGENT_CHAT_PATH: &str = "/agent/chat";

pub const DEFAULT_MODEL_PROVIDER: &str = "gemini";

fn required(field: &str, value: &str) -> Result<NonEmptyString, DispatchError> {
    NonEmptyString::new(value.trim())
        .map_err(|_| DispatchError::InvalidRequest(format!("{field} must not be empty")))
}

#[derive(Clone)]
pub struct AgentClient {
    dispatcher: Arc<dyn Dispatch>,
}

impl AgentClient {
    pub(crate) fn new(dispatcher: Arc<dyn Dispatch>) -> Self {
        Self { dispatcher }
    }

    /// Start a drafting workflow. `provider` of `None` uses [`DEFAULT_MODEL_PROVIDER`].
    pub async fn run(&self, input: &str, provider: Option<&str>) -> Result<AgentRun, DispatchError> {
        let input = required("input", input)?;
        let body = json!({
            "input": input.as_str(),
            "model_provider": provider.unwrap_or(DEFAULT_MODEL_PROVIDER),
        });
        let request = RequestDescriptor::post(AGENT_RUN_PATH).with_json(&body)?;
        fetch_json(self.dispatcher.as_ref(), request).await
    }

    pub async fn status(&self, thread_id: &str) -> Result<AgentStatus, DispatchError> {
        let thread_id = required("thread_id", thread_id)?;
        let path = format!("{AGENT_STATUS_PATH}/{}", path_segment(&thread_id));
        fetch_json(self.dispatcher.as_ref(), RequestDescriptor::get(path)).await
    }

    pub async fn approve(
        &self,
        thread_id: &str,
        action: ApprovalAction,
    ) -> Result<ApprovalOutcome, DispatchError> {
        let thread_id = required("thread_id", thread_id)?;
        let path = format!("{AGENT_APPROVE_PATH}/{}", path_segment(&thread_id));
        let request =
            RequestDescriptor::post(path).with_json(&json!({ "action": action.as_str() }))?;
        fetch_json(self.dispatcher.as_ref(), request).await
    }

    /// One chat exchange. The whole reply arrives in a single response.
    pub async fn chat(&self, message: &str, history: &[ChatTurn]) -> Result<ChatReply, DispatchError> {
        let message = required("message", message)?;
        let body = json!({
            "input": message.as_str(),
            "chat_history": history,
        });
        let request = RequestDescriptor::post(AGENT_CHAT_PATH).with_json(&body)?;
        fetch_json(self.dispatcher.as_ref(), request).await
    }
}
