mod mock;
mod openrouter;

use async_trait::async_trait;

pub use mock::MockModelProvider;
pub use openrouter::OpenRouterProvider;

use crate::types::{ChatTurn, ToolCallRequest, ToolDescriptor};

#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub system_prompt: String,
    pub conversation: Vec<ChatTurn>,
    pub tools: Vec<ToolDescriptor>,
}

/// A remote generation result: either a direct answer, a request to run a
/// local tool, or nothing usable.
#[derive(Debug, Clone)]
pub enum ModelReply {
    Text(String),
    ToolCall(ToolCallRequest),
    Empty,
}

#[async_trait]
pub trait ModelProvider: Send + Sync {
    async fn complete(&self, request: ModelRequest) -> anyhow::Result<ModelReply>;
}
