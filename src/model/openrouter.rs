use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::warn;

use super::{ModelProvider, ModelReply, ModelRequest};
use crate::types::{ChatRole, ToolCallRequest};

const ENDPOINT: &str = "https://openrouter.ai/api/v1/chat/completions";
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// OpenRouter-compatible chat-completions client with tool calling. A request
/// that exceeds the client timeout surfaces as a transport error, identical to
/// any other network failure.
#[derive(Debug, Clone)]
pub struct OpenRouterProvider {
    client: Client,
    api_key: String,
    model: String,
    referer: Option<String>,
    title: Option<String>,
}

impl OpenRouterProvider {
    pub fn new(api_key: String, model: String) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            api_key,
            model,
            referer: None,
            title: None,
        })
    }

    pub fn with_headers(mut self, referer: Option<String>, title: Option<String>) -> Self {
        self.referer = referer;
        self.title = title;
        self
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Debug, Deserialize)]
struct WireToolCall {
    function: WireToolFunction,
}

#[derive(Debug, Deserialize)]
struct WireToolFunction {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[async_trait]
impl ModelProvider for OpenRouterProvider {
    async fn complete(&self, request: ModelRequest) -> anyhow::Result<ModelReply> {
        let payload = ChatCompletionRequest {
            model: &self.model,
            messages: build_messages(&request),
            tools: build_tools(&request),
        };

        let mut http_request = self
            .client
            .post(ENDPOINT)
            .bearer_auth(&self.api_key)
            .json(&payload);
        if let Some(referer) = &self.referer {
            http_request = http_request.header("HTTP-Referer", referer);
        }
        if let Some(title) = &self.title {
            http_request = http_request.header("X-Title", title);
        }

        let response = http_request
            .send()
            .await?
            .error_for_status()?
            .json::<ChatCompletionResponse>()
            .await?;

        let message = response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| anyhow::anyhow!("model returned no choices"))?;

        if let Some(call) = message.tool_calls.and_then(|calls| calls.into_iter().next()) {
            let arguments = if call.function.arguments.trim().is_empty() {
                json!({})
            } else {
                serde_json::from_str(&call.function.arguments).unwrap_or_else(|error| {
                    warn!(?error, tool = %call.function.name, "unparsable tool arguments replaced with empty object");
                    json!({})
                })
            };
            return Ok(ModelReply::ToolCall(ToolCallRequest {
                name: call.function.name,
                arguments,
            }));
        }

        match message.content {
            Some(content) if !content.trim().is_empty() => Ok(ModelReply::Text(content)),
            _ => Ok(ModelReply::Empty),
        }
    }
}

fn build_messages(request: &ModelRequest) -> Vec<Value> {
    let mut messages = vec![json!({
        "role": "system",
        "content": request.system_prompt,
    })];

    let mut last_call_id = 0usize;
    for turn in &request.conversation {
        match turn.role {
            ChatRole::Assistant if turn.tool_call.is_some() => {
                if let Some(call) = &turn.tool_call {
                    last_call_id += 1;
                    messages.push(json!({
                        "role": "assistant",
                        "content": Value::Null,
                        "tool_calls": [{
                            "id": format!("call_{last_call_id}"),
                            "type": "function",
                            "function": {
                                "name": call.name,
                                "arguments": call.arguments.to_string(),
                            }
                        }],
                    }));
                }
            }
            ChatRole::Tool => {
                messages.push(json!({
                    "role": "tool",
                    "tool_call_id": format!("call_{last_call_id}"),
                    "name": turn.tool_name,
                    "content": turn.content,
                }));
            }
            _ => {
                messages.push(json!({
                    "role": turn.role.as_str(),
                    "content": turn.content,
                }));
            }
        }
    }

    messages
}

fn build_tools(request: &ModelRequest) -> Vec<Value> {
    request
        .tools
        .iter()
        .map(|descriptor| {
            json!({
                "type": "function",
                "function": {
                    "name": descriptor.name,
                    "description": descriptor.description,
                    "parameters": descriptor.parameters,
                }
            })
        })
        .collect()
}
