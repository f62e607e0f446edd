use async_trait::async_trait;

use super::{ModelProvider, ModelReply, ModelRequest};

#[derive(Debug, Default)]
pub struct MockModelProvider;

#[async_trait]
impl ModelProvider for MockModelProvider {
    async fn complete(&self, request: ModelRequest) -> anyhow::Result<ModelReply> {
        let last_user = request
            .conversation
            .iter()
            .rev()
            .find(|turn| turn.tool_call.is_none() && turn.tool_name.is_none())
            .map(|turn| turn.content.as_str())
            .unwrap_or_default();

        Ok(ModelReply::Text(format!(
            "NutriCoach mock reply to: {last_user}"
        )))
    }
}
