mod details;
mod knowledge;
mod log_entry;
mod search;
mod status;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

pub use details::FoodDetailsTool;
pub use knowledge::NutritionFactsTool;
pub use log_entry::LogFoodTool;
pub use search::FoodSearchTool;
pub use status::NutritionStatusTool;

use crate::types::{ToolDescriptor, ToolResult};

/// Closed set of tool names the orchestrator can dispatch. Adding a tool means
/// extending this enum and the registry match, checked at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolName {
    GetNutritionStatus,
    SearchFoods,
    LogFood,
    GetFoodDetails,
    LookupNutritionFacts,
}

impl ToolName {
    pub const ALL: [ToolName; 5] = [
        ToolName::GetNutritionStatus,
        ToolName::SearchFoods,
        ToolName::LogFood,
        ToolName::GetFoodDetails,
        ToolName::LookupNutritionFacts,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ToolName::GetNutritionStatus => "get_nutrition_status",
            ToolName::SearchFoods => "search_foods",
            ToolName::LogFood => "log_food",
            ToolName::GetFoodDetails => "get_food_details",
            ToolName::LookupNutritionFacts => "lookup_nutrition_facts",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|name| name.as_str() == raw)
    }
}

#[async_trait]
pub trait ToolExecutor: Send + Sync {
    /// Runs a named tool. Never fails: every internal error is converted into
    /// a `ToolResult` with `success: false`.
    async fn execute(&self, tool_name: &str, args: Value) -> ToolResult;

    fn descriptors(&self) -> Vec<ToolDescriptor>;
}

pub struct ToolRegistry {
    pub status: NutritionStatusTool,
    pub search: FoodSearchTool,
    pub log: LogFoodTool,
    pub details: FoodDetailsTool,
    pub knowledge: NutritionFactsTool,
}

#[async_trait]
impl ToolExecutor for ToolRegistry {
    async fn execute(&self, tool_name: &str, args: Value) -> ToolResult {
        let Some(name) = ToolName::parse(tool_name) else {
            debug!(tool_name, "rejecting unknown tool");
            return ToolResult::err(format!("Unknown tool: {tool_name}"));
        };

        let result = match name {
            ToolName::GetNutritionStatus => self.status.run(args).await,
            ToolName::SearchFoods => self.search.run(args).await,
            ToolName::LogFood => self.log.run(args).await,
            ToolName::GetFoodDetails => self.details.run(args).await,
            ToolName::LookupNutritionFacts => self.knowledge.run(args).await,
        };

        result.unwrap_or_else(|error| ToolResult::err(error.to_string()))
    }

    fn descriptors(&self) -> Vec<ToolDescriptor> {
        vec![
            status::descriptor(),
            search::descriptor(),
            log_entry::descriptor(),
            details::descriptor(),
            knowledge::descriptor(),
        ]
    }
}
