use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use crate::{
    cache::ResponseCache,
    catalog::FoodCatalog,
    state::{FoodLogEntry, FoodLogSink, MacroTotals},
    types::{ToolDescriptor, ToolResult},
};

const DEFAULT_PORTION_GRAMS: f64 = 100.0;

#[derive(Debug, Deserialize)]
struct LogFoodArgs {
    name: String,
    grams: Option<f64>,
}

/// Logs a catalog food through the same mutation path the rest of the app
/// uses, so streak and entry accounting are identical to a UI log. A
/// successful log invalidates every cached generated message.
pub struct LogFoodTool {
    catalog: Arc<dyn FoodCatalog>,
    sink: Arc<dyn FoodLogSink>,
    cache: ResponseCache,
}

impl LogFoodTool {
    pub fn new(
        catalog: Arc<dyn FoodCatalog>,
        sink: Arc<dyn FoodLogSink>,
        cache: ResponseCache,
    ) -> Self {
        Self {
            catalog,
            sink,
            cache,
        }
    }

    pub async fn run(&self, args: Value) -> anyhow::Result<ToolResult> {
        let args: LogFoodArgs = serde_json::from_value(args)?;
        let grams = args.grams.unwrap_or(DEFAULT_PORTION_GRAMS);
        if !(grams > 0.0) {
            return Ok(ToolResult::err(format!(
                "Portion must be positive, got {grams}"
            )));
        }

        let Some(record) = self.catalog.find(&args.name).await? else {
            return Ok(ToolResult::err(format!("Food not found: {}", args.name)));
        };

        let scale = grams / 100.0;
        let totals = MacroTotals {
            calories: record.per_100g.calories * scale,
            protein: record.per_100g.protein * scale,
            carbs: record.per_100g.carbs * scale,
            fat: record.per_100g.fat * scale,
        };

        self.sink
            .log_food(FoodLogEntry {
                name: record.name.clone(),
                grams,
                totals,
            })
            .await?;
        self.cache.clear().await;

        info!(food = %record.name, grams, "food logged via tool");

        Ok(ToolResult::ok(json!({
            "logged": record.name,
            "grams": grams,
            "calories": totals.calories,
            "protein": totals.protein,
            "carbs": totals.carbs,
            "fat": totals.fat,
        })))
    }
}

pub(super) fn descriptor() -> ToolDescriptor {
    ToolDescriptor {
        name: "log_food".to_owned(),
        description: "Log a food from the catalog to the user's diary. Portion in grams, default 100.".to_owned(),
        parameters: json!({
            "type": "object",
            "properties": {
                "name": { "type": "string", "description": "Name of the food to log" },
                "grams": { "type": "number", "description": "Portion size in grams (default 100)" }
            },
            "required": ["name"]
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::LogFoodTool;
    use crate::{
        cache::ResponseCache,
        catalog::InMemoryFoodCatalog,
        state::{InMemoryUserState, UserStateSource},
        store::InMemoryKeyValueStore,
    };

    fn tool_with_state() -> (LogFoodTool, Arc<InMemoryUserState>, ResponseCache) {
        let state = Arc::new(InMemoryUserState::with_defaults());
        let cache = ResponseCache::new(Arc::new(InMemoryKeyValueStore::default()));
        let tool = LogFoodTool::new(
            Arc::new(InMemoryFoodCatalog::with_sample_foods()),
            state.clone(),
            cache.clone(),
        );
        (tool, state, cache)
    }

    #[tokio::test]
    async fn scales_nutrition_by_portion_and_mutates_state() {
        let (tool, state, _cache) = tool_with_state();

        let result = tool
            .run(json!({ "name": "chicken breast", "grams": 200.0 }))
            .await
            .expect("log should succeed");

        assert!(result.success);
        let data = result.data.expect("log should carry data");
        assert_eq!(data["calories"], json!(330.0));
        assert_eq!(data["protein"], json!(62.0));

        let view = state.current().await.expect("read should succeed");
        assert_eq!(view.consumed.calories, 330.0);
        assert_eq!(view.entries_logged_today, 1);
        assert_eq!(view.current_streak, 1);
    }

    #[tokio::test]
    async fn default_portion_is_100_grams() {
        let (tool, state, _cache) = tool_with_state();

        let result = tool
            .run(json!({ "name": "greek yogurt" }))
            .await
            .expect("log should succeed");

        assert!(result.success);
        let view = state.current().await.expect("read should succeed");
        assert_eq!(view.consumed.calories, 59.0);

        let data = result.data.expect("log should carry data");
        assert_eq!(data["grams"], json!(100.0));
    }

    #[tokio::test]
    async fn successful_log_clears_cached_messages() {
        let (tool, _state, cache) = tool_with_state();
        cache.put("insight", "stale insight").await;

        let result = tool
            .run(json!({ "name": "apple" }))
            .await
            .expect("log should succeed");
        assert!(result.success);

        assert_eq!(cache.get("insight").await, None);
    }

    #[tokio::test]
    async fn unknown_food_is_an_error_result() {
        let (tool, state, _cache) = tool_with_state();

        let result = tool
            .run(json!({ "name": "unicorn steak" }))
            .await
            .expect("tool should not fail outright");

        assert!(!result.success);
        assert_eq!(
            result.error.as_deref(),
            Some("Food not found: unicorn steak")
        );
        let view = state.current().await.expect("read should succeed");
        assert_eq!(view.entries_logged_today, 0);
    }

    #[tokio::test]
    async fn non_positive_portion_is_rejected() {
        let (tool, _state, _cache) = tool_with_state();

        let result = tool
            .run(json!({ "name": "apple", "grams": 0.0 }))
            .await
            .expect("tool should not fail outright");

        assert!(!result.success);
    }
}
