use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
    catalog::FoodCatalog,
    types::{ToolDescriptor, ToolResult},
};

#[derive(Debug, Deserialize)]
struct FoodDetailsArgs {
    name: String,
}

pub struct FoodDetailsTool {
    catalog: Arc<dyn FoodCatalog>,
}

impl FoodDetailsTool {
    pub fn new(catalog: Arc<dyn FoodCatalog>) -> Self {
        Self { catalog }
    }

    pub async fn run(&self, args: Value) -> anyhow::Result<ToolResult> {
        let args: FoodDetailsArgs = serde_json::from_value(args)?;

        let Some(record) = self.catalog.find(&args.name).await? else {
            return Ok(ToolResult::err(format!("Food not found: {}", args.name)));
        };

        Ok(ToolResult::ok(json!({
            "name": record.name,
            "category": record.category,
            "calories": record.per_100g.calories,
            "protein": record.per_100g.protein,
            "carbs": record.per_100g.carbs,
            "fat": record.per_100g.fat,
            "verified": record.verified,
        })))
    }
}

pub(super) fn descriptor() -> ToolDescriptor {
    ToolDescriptor {
        name: "get_food_details".to_owned(),
        description: "Look up one food's nutrition per 100 g by name.".to_owned(),
        parameters: json!({
            "type": "object",
            "properties": {
                "name": { "type": "string", "description": "Name of the food" }
            },
            "required": ["name"]
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::FoodDetailsTool;
    use crate::catalog::InMemoryFoodCatalog;

    #[tokio::test]
    async fn returns_full_nutrition_for_known_food() {
        let tool = FoodDetailsTool::new(Arc::new(InMemoryFoodCatalog::with_sample_foods()));

        let result = tool
            .run(json!({ "name": "salmon fillet" }))
            .await
            .expect("details should succeed");

        assert!(result.success);
        let data = result.data.expect("details should carry data");
        assert_eq!(data["calories"], json!(208.0));
        assert_eq!(data["verified"], json!(true));
    }

    #[tokio::test]
    async fn unknown_food_is_an_error_result() {
        let tool = FoodDetailsTool::new(Arc::new(InMemoryFoodCatalog::with_sample_foods()));

        let result = tool
            .run(json!({ "name": "moon cheese" }))
            .await
            .expect("tool should not fail outright");

        assert!(!result.success);
        assert!(result.error.expect("error message").contains("moon cheese"));
    }
}
