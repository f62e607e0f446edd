use std::cmp::Ordering;
use std::sync::Arc;

use serde_json::{Value, json};
use tracing::debug;

use crate::{
    catalog::{FoodCatalog, FoodFilters},
    types::{ToolDescriptor, ToolResult},
};

/// Payloads stay small: filtered candidates are ranked by protein-per-calorie
/// density and truncated so the most nutritionally efficient options surface
/// first.
const MAX_RESULTS: usize = 5;

pub struct FoodSearchTool {
    catalog: Arc<dyn FoodCatalog>,
}

impl FoodSearchTool {
    pub fn new(catalog: Arc<dyn FoodCatalog>) -> Self {
        Self { catalog }
    }

    pub async fn run(&self, args: Value) -> anyhow::Result<ToolResult> {
        let filters: FoodFilters = serde_json::from_value(args)?;

        let mut records = self.catalog.search(&filters).await?;
        // Stable sort: ties keep the catalog's source order.
        records.sort_by(|a, b| {
            b.protein_density()
                .partial_cmp(&a.protein_density())
                .unwrap_or(Ordering::Equal)
        });
        records.truncate(MAX_RESULTS);

        debug!(result_count = records.len(), "food search completed");

        let results = records
            .iter()
            .map(|record| record.suggestion())
            .collect::<Vec<_>>();
        Ok(ToolResult::ok(json!({ "results": results })))
    }
}

pub(super) fn descriptor() -> ToolDescriptor {
    ToolDescriptor {
        name: "search_foods".to_owned(),
        description: "Search the food catalog with optional filters; returns up to 5 foods ranked by protein per calorie.".to_owned(),
        parameters: json!({
            "type": "object",
            "properties": {
                "query": { "type": "string", "description": "Substring of the food name" },
                "min_protein": { "type": "number", "description": "Minimum protein per 100 g" },
                "max_calories": { "type": "number", "description": "Maximum calories per 100 g" },
                "max_carbs": { "type": "number", "description": "Maximum carbs per 100 g" },
                "max_fat": { "type": "number", "description": "Maximum fat per 100 g" },
                "category": { "type": "string", "description": "Food category such as protein, dairy, fruit" },
                "verified_only": { "type": "boolean", "description": "Only return verified catalog entries" }
            },
            "required": []
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::FoodSearchTool;
    use crate::catalog::InMemoryFoodCatalog;

    fn tool() -> FoodSearchTool {
        FoodSearchTool::new(Arc::new(InMemoryFoodCatalog::with_sample_foods()))
    }

    #[tokio::test]
    async fn ranks_by_protein_density_descending() {
        let result = tool()
            .run(json!({ "min_protein": 8.0 }))
            .await
            .expect("search should succeed");

        let data = result.data.expect("search should carry data");
        let results = data["results"].as_array().expect("results array");
        assert!(results.len() >= 2);

        let densities = results
            .iter()
            .map(|entry| {
                let protein = entry["protein"].as_f64().expect("protein");
                let calories = entry["calories"].as_f64().expect("calories");
                protein / calories
            })
            .collect::<Vec<_>>();
        for pair in densities.windows(2) {
            assert!(pair[0] >= pair[1], "results must be sorted by density");
        }
    }

    #[tokio::test]
    async fn truncates_to_five_results() {
        let result = tool().run(json!({})).await.expect("search should succeed");

        let data = result.data.expect("search should carry data");
        assert_eq!(data["results"].as_array().expect("results array").len(), 5);
    }

    #[tokio::test]
    async fn malformed_filter_type_is_an_error_result() {
        let registry_result = tool().run(json!({ "max_calories": "few" })).await;
        assert!(registry_result.is_err());
    }

    #[tokio::test]
    async fn empty_match_set_returns_empty_results() {
        let result = tool()
            .run(json!({ "query": "unobtainium" }))
            .await
            .expect("search should succeed");

        let data = result.data.expect("search should carry data");
        assert!(data["results"].as_array().expect("results array").is_empty());
    }
}
