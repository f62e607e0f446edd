use std::sync::Arc;

use serde_json::{Value, json};

use crate::{
    state::UserStateSource,
    types::{ToolDescriptor, ToolResult},
};

/// Reads the user's current macro totals and streak. Takes no arguments.
pub struct NutritionStatusTool {
    state: Arc<dyn UserStateSource>,
}

impl NutritionStatusTool {
    pub fn new(state: Arc<dyn UserStateSource>) -> Self {
        Self { state }
    }

    pub async fn run(&self, _args: Value) -> anyhow::Result<ToolResult> {
        let view = self.state.current().await?;

        Ok(ToolResult::ok(json!({
            "calories_consumed": view.consumed.calories,
            "calories_remaining": (view.targets.calories - view.consumed.calories).max(0.0),
            "protein_consumed": view.consumed.protein,
            "protein_remaining": (view.targets.protein - view.consumed.protein).max(0.0),
            "carbs_remaining": (view.targets.carbs - view.consumed.carbs).max(0.0),
            "fat_remaining": (view.targets.fat - view.consumed.fat).max(0.0),
            "entries_logged_today": view.entries_logged_today,
            "current_streak": view.current_streak,
            "longest_streak": view.longest_streak,
        })))
    }
}

pub(super) fn descriptor() -> ToolDescriptor {
    ToolDescriptor {
        name: "get_nutrition_status".to_owned(),
        description: "Get the user's calories and macros consumed and remaining today, plus entry count and streak.".to_owned(),
        parameters: json!({
            "type": "object",
            "properties": {},
            "required": []
        }),
    }
}
