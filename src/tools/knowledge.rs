use serde::Deserialize;
use serde_json::{Value, json};

use crate::types::{ToolDescriptor, ToolResult};

const FACTS: &[(&str, &str)] = &[
    (
        "protein",
        "Protein supports muscle repair and satiety. A common target is 1.6-2.2 g per kg of body weight per day, spread across meals.",
    ),
    (
        "carbs",
        "Carbohydrates are the body's preferred fuel for training. Timing most carbs around workouts helps performance and recovery.",
    ),
    (
        "fat",
        "Dietary fat supports hormone production. Keeping it around 20-35% of daily calories is a reasonable baseline.",
    ),
    (
        "fiber",
        "Fiber aids digestion and fullness. Aim for roughly 14 g per 1000 kcal, mostly from vegetables, fruit and whole grains.",
    ),
    (
        "hydration",
        "Water needs vary with activity; around 30-35 ml per kg of body weight per day is a common starting point.",
    ),
    (
        "creatine",
        "Creatine monohydrate at 3-5 g daily is one of the best-studied supplements for strength and lean mass.",
    ),
    (
        "streak",
        "Consistency beats perfection: logging every day, even imperfect days, is the strongest predictor of long-term progress.",
    ),
];

#[derive(Debug, Deserialize)]
struct FactArgs {
    topic: String,
}

/// Serves a small built-in nutrition knowledge table keyed by topic.
#[derive(Debug, Default)]
pub struct NutritionFactsTool;

impl NutritionFactsTool {
    pub async fn run(&self, args: Value) -> anyhow::Result<ToolResult> {
        let args: FactArgs = serde_json::from_value(args)?;
        let topic = args.topic.trim().to_lowercase();

        let fact = FACTS
            .iter()
            .find(|(key, _)| topic.contains(key))
            .map(|(_, fact)| *fact);

        match fact {
            Some(fact) => Ok(ToolResult::ok(json!({
                "topic": topic,
                "fact": fact,
            }))),
            None => Ok(ToolResult::err(format!(
                "No knowledge entry for topic: {topic}"
            ))),
        }
    }
}

pub(super) fn descriptor() -> ToolDescriptor {
    ToolDescriptor {
        name: "lookup_nutrition_facts".to_owned(),
        description: "Look up a short evidence-based nutrition fact by topic (protein, carbs, fat, fiber, hydration, creatine, streak).".to_owned(),
        parameters: json!({
            "type": "object",
            "properties": {
                "topic": { "type": "string", "description": "Topic to look up" }
            },
            "required": ["topic"]
        }),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::NutritionFactsTool;

    #[tokio::test]
    async fn known_topic_returns_fact() {
        let tool = NutritionFactsTool;
        let result = tool
            .run(json!({ "topic": "how much protein do I need" }))
            .await
            .expect("lookup should succeed");

        assert!(result.success);
        let data = result.data.expect("fact should carry data");
        assert!(data["fact"].as_str().expect("fact text").contains("Protein"));
    }

    #[tokio::test]
    async fn unknown_topic_is_an_error_result() {
        let tool = NutritionFactsTool;
        let result = tool
            .run(json!({ "topic": "astrology" }))
            .await
            .expect("tool should not fail outright");

        assert!(!result.success);
        assert!(result.error.expect("error message").contains("astrology"));
    }
}
