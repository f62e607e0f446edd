use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeOfDay {
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=11 => TimeOfDay::Morning,
            12..=16 => TimeOfDay::Afternoon,
            17..=21 => TimeOfDay::Evening,
            _ => TimeOfDay::Night,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TimeOfDay::Morning => "morning",
            TimeOfDay::Afternoon => "afternoon",
            TimeOfDay::Evening => "evening",
            TimeOfDay::Night => "night",
        }
    }
}

/// Immutable summary of the user's nutrition state, built fresh per request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextSnapshot {
    pub time_of_day: TimeOfDay,
    pub is_first_open_today: bool,
    pub display_name: String,
    pub calories_consumed: f64,
    pub calories_remaining: f64,
    pub protein_consumed: f64,
    pub protein_remaining: f64,
    pub carbs_remaining: f64,
    pub fat_remaining: f64,
    pub progress_percent: f64,
    pub entries_logged_today: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub sleep_hours: Option<f64>,
    pub strain: Option<f64>,
}

impl Default for ContextSnapshot {
    fn default() -> Self {
        Self {
            time_of_day: TimeOfDay::Night,
            is_first_open_today: false,
            display_name: String::new(),
            calories_consumed: 0.0,
            calories_remaining: 0.0,
            protein_consumed: 0.0,
            protein_remaining: 0.0,
            carbs_remaining: 0.0,
            fat_remaining: 0.0,
            progress_percent: 0.0,
            entries_logged_today: 0,
            current_streak: 0,
            longest_streak: 0,
            sleep_hours: None,
            strain: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Assistant,
    Tool,
}

impl ChatRole {
    pub fn as_str(self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
            ChatRole::Tool => "tool",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallRequest {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call: Option<ToolCallRequest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
            tool_call: None,
            tool_name: None,
        }
    }

    pub fn assistant_tool_call(call: ToolCallRequest) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: String::new(),
            tool_call: Some(call),
            tool_name: None,
        }
    }

    pub fn tool(tool_name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Tool,
            content: content.into(),
            tool_call: None,
            tool_name: Some(tool_name.into()),
        }
    }
}

/// Uniform envelope produced by every tool invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub success: bool,
    pub data: Option<Value>,
    pub error: Option<String>,
}

impl ToolResult {
    pub fn ok(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Tool metadata handed to the remote generation endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodSuggestion {
    pub name: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub verified: bool,
}

/// Terminal output of every orchestration path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoachResponse {
    pub text: String,
    pub tools_used: Vec<String>,
    pub foods_suggested: Vec<FoodSuggestion>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageCategory {
    Greeting,
    Insight,
    Recommendation,
    Summary,
}

impl MessageCategory {
    pub const ALL: [MessageCategory; 4] = [
        MessageCategory::Greeting,
        MessageCategory::Insight,
        MessageCategory::Recommendation,
        MessageCategory::Summary,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MessageCategory::Greeting => "greeting",
            MessageCategory::Insight => "insight",
            MessageCategory::Recommendation => "recommendation",
            MessageCategory::Summary => "summary",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "greeting" => Some(MessageCategory::Greeting),
            "insight" => Some(MessageCategory::Insight),
            "recommendation" => Some(MessageCategory::Recommendation),
            "summary" => Some(MessageCategory::Summary),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{MessageCategory, TimeOfDay};

    #[test]
    fn time_of_day_buckets_cover_all_hours() {
        assert_eq!(TimeOfDay::from_hour(5), TimeOfDay::Morning);
        assert_eq!(TimeOfDay::from_hour(11), TimeOfDay::Morning);
        assert_eq!(TimeOfDay::from_hour(12), TimeOfDay::Afternoon);
        assert_eq!(TimeOfDay::from_hour(16), TimeOfDay::Afternoon);
        assert_eq!(TimeOfDay::from_hour(17), TimeOfDay::Evening);
        assert_eq!(TimeOfDay::from_hour(21), TimeOfDay::Evening);
        assert_eq!(TimeOfDay::from_hour(22), TimeOfDay::Night);
        assert_eq!(TimeOfDay::from_hour(4), TimeOfDay::Night);
    }

    #[test]
    fn message_category_round_trips_through_str() {
        for category in MessageCategory::ALL {
            assert_eq!(MessageCategory::parse(category.as_str()), Some(category));
        }
        assert_eq!(MessageCategory::parse("weather"), None);
    }
}
