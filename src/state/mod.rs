mod in_memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use in_memory::InMemoryUserState;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct MacroTotals {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

/// Point-in-time view of the user's nutrition state, read once per request by
/// the context builder and by the status tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserStateView {
    pub display_name: String,
    pub targets: MacroTotals,
    pub consumed: MacroTotals,
    pub entries_logged_today: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub sleep_hours: Option<f64>,
    pub strain: Option<f64>,
}

#[async_trait]
pub trait UserStateSource: Send + Sync {
    async fn current(&self) -> anyhow::Result<UserStateView>;
}

/// A food log entry with nutrition already scaled to the logged portion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodLogEntry {
    pub name: String,
    pub grams: f64,
    pub totals: MacroTotals,
}

/// The single mutation path for logging food. Logging through a tool must have
/// the same side effects (entry and streak accounting) as logging through the
/// app's own UI.
#[async_trait]
pub trait FoodLogSink: Send + Sync {
    async fn log_food(&self, entry: FoodLogEntry) -> anyhow::Result<()>;
}
