use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{FoodLogEntry, FoodLogSink, MacroTotals, UserStateSource, UserStateView};

#[derive(Debug)]
pub struct InMemoryUserState {
    inner: RwLock<UserStateView>,
}

impl InMemoryUserState {
    pub fn new(view: UserStateView) -> Self {
        Self {
            inner: RwLock::new(view),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(UserStateView {
            display_name: String::new(),
            targets: MacroTotals {
                calories: 2200.0,
                protein: 150.0,
                carbs: 220.0,
                fat: 75.0,
            },
            consumed: MacroTotals::default(),
            entries_logged_today: 0,
            current_streak: 0,
            longest_streak: 0,
            sleep_hours: None,
            strain: None,
        })
    }
}

#[async_trait]
impl UserStateSource for InMemoryUserState {
    async fn current(&self) -> anyhow::Result<UserStateView> {
        Ok(self.inner.read().await.clone())
    }
}

#[async_trait]
impl FoodLogSink for InMemoryUserState {
    async fn log_food(&self, entry: FoodLogEntry) -> anyhow::Result<()> {
        let mut state = self.inner.write().await;
        state.consumed.calories += entry.totals.calories;
        state.consumed.protein += entry.totals.protein;
        state.consumed.carbs += entry.totals.carbs;
        state.consumed.fat += entry.totals.fat;

        // The first log of the day extends the streak; later logs only count
        // as entries.
        if state.entries_logged_today == 0 {
            state.current_streak += 1;
            state.longest_streak = state.longest_streak.max(state.current_streak);
        }
        state.entries_logged_today += 1;
        Ok(())
    }
}
