use std::sync::Arc;

use chrono::{Local, NaiveDate, Timelike};
use tracing::warn;

use crate::{
    state::UserStateSource,
    store::KeyValueStore,
    types::{ContextSnapshot, TimeOfDay},
};

const LAST_OPEN_KEY: &str = "coach:last_open_date";

/// Builds an immutable [`ContextSnapshot`] from the user state source and the
/// last-open marker. A fresh snapshot is produced per invocation and never
/// mutated afterwards.
#[derive(Clone)]
pub struct ContextBuilder {
    state: Arc<dyn UserStateSource>,
    store: Arc<dyn KeyValueStore>,
}

impl ContextBuilder {
    pub fn new(state: Arc<dyn UserStateSource>, store: Arc<dyn KeyValueStore>) -> Self {
        Self { state, store }
    }

    pub async fn build(&self) -> anyhow::Result<ContextSnapshot> {
        let now = Local::now();
        self.build_at(now.hour(), now.date_naive()).await
    }

    async fn build_at(&self, hour: u32, today: NaiveDate) -> anyhow::Result<ContextSnapshot> {
        let view = self.state.current().await?;
        let is_first_open_today = self.check_first_open(today).await;

        let progress_percent = if view.targets.calories > 0.0 {
            (view.consumed.calories / view.targets.calories * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        };

        Ok(ContextSnapshot {
            time_of_day: TimeOfDay::from_hour(hour),
            is_first_open_today,
            display_name: view.display_name,
            calories_consumed: view.consumed.calories.max(0.0),
            calories_remaining: (view.targets.calories - view.consumed.calories).max(0.0),
            protein_consumed: view.consumed.protein.max(0.0),
            protein_remaining: (view.targets.protein - view.consumed.protein).max(0.0),
            carbs_remaining: (view.targets.carbs - view.consumed.carbs).max(0.0),
            fat_remaining: (view.targets.fat - view.consumed.fat).max(0.0),
            progress_percent,
            entries_logged_today: view.entries_logged_today,
            current_streak: view.current_streak,
            longest_streak: view.longest_streak,
            sleep_hours: view.sleep_hours,
            strain: view.strain,
        })
    }

    /// Compares the stored last-open marker with today's date and advances it.
    /// Marker store failures degrade to `false` rather than failing the build.
    async fn check_first_open(&self, today: NaiveDate) -> bool {
        let today_marker = today.format("%Y-%m-%d").to_string();

        let stored = match self.store.get(LAST_OPEN_KEY).await {
            Ok(stored) => stored,
            Err(error) => {
                warn!(?error, "failed to read last-open marker");
                return false;
            }
        };

        let is_first = stored.as_deref() != Some(today_marker.as_str());
        if is_first {
            if let Err(error) = self.store.set(LAST_OPEN_KEY, &today_marker).await {
                warn!(?error, "failed to advance last-open marker");
            }
        }
        is_first
    }
}
