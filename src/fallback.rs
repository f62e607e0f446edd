//! Deterministic rule-based responses used whenever the remote generation
//! path is denied, unavailable or exhausted. Pure functions of the context
//! snapshot: no I/O, no failure paths.

use crate::types::{CoachResponse, ContextSnapshot, MessageCategory, TimeOfDay};

const HUNGER_KEYWORDS: &[&str] = &[
    "hungry", "hunger", "eat", "snack", "food", "meal", "craving", "starving",
];
const PROGRESS_KEYWORDS: &[&str] = &[
    "progress", "status", "how am i", "how'm i", "doing", "left", "remaining", "macros", "track",
];

const NEAR_GOAL_PERCENT: f64 = 80.0;
const LONG_STREAK_DAYS: u32 = 7;
const TIME_PRESSURE_MAX_PERCENT: f64 = 60.0;

/// Which condition a category fallback fired on. Ordering is the contract:
/// rules are evaluated top-down and the first match wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackRule {
    FirstOpen,
    GoalComplete,
    NearGoal,
    LongStreak,
    TimePressure,
    Default,
}

pub fn select_rule(context: &ContextSnapshot) -> FallbackRule {
    if context.is_first_open_today {
        FallbackRule::FirstOpen
    } else if context.progress_percent >= 100.0 {
        FallbackRule::GoalComplete
    } else if context.progress_percent >= NEAR_GOAL_PERCENT {
        FallbackRule::NearGoal
    } else if context.current_streak >= LONG_STREAK_DAYS {
        FallbackRule::LongStreak
    } else if context.time_of_day == TimeOfDay::Evening
        && context.progress_percent < TIME_PRESSURE_MAX_PERCENT
    {
        FallbackRule::TimePressure
    } else {
        FallbackRule::Default
    }
}

/// Fallback for open-ended chat: keyword intent first, then a generic nudge.
pub fn chat_fallback(context: &ContextSnapshot, message: &str) -> CoachResponse {
    let lowered = message.to_lowercase();

    let text = if contains_any(&lowered, HUNGER_KEYWORDS) {
        format!(
            "You have {:.0} kcal left today. A high-protein option like Greek yogurt or chicken breast would fit well right now.",
            context.calories_remaining
        )
    } else if contains_any(&lowered, PROGRESS_KEYWORDS) {
        format!(
            "You're at {:.0}% of your calorie goal with {:.0} kcal, {:.0} g protein, {:.0} g carbs and {:.0} g fat remaining. Current streak: {} days.",
            context.progress_percent,
            context.calories_remaining,
            context.protein_remaining,
            context.carbs_remaining,
            context.fat_remaining,
            context.current_streak
        )
    } else {
        format!(
            "Keep it going! You still have {:.0} kcal and {:.0} g protein to work with today.",
            context.calories_remaining, context.protein_remaining
        )
    };

    respond(text)
}

/// Fallback for category-based generation (greeting, insight, recommendation,
/// summary).
pub fn category_fallback(context: &ContextSnapshot, category: MessageCategory) -> CoachResponse {
    let rule = select_rule(context);
    let text = match category {
        MessageCategory::Greeting => greeting_text(context, rule),
        MessageCategory::Insight => insight_text(context, rule),
        MessageCategory::Recommendation => recommendation_text(context, rule),
        MessageCategory::Summary => summary_text(context),
    };
    respond(text)
}

fn greeting_text(context: &ContextSnapshot, rule: FallbackRule) -> String {
    let name = greeting_name(context);
    match rule {
        FallbackRule::FirstOpen => format!(
            "Good {}{name}! Fresh day, fresh {:.0} kcal to plan.",
            context.time_of_day.as_str(),
            context.calories_remaining
        ),
        FallbackRule::GoalComplete => {
            format!("You've hit your calorie goal for today{name}. Great work.")
        }
        FallbackRule::NearGoal => format!(
            "Almost there{name}: {:.0} kcal to go.",
            context.calories_remaining
        ),
        FallbackRule::LongStreak => format!(
            "{} days in a row{name}. That streak is becoming a habit.",
            context.current_streak
        ),
        FallbackRule::TimePressure => format!(
            "Evening check-in{name}: {:.0} kcal still unplanned. A solid dinner closes the gap.",
            context.calories_remaining
        ),
        FallbackRule::Default => format!(
            "Good {}{name}! You're at {:.0}% of today's goal.",
            context.time_of_day.as_str(),
            context.progress_percent
        ),
    }
}

fn insight_text(context: &ContextSnapshot, rule: FallbackRule) -> String {
    match rule {
        FallbackRule::FirstOpen => format!(
            "Starting the day with a plan works: {:.0} g protein spread over your meals keeps you ahead of your target.",
            context.protein_remaining
        ),
        FallbackRule::GoalComplete =>
            "Goal complete. Days like this are what move the long-term average.".to_owned(),
        FallbackRule::NearGoal => format!(
            "You're {:.0}% in. Lighter choices from here keep you inside the target.",
            context.progress_percent
        ),
        FallbackRule::LongStreak => format!(
            "A {}-day streak correlates strongly with hitting macro targets. Keep the chain unbroken.",
            context.current_streak
        ),
        FallbackRule::TimePressure => format!(
            "It's evening and you've used only {:.0}% of your calories. Under-eating late tends to trigger snacking, so plan a real dinner: {:.0} kcal and {:.0} g protein are still open.",
            context.progress_percent,
            context.calories_remaining,
            context.protein_remaining
        ),
        FallbackRule::Default => format!(
            "You've logged {} entr{} today and have {:.0} g protein remaining.",
            context.entries_logged_today,
            if context.entries_logged_today == 1 { "y" } else { "ies" },
            context.protein_remaining
        ),
    }
}

fn recommendation_text(context: &ContextSnapshot, rule: FallbackRule) -> String {
    match rule {
        FallbackRule::FirstOpen => {
            "Start with a protein-forward breakfast: eggs, Greek yogurt or oats with whey.".to_owned()
        }
        FallbackRule::GoalComplete => {
            "You're done for today. If you're still hungry, reach for something light like vegetables or tea.".to_owned()
        }
        FallbackRule::NearGoal => format!(
            "With {:.0} kcal left, a small high-protein snack fits best: cottage cheese or Greek yogurt.",
            context.calories_remaining
        ),
        FallbackRule::LongStreak => {
            "Your routine is working. Repeat yesterday's structure rather than changing things.".to_owned()
        }
        FallbackRule::TimePressure => format!(
            "Build dinner around {:.0} g protein: chicken breast or salmon with rice covers most of your remaining {:.0} kcal.",
            context.protein_remaining,
            context.calories_remaining
        ),
        FallbackRule::Default => format!(
            "Aim your next meal at {:.0} g protein to stay on pace.",
            (context.protein_remaining / 2.0).max(15.0)
        ),
    }
}

fn summary_text(context: &ContextSnapshot) -> String {
    format!(
        "Today: {:.0} kcal consumed ({:.0}% of goal), {:.0} g protein in, {} entr{} logged. Streak: {} days (best {}).",
        context.calories_consumed,
        context.progress_percent,
        context.protein_consumed,
        context.entries_logged_today,
        if context.entries_logged_today == 1 { "y" } else { "ies" },
        context.current_streak,
        context.longest_streak
    )
}

fn greeting_name(context: &ContextSnapshot) -> String {
    if context.display_name.is_empty() {
        String::new()
    } else {
        format!(", {}", context.display_name)
    }
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

fn respond(text: String) -> CoachResponse {
    CoachResponse {
        text,
        tools_used: Vec::new(),
        foods_suggested: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::{FallbackRule, category_fallback, chat_fallback, select_rule};
    use crate::types::{ContextSnapshot, MessageCategory, TimeOfDay};

    fn context() -> ContextSnapshot {
        ContextSnapshot {
            time_of_day: TimeOfDay::Afternoon,
            is_first_open_today: false,
            display_name: "Sam".to_owned(),
            calories_consumed: 900.0,
            calories_remaining: 1300.0,
            protein_consumed: 60.0,
            protein_remaining: 90.0,
            carbs_remaining: 120.0,
            fat_remaining: 40.0,
            progress_percent: 41.0,
            entries_logged_today: 2,
            current_streak: 2,
            longest_streak: 5,
            sleep_hours: None,
            strain: None,
        }
    }

    #[test]
    fn first_open_wins_over_goal_complete() {
        let mut ctx = context();
        ctx.is_first_open_today = true;
        ctx.progress_percent = 100.0;

        assert_eq!(select_rule(&ctx), FallbackRule::FirstOpen);
        let response = category_fallback(&ctx, MessageCategory::Greeting);
        assert!(response.text.contains("Fresh day"));
    }

    #[test]
    fn goal_complete_wins_over_near_goal() {
        let mut ctx = context();
        ctx.progress_percent = 100.0;
        assert_eq!(select_rule(&ctx), FallbackRule::GoalComplete);
    }

    #[test]
    fn near_goal_fires_at_80_percent() {
        let mut ctx = context();
        ctx.progress_percent = 80.0;
        assert_eq!(select_rule(&ctx), FallbackRule::NearGoal);

        ctx.progress_percent = 79.9;
        assert_ne!(select_rule(&ctx), FallbackRule::NearGoal);
    }

    #[test]
    fn long_streak_fires_at_seven_days() {
        let mut ctx = context();
        ctx.current_streak = 7;
        assert_eq!(select_rule(&ctx), FallbackRule::LongStreak);
    }

    #[test]
    fn time_pressure_needs_evening_and_low_progress() {
        let mut ctx = context();
        ctx.time_of_day = TimeOfDay::Evening;
        ctx.progress_percent = 45.0;
        assert_eq!(select_rule(&ctx), FallbackRule::TimePressure);

        ctx.progress_percent = 75.0;
        assert_eq!(select_rule(&ctx), FallbackRule::Default);

        ctx.progress_percent = 45.0;
        ctx.time_of_day = TimeOfDay::Morning;
        assert_eq!(select_rule(&ctx), FallbackRule::Default);
    }

    #[test]
    fn default_rule_when_nothing_matches() {
        assert_eq!(select_rule(&context()), FallbackRule::Default);
    }

    #[test]
    fn hunger_intent_gets_high_protein_nudge() {
        let response = chat_fallback(&context(), "I'm so hungry right now");
        assert!(response.text.contains("1300 kcal"));
        assert!(response.text.contains("high-protein"));
        assert!(response.tools_used.is_empty());
        assert!(response.foods_suggested.is_empty());
    }

    #[test]
    fn progress_intent_gets_status_line() {
        let response = chat_fallback(&context(), "what's my progress today?");
        assert!(response.text.contains("41%"));
        assert!(response.text.contains("90 g protein"));
        assert!(response.text.contains("streak: 2 days"));
    }

    #[test]
    fn hunger_intent_wins_over_progress_intent() {
        let response = chat_fallback(&context(), "I'm hungry, how am I doing?");
        assert!(response.text.contains("high-protein"));
    }

    #[test]
    fn other_messages_get_generic_encouragement() {
        let response = chat_fallback(&context(), "tell me a joke");
        assert!(response.text.contains("1300 kcal"));
        assert!(response.text.contains("90 g protein"));
    }

    #[test]
    fn every_category_produces_non_empty_text() {
        for category in MessageCategory::ALL {
            let response = category_fallback(&context(), category);
            assert!(!response.text.is_empty(), "{category:?} text must not be empty");
        }
    }

    #[test]
    fn summary_digest_reports_todays_numbers() {
        let response = category_fallback(&context(), MessageCategory::Summary);
        assert!(response.text.contains("900 kcal consumed"));
        assert!(response.text.contains("2 entries"));
        assert!(response.text.contains("best 5"));
    }
}
