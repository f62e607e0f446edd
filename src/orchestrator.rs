use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{
    cache::ResponseCache,
    context::ContextBuilder,
    fallback,
    model::{ModelProvider, ModelReply, ModelRequest},
    quota::{DenialReason, QuotaTracker},
    tools::{ToolExecutor, ToolName},
    types::{
        ChatTurn, CoachResponse, ContextSnapshot, FoodSuggestion, MessageCategory, ToolResult,
    },
};

/// Maximum chained tool-call/response cycles before forcing termination.
const MAX_TOOL_DEPTH: usize = 3;

const EXHAUSTED_TEXT: &str =
    "I've gathered what I can. Could you ask a more specific question so I can narrow it down?";
const ISSUE_TEXT: &str =
    "I ran into an issue putting that answer together. Please try again in a moment.";
const GENERIC_SUMMARY_LINE: &str = "I found some information, but couldn't fully process it.";

#[derive(Debug)]
enum OrchestrationError {
    QuotaDenied(DenialReason),
    Remote(anyhow::Error),
}

/// Running state of the sequential tool loop. An explicit accumulator instead
/// of recursion keeps the depth bound and the suggestion concatenation
/// testable without deep call stacks.
#[derive(Default)]
struct ToolLoopState {
    depth: usize,
    tools_used: Vec<String>,
    foods_suggested: Vec<FoodSuggestion>,
    executed: Vec<(String, ToolResult)>,
}

impl ToolLoopState {
    fn record(&mut self, name: &str, result: ToolResult) {
        self.tools_used.push(name.to_owned());
        if ToolName::parse(name) == Some(ToolName::SearchFoods) && result.success {
            // Concatenate, never replace: later tool calls must not erase
            // suggestions already surfaced.
            self.foods_suggested.extend(extract_suggestions(&result));
        }
        self.executed.push((name.to_owned(), result));
        self.depth += 1;
    }

    fn into_response(self, text: impl Into<String>) -> CoachResponse {
        CoachResponse {
            text: text.into(),
            tools_used: self.tools_used,
            foods_suggested: self.foods_suggested,
        }
    }
}

/// Top-level entry point of the coaching subsystem. Both public operations
/// are infallible: every internal failure degrades to progressively less
/// specific but always-valid content.
pub struct CoachOrchestrator {
    model: Arc<dyn ModelProvider>,
    tools: Arc<dyn ToolExecutor>,
    quota: QuotaTracker,
    cache: ResponseCache,
    context: ContextBuilder,
}

impl CoachOrchestrator {
    pub fn new(
        model: Arc<dyn ModelProvider>,
        tools: Arc<dyn ToolExecutor>,
        quota: QuotaTracker,
        cache: ResponseCache,
        context: ContextBuilder,
    ) -> Self {
        Self {
            model,
            tools,
            quota,
            cache,
            context,
        }
    }

    /// Open-ended chat. Always proceeds to the quota check; never cached.
    pub async fn chat(&self, message: &str) -> CoachResponse {
        let context = self.build_context().await;
        self.chat_with_context(&context, message).await
    }

    pub async fn chat_with_context(
        &self,
        context: &ContextSnapshot,
        message: &str,
    ) -> CoachResponse {
        match self.run_chat(context, message).await {
            Ok(response) => response,
            Err(OrchestrationError::QuotaDenied(reason)) => {
                debug!(reason = reason.as_str(), "chat denied by quota; using fallback");
                fallback::chat_fallback(context, message)
            }
            Err(OrchestrationError::Remote(error)) => {
                warn!(?error, "remote generation failed; using fallback");
                fallback::chat_fallback(context, message)
            }
        }
    }

    /// Category-based generation (greeting, insight, recommendation,
    /// summary). Served from the response cache when a fresh entry exists.
    pub async fn generate(&self, category: MessageCategory) -> CoachResponse {
        let context = self.build_context().await;
        self.generate_with_context(&context, category).await
    }

    pub async fn generate_with_context(
        &self,
        context: &ContextSnapshot,
        category: MessageCategory,
    ) -> CoachResponse {
        if let Some(cached) = self.cache.get(category.as_str()).await {
            debug!(category = category.as_str(), "serving cached message");
            return CoachResponse {
                text: cached,
                tools_used: Vec::new(),
                foods_suggested: Vec::new(),
            };
        }

        match self.run_generate(context, category).await {
            Ok(response) => {
                self.cache.put(category.as_str(), &response.text).await;
                response
            }
            Err(OrchestrationError::QuotaDenied(reason)) => {
                debug!(
                    reason = reason.as_str(),
                    category = category.as_str(),
                    "generation denied by quota; using fallback"
                );
                fallback::category_fallback(context, category)
            }
            Err(OrchestrationError::Remote(error)) => {
                warn!(
                    ?error,
                    category = category.as_str(),
                    "remote generation failed; using fallback"
                );
                fallback::category_fallback(context, category)
            }
        }
    }

    async fn run_chat(
        &self,
        context: &ContextSnapshot,
        message: &str,
    ) -> Result<CoachResponse, OrchestrationError> {
        let admission = self.quota.can_call().await;
        if !admission.allowed {
            let reason = admission.reason.unwrap_or(DenialReason::DailyLimit);
            return Err(OrchestrationError::QuotaDenied(reason));
        }

        let system_prompt = build_system_prompt(context);
        let mut conversation = vec![ChatTurn::user(message)];
        let mut state = ToolLoopState::default();

        loop {
            let reply = match self
                .model
                .complete(ModelRequest {
                    system_prompt: system_prompt.clone(),
                    conversation: conversation.clone(),
                    tools: self.tools.descriptors(),
                })
                .await
            {
                Ok(reply) => reply,
                Err(error) if state.depth > 0 => {
                    // A produced tool result is more specific than context
                    // alone; summarize it instead of dropping to the generic
                    // fallback.
                    warn!(?error, depth = state.depth, "remote call failed mid-loop; summarizing tool results");
                    return Ok(summarize_tool_results(state));
                }
                Err(error) => return Err(OrchestrationError::Remote(error)),
            };
            self.quota.record_call().await;

            match reply {
                ModelReply::Text(text) => return Ok(state.into_response(text)),
                ModelReply::Empty => {
                    debug!("model returned neither text nor tool call");
                    return Ok(state.into_response(ISSUE_TEXT));
                }
                ModelReply::ToolCall(call) => {
                    info!(tool_name = %call.name, depth = state.depth, "tool requested by model");
                    let started = std::time::Instant::now();
                    let result = self.tools.execute(&call.name, call.arguments.clone()).await;
                    debug!(
                        tool_name = %call.name,
                        success = result.success,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "tool execution finished"
                    );

                    let serialized = serde_json::to_string(&result).unwrap_or_default();
                    conversation.push(ChatTurn::assistant_tool_call(call.clone()));
                    conversation.push(ChatTurn::tool(&call.name, serialized));
                    state.record(&call.name, result);

                    if state.depth >= MAX_TOOL_DEPTH {
                        info!(depth = state.depth, "tool depth bound reached");
                        return Ok(state.into_response(EXHAUSTED_TEXT));
                    }
                }
            }
        }
    }

    async fn run_generate(
        &self,
        context: &ContextSnapshot,
        category: MessageCategory,
    ) -> Result<CoachResponse, OrchestrationError> {
        let admission = self.quota.can_call().await;
        if !admission.allowed {
            let reason = admission.reason.unwrap_or(DenialReason::DailyLimit);
            return Err(OrchestrationError::QuotaDenied(reason));
        }

        let reply = self
            .model
            .complete(ModelRequest {
                system_prompt: build_system_prompt(context),
                conversation: vec![ChatTurn::user(category_instruction(category))],
                tools: Vec::new(),
            })
            .await
            .map_err(OrchestrationError::Remote)?;
        self.quota.record_call().await;

        match reply {
            ModelReply::Text(text) if !text.trim().is_empty() => Ok(CoachResponse {
                text,
                tools_used: Vec::new(),
                foods_suggested: Vec::new(),
            }),
            _ => Err(OrchestrationError::Remote(anyhow::anyhow!(
                "model returned no usable {} message",
                category.as_str()
            ))),
        }
    }

    async fn build_context(&self) -> ContextSnapshot {
        match self.context.build().await {
            Ok(context) => context,
            Err(error) => {
                warn!(?error, "context build failed; using neutral snapshot");
                ContextSnapshot::default()
            }
        }
    }
}

fn build_system_prompt(context: &ContextSnapshot) -> String {
    let mut sections = vec![
        "You are NutriCoach, a pragmatic nutrition coach inside a food-tracking app.".to_owned(),
        "Ground every answer in the user's data below. Keep replies short and concrete.".to_owned(),
        format!(
            "It is {} for the user. Today: {:.0} kcal consumed, {:.0} kcal remaining, {:.0} g protein remaining, {:.0} g carbs remaining, {:.0} g fat remaining ({:.0}% of calorie goal).",
            context.time_of_day.as_str(),
            context.calories_consumed,
            context.calories_remaining,
            context.protein_remaining,
            context.carbs_remaining,
            context.fat_remaining,
            context.progress_percent
        ),
        format!(
            "Entries logged today: {}. Streak: {} days (best {}).",
            context.entries_logged_today, context.current_streak, context.longest_streak
        ),
    ];

    if !context.display_name.is_empty() {
        sections.push(format!("The user's name is {}.", context.display_name));
    }
    if let Some(sleep_hours) = context.sleep_hours {
        sections.push(format!("Last night's sleep: {sleep_hours:.1} h."));
    }
    if let Some(strain) = context.strain {
        sections.push(format!("Today's training strain: {strain:.1}."));
    }

    sections.join("\n")
}

fn category_instruction(category: MessageCategory) -> &'static str {
    match category {
        MessageCategory::Greeting => {
            "Write a one-sentence greeting for the user based on their current data."
        }
        MessageCategory::Insight => {
            "Write one short, specific insight about the user's nutrition today."
        }
        MessageCategory::Recommendation => {
            "Recommend one concrete next meal or snack that fits the user's remaining macros."
        }
        MessageCategory::Summary => "Summarize the user's day so far in two sentences.",
    }
}

/// Deterministic per-tool summaries used when the remote endpoint fails after
/// tool results were already produced.
fn summarize_tool_results(state: ToolLoopState) -> CoachResponse {
    let mut lines = Vec::new();
    for (name, result) in &state.executed {
        lines.push(summarize_one(name, result));
    }
    if lines.is_empty() {
        lines.push(GENERIC_SUMMARY_LINE.to_owned());
    }
    let text = lines.join(" ");
    state.into_response(text)
}

fn summarize_one(name: &str, result: &ToolResult) -> String {
    let Some(tool) = ToolName::parse(name) else {
        return GENERIC_SUMMARY_LINE.to_owned();
    };
    if !result.success {
        return GENERIC_SUMMARY_LINE.to_owned();
    }
    let data = result.data.as_ref();

    match tool {
        ToolName::GetNutritionStatus => {
            let consumed = field_f64(data, "calories_consumed");
            let remaining = field_f64(data, "calories_remaining");
            let protein = field_f64(data, "protein_remaining");
            format!(
                "So far you've logged {consumed:.0} kcal; {remaining:.0} kcal and {protein:.0} g protein remain today."
            )
        }
        ToolName::SearchFoods => {
            let results = data
                .and_then(|data| data.get("results"))
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            match results.first() {
                Some(top) => format!(
                    "I found {} option{}; the best protein-per-calorie pick is {} ({:.0} g protein per 100 g).",
                    results.len(),
                    if results.len() == 1 { "" } else { "s" },
                    top["name"].as_str().unwrap_or("an unnamed food"),
                    top["protein"].as_f64().unwrap_or(0.0)
                ),
                None => "I searched the catalog but nothing matched those filters.".to_owned(),
            }
        }
        ToolName::LogFood => format!(
            "Logged {} ({:.0} g, {:.0} kcal).",
            field_str(data, "logged"),
            field_f64(data, "grams"),
            field_f64(data, "calories")
        ),
        ToolName::GetFoodDetails => format!(
            "{}: {:.0} kcal, {:.0} g protein, {:.0} g carbs, {:.0} g fat per 100 g.",
            field_str(data, "name"),
            field_f64(data, "calories"),
            field_f64(data, "protein"),
            field_f64(data, "carbs"),
            field_f64(data, "fat")
        ),
        ToolName::LookupNutritionFacts => field_str(data, "fact"),
    }
}

fn extract_suggestions(result: &ToolResult) -> Vec<FoodSuggestion> {
    result
        .data
        .as_ref()
        .and_then(|data| data.get("results"))
        .cloned()
        .and_then(|results| serde_json::from_value(results).ok())
        .unwrap_or_default()
}

fn field_f64(data: Option<&Value>, key: &str) -> f64 {
    data.and_then(|data| data.get(key))
        .and_then(Value::as_f64)
        .unwrap_or(0.0)
}

fn field_str(data: Option<&Value>, key: &str) -> String {
    data.and_then(|data| data.get(key))
        .and_then(Value::as_str)
        .unwrap_or("that item")
        .to_owned()
}
