use std::sync::Arc;

use nutricoach::{
    cache::ResponseCache,
    catalog::InMemoryFoodCatalog,
    config::AppConfig,
    context::ContextBuilder,
    http::{self, AppState},
    model::{MockModelProvider, ModelProvider, OpenRouterProvider},
    orchestrator::CoachOrchestrator,
    quota::QuotaTracker,
    state::{InMemoryUserState, UserStateView},
    store::InMemoryKeyValueStore,
    tools::{
        FoodDetailsTool, FoodSearchTool, LogFoodTool, NutritionFactsTool, NutritionStatusTool,
        ToolRegistry,
    },
};
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;

    let store = Arc::new(InMemoryKeyValueStore::default());
    let state = Arc::new(build_user_state(&config));
    let catalog = Arc::new(InMemoryFoodCatalog::with_sample_foods());
    let cache = ResponseCache::new(store.clone());

    let tools = Arc::new(ToolRegistry {
        status: NutritionStatusTool::new(state.clone()),
        search: FoodSearchTool::new(catalog.clone()),
        log: LogFoodTool::new(catalog.clone(), state.clone(), cache.clone()),
        details: FoodDetailsTool::new(catalog),
        knowledge: NutritionFactsTool::default(),
    });

    let orchestrator = Arc::new(CoachOrchestrator::new(
        build_model_provider(&config)?,
        tools,
        QuotaTracker::new(store.clone()),
        cache,
        ContextBuilder::new(state, store),
    ));

    let app = http::router(AppState { orchestrator });
    let listener = TcpListener::bind(config.http_bind).await?;
    info!("NutriCoach API listening on {}", config.http_bind);

    axum::serve(listener, app).await?;
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .compact()
        .init();
}

fn build_model_provider(config: &AppConfig) -> anyhow::Result<Arc<dyn ModelProvider>> {
    if let Some(api_key) = config.openrouter_api_key.clone() {
        let provider = OpenRouterProvider::new(api_key, config.openrouter_model.clone())?
            .with_headers(
                config.openrouter_referer.clone(),
                config.openrouter_title.clone(),
            );
        Ok(Arc::new(provider))
    } else {
        warn!("OPENROUTER_API_KEY not set; using mock model provider");
        Ok(Arc::new(MockModelProvider))
    }
}

fn build_user_state(config: &AppConfig) -> InMemoryUserState {
    use nutricoach::state::MacroTotals;

    InMemoryUserState::new(UserStateView {
        display_name: config.display_name.clone().unwrap_or_default(),
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
