//! Health check: configured provider/models, which API keys are present,
//! and whether the preference store is reachable.

use serde::Serialize;
use tauri::AppHandle;
use tauri_plugin_store::StoreExt;
use tracing::info;

use super::identify::default_models;
use super::keychain::api_key_set;

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub active_provider: String,
    pub vision_model: String,
    pub text_model: String,
    pub display_language: String,
    pub preferences_accessible: bool,
    pub zhipu_api_key_set: bool,
    pub claude_api_key_set: bool,
    pub openai_api_key_set: bool,
    pub openrouter_api_key_set: bool,
    /// True when the active provider has a key, i.e. identification can run.
    pub ready: bool,
}

#[tauri::command]
pub fn run_health_check(app: AppHandle) -> Result<HealthReport, String> {
    info!("Running health check");

    let preferences_accessible = app.store(super::config::PREFERENCES_FILE).is_ok();

    let active_provider = super::config::preference(&app, "ai_provider")
        .unwrap_or_else(|| "zhipu".to_string());
    let (default_vision, default_text) = default_models(&active_provider);
    let vision_model = super::config::preference(&app, "ai_vision_model")
        .unwrap_or_else(|| default_vision.to_string());
    let text_model = super::config::preference(&app, "ai_text_model")
        .unwrap_or_else(|| default_text.to_string());
    let display_language = super::config::preference(&app, "display_language")
        .unwrap_or_else(|| "zh".to_string());

    let zhipu = api_key_set("zhipu");
    let claude = api_key_set("claude");
    let openai = api_key_set("openai");
    let openrouter = api_key_set("openrouter");
    let ready = api_key_set(&active_provider);

    info!(
        "Health: provider={}, keys zhipu={} claude={} openai={} openrouter={}, ready={}",
        active_provider, zhipu, claude, openai, openrouter, ready
    );

    Ok(HealthReport {
        active_provider,
        vision_model,
        text_model,
        display_language,
        preferences_accessible,
        zhipu_api_key_set: zhipu,
        claude_api_key_set: claude,
        openai_api_key_set: openai,
        openrouter_api_key_set: openrouter,
        ready,
    })
}
