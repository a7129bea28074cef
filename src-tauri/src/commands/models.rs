//! Model listing for the settings page.
//!
//! Claude, OpenAI, and OpenRouter expose a models endpoint; Zhipu does not
//! have a public one, so a curated list is returned for it.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::keychain::lookup_api_key;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct ModelsResponse {
    data: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
}

/// Models Zhipu documents for this app's two pipeline steps.
fn zhipu_models() -> Vec<ModelInfo> {
    [
        ("glm-4v", "GLM-4V (vision)"),
        ("glm-4v-plus", "GLM-4V Plus (vision)"),
        ("glm-4", "GLM-4"),
        ("glm-4-plus", "GLM-4 Plus"),
        ("glm-4-flash", "GLM-4 Flash"),
    ]
    .into_iter()
    .map(|(id, name)| ModelInfo {
        id: id.to_string(),
        name: name.to_string(),
    })
    .collect()
}

#[tauri::command]
pub async fn list_models(provider: String) -> Result<Vec<ModelInfo>, String> {
    info!("Fetching models for provider: {}", provider);

    if provider == "zhipu" {
        return Ok(zhipu_models());
    }

    let api_key = lookup_api_key(&provider)?;
    let client = reqwest::Client::new();

    let request = match provider.as_str() {
        "claude" => client
            .get("https://api.anthropic.com/v1/models")
            .header("x-api-key", &api_key)
            .header("anthropic-version", "2023-06-01"),
        "openai" => client
            .get("https://api.openai.com/v1/models")
            .header("Authorization", format!("Bearer {api_key}")),
        "openrouter" => client
            .get("https://openrouter.ai/api/v1/models")
            .header("Authorization", format!("Bearer {api_key}")),
        _ => return Err(format!("Unknown provider: {provider}")),
    };

    let resp = request
        .send()
        .await
        .map_err(|e| format!("Request failed: {e}"))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        warn!("Models API error for {} ({}): {}", provider, status, body);
        return Err(format!("API error ({status})"));
    }

    let models: ModelsResponse = resp
        .json()
        .await
        .map_err(|e| format!("Failed to parse response: {e}"))?;

    let mut result: Vec<ModelInfo> = models
        .data
        .into_iter()
        .map(|m| {
            let name = m.display_name.or(m.name).unwrap_or_else(|| m.id.clone());
            ModelInfo { id: m.id, name }
        })
        .collect();

    result.sort_by(|a, b| a.id.cmp(&b.id));
    info!("Found {} models for {}", result.len(), provider);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zhipu_models_include_both_steps() {
        let models = zhipu_models();
        assert!(models.iter().any(|m| m.id == "glm-4v"));
        assert!(models.iter().any(|m| m.id == "glm-4"));
    }

    #[tokio::test]
    async fn test_list_models_unknown_provider() {
        let err = list_models("gemini".to_string()).await.unwrap_err();
        assert!(err.contains("Unknown AI provider") || err.contains("Unknown provider"));
    }
}
