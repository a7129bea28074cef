//! The identification command: decode the upload, resolve AI settings,
//! run the vision + detail pipeline, collapse failures into one
//! user-facing message.

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::error::IdentifyError;
use crate::identifier::{self, AiSettings, FlowerInfo, ProviderClient};

/// Generic user-facing failure message; specifics go to the logs only.
pub const IDENTIFY_FAILED_MSG: &str = "识别失败，请稍后重试";

/// User-facing message when the upload itself is unusable.
pub const INVALID_IMAGE_MSG: &str = "无法读取图片，请更换图片重试";

/// Request payload from the frontend.
#[derive(Debug, Deserialize)]
pub struct IdentifyRequest {
    /// Base64 image data; a data-URL prefix is tolerated and stripped.
    pub image_base64: String,
}

/// Identify the flower in an uploaded photo.
#[tauri::command]
pub async fn identify_flower(
    app: tauri::AppHandle,
    request: IdentifyRequest,
) -> Result<FlowerInfo, String> {
    info!("Starting flower identification");

    let payload = strip_data_url_prefix(&request.image_base64);
    let image_bytes = STANDARD.decode(payload).map_err(|e| {
        warn!("Invalid base64 image data: {}", e);
        INVALID_IMAGE_MSG.to_string()
    })?;

    let (settings, language) = resolve_ai_settings(&app)?;
    let client = ProviderClient::new(settings).map_err(|e| {
        error!("Failed to build provider client: {}", e);
        IDENTIFY_FAILED_MSG.to_string()
    })?;

    match identifier::identify(&client, &image_bytes, &language).await {
        Ok(info) => {
            info!(
                "Identification complete: '{}' ({:.3})",
                info.name, info.confidence
            );
            Ok(info)
        }
        Err(IdentifyError::InvalidImage(msg)) => {
            warn!("Rejected image: {}", msg);
            Err(INVALID_IMAGE_MSG.to_string())
        }
        Err(e) => {
            error!("Identification failed: {}", e);
            Err(IDENTIFY_FAILED_MSG.to_string())
        }
    }
}

/// Drop a `data:<mime>;base64,` prefix if the frontend sent one.
fn strip_data_url_prefix(payload: &str) -> &str {
    if payload.starts_with("data:") {
        match payload.find(',') {
            Some(idx) => &payload[idx + 1..],
            None => payload,
        }
    } else {
        payload
    }
}

/// Resolve provider, models, language, and API key from the preference
/// store and the keychain. Returns `(settings, language)`.
fn resolve_ai_settings(app: &tauri::AppHandle) -> Result<(AiSettings, String), String> {
    let provider = super::config::preference(app, "ai_provider")
        .unwrap_or_else(|| "zhipu".to_string());

    let (default_vision, default_text) = default_models(&provider);
    let vision_model = super::config::preference(app, "ai_vision_model")
        .unwrap_or_else(|| default_vision.to_string());
    let text_model = super::config::preference(app, "ai_text_model")
        .unwrap_or_else(|| default_text.to_string());

    let language = super::config::preference(app, "display_language")
        .unwrap_or_else(|| "zh".to_string());

    let api_key = super::keychain::lookup_api_key(&provider)?;

    Ok((
        AiSettings {
            provider,
            vision_model,
            text_model,
            api_key,
        },
        language,
    ))
}

/// Default (vision, text) model pair per provider.
pub(crate) fn default_models(provider: &str) -> (&'static str, &'static str) {
    match provider {
        "zhipu" => ("glm-4v", "glm-4"),
        "claude" => ("claude-sonnet-4-20250514", "claude-sonnet-4-20250514"),
        "openai" => ("gpt-4o", "gpt-4o"),
        "openrouter" => ("anthropic/claude-sonnet-4", "anthropic/claude-sonnet-4"),
        _ => ("glm-4v", "glm-4"),
    }
}
