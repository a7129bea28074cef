//! Chat-completion transport for the supported AI providers.
//!
//! Zhipu GLM is the default (the original model family for this app);
//! Claude, OpenAI, and OpenRouter are selectable alternatives. All calls
//! are one-shot with a 60 s timeout and no retries.

use std::time::Duration;

use tracing::error;

use super::image_prep::image_media_type;
use super::orchestrate::FlowerApi;
use crate::error::IdentifyError;

const ANTHROPIC_URL: &str = "https://api.anthropic.com/v1/messages";
const OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";
const ZHIPU_URL: &str = "https://open.bigmodel.cn/api/paas/v4/chat/completions";
const OPENROUTER_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

const REQUEST_TIMEOUT_SECS: u64 = 60;
const MAX_TOKENS: u32 = 1024;

/// Resolved AI configuration, built by the command layer from the
/// preference store and the keychain, then injected here.
#[derive(Debug, Clone)]
pub struct AiSettings {
    pub provider: String,
    pub vision_model: String,
    pub text_model: String,
    pub api_key: String,
}

/// Reqwest-backed implementation of [`FlowerApi`].
pub struct ProviderClient {
    settings: AiSettings,
    client: reqwest::Client,
}

impl ProviderClient {
    pub fn new(settings: AiSettings) -> Result<Self, IdentifyError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| IdentifyError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { settings, client })
    }

    pub fn provider(&self) -> &str {
        &self.settings.provider
    }

    async fn claude(
        &self,
        model: &str,
        system: &str,
        content: serde_json::Value,
    ) -> Result<String, IdentifyError> {
        let body = serde_json::json!({
            "model": model,
            "max_tokens": MAX_TOKENS,
            "system": system,
            "messages": [
                {"role": "user", "content": content}
            ]
        });

        let response = self
            .client
            .post(ANTHROPIC_URL)
            .header("x-api-key", &self.settings.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error("claude", e))?;

        let body_text = handle_api_response(response, "claude").await?;
        message_text(&body_text, &["content", "0", "text"], "claude")
    }

    async fn openai_style(
        &self,
        url: &str,
        provider: &str,
        model: &str,
        system: &str,
        content: serde_json::Value,
    ) -> Result<String, IdentifyError> {
        let body = serde_json::json!({
            "model": model,
            "max_tokens": MAX_TOKENS,
            "temperature": 0.7,
            "top_p": 0.9,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": content}
            ]
        });

        let response = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", self.settings.api_key))
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(provider, e))?;

        let body_text = handle_api_response(response, provider).await?;
        message_text(&body_text, &["choices", "0", "message", "content"], provider)
    }

    fn vision_content(&self, prompt: &str, image_base64: &str) -> serde_json::Value {
        match self.settings.provider.as_str() {
            "claude" => serde_json::json!([
                {
                    "type": "image",
                    "source": {
                        "type": "base64",
                        "media_type": image_media_type(),
                        "data": image_base64
                    }
                },
                {"type": "text", "text": prompt}
            ]),
            // GLM-4V accepts the bare base64 payload as the image URL.
            "zhipu" => serde_json::json!([
                {"type": "text", "text": prompt},
                {"type": "image_url", "image_url": {"url": image_base64}}
            ]),
            // OpenAI and OpenRouter expect a data URL.
            _ => serde_json::json!([
                {"type": "text", "text": prompt},
                {
                    "type": "image_url",
                    "image_url": {
                        "url": format!("data:{};base64,{}", image_media_type(), image_base64)
                    }
                }
            ]),
        }
    }
}

impl FlowerApi for ProviderClient {
    async fn vision(
        &self,
        system: &str,
        prompt: &str,
        image_base64: &str,
    ) -> Result<String, IdentifyError> {
        let content = self.vision_content(prompt, image_base64);
        let model = self.settings.vision_model.clone();
        match self.settings.provider.as_str() {
            "claude" => self.claude(&model, system, content).await,
            "openai" => {
                self.openai_style(OPENAI_URL, "openai", &model, system, content)
                    .await
            }
            "zhipu" => {
                self.openai_style(ZHIPU_URL, "zhipu", &model, system, content)
                    .await
            }
            "openrouter" => {
                self.openai_style(OPENROUTER_URL, "openrouter", &model, system, content)
                    .await
            }
            other => Err(IdentifyError::UnsupportedProvider(other.to_string())),
        }
    }

    async fn chat(&self, system: &str, prompt: &str) -> Result<String, IdentifyError> {
        let content = serde_json::Value::String(prompt.to_string());
        let model = self.settings.text_model.clone();
        match self.settings.provider.as_str() {
            "claude" => self.claude(&model, system, content).await,
            "openai" => {
                self.openai_style(OPENAI_URL, "openai", &model, system, content)
                    .await
            }
            "zhipu" => {
                self.openai_style(ZHIPU_URL, "zhipu", &model, system, content)
                    .await
            }
            "openrouter" => {
                self.openai_style(OPENROUTER_URL, "openrouter", &model, system, content)
                    .await
            }
            other => Err(IdentifyError::UnsupportedProvider(other.to_string())),
        }
    }
}

fn transport_error(provider: &str, e: reqwest::Error) -> IdentifyError {
    let msg = if e.is_timeout() {
        format!("timeout after {REQUEST_TIMEOUT_SECS}s for provider '{provider}'")
    } else {
        format!("request failed for {provider}: {e}")
    };
    error!("{msg}");
    IdentifyError::Transport(msg)
}

/// Check status and extract the response body text.
async fn handle_api_response(
    response: reqwest::Response,
    provider: &str,
) -> Result<String, IdentifyError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<failed to read body>".to_string());
        let truncated = truncate_chars(&body, 1024);
        error!("API error {} from {}: {}", status, provider, truncated);
        return Err(IdentifyError::Api {
            status: status.as_u16(),
            body: truncated,
        });
    }
    response
        .text()
        .await
        .map_err(|e| IdentifyError::Transport(format!("failed to read body from {provider}: {e}")))
}

/// Walk the provider's response wrapper down to the message text.
fn message_text(body: &str, path: &[&str], provider: &str) -> Result<String, IdentifyError> {
    let json: serde_json::Value = serde_json::from_str(body).map_err(|e| {
        IdentifyError::Parse(format!("bad response wrapper from {provider}: {e}"))
    })?;

    let mut node = &json;
    for key in path {
        node = match key.parse::<usize>() {
            Ok(idx) => &node[idx],
            Err(_) => &node[*key],
        };
    }
    node.as_str()
        .map(|s| s.to_string())
        .ok_or_else(|| IdentifyError::Parse(format!("no message content from {provider}")))
}

/// Character-safe truncation for error bodies that may contain multibyte
/// text.
fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max).collect();
    out.push_str("...");
    out
}
