use thiserror::Error;

/// Internal failure taxonomy for the identification pipeline.
///
/// The command layer collapses everything except `InvalidImage` into one
/// generic user-facing message; the specific variant only reaches the logs.
#[derive(Debug, Error)]
pub enum IdentifyError {
    #[error("invalid image: {0}")]
    InvalidImage(String),

    #[error("AI API request failed: {0}")]
    Transport(String),

    #[error("AI API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("could not parse model output: {0}")]
    Parse(String),

    #[error("detail fetch failed: {0}")]
    DetailFetch(String),

    #[error("unsupported AI provider: '{0}'. Supported: zhipu, claude, openai, openrouter")]
    UnsupportedProvider(String),
}

impl From<IdentifyError> for String {
    fn from(err: IdentifyError) -> Self {
        err.to_string()
    }
}
