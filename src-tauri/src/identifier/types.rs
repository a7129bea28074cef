//! Result types for flower identification.
//!
//! `FlowerInfo` is the record the frontend renders; `FlowerDetails` is the
//! intermediate shape parsed from the detail step before the merge.

use serde::{Deserialize, Serialize};

/// Structured care instructions (current shape).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CareFields {
    #[serde(default)]
    pub water: String,
    #[serde(default)]
    pub sunlight: String,
    #[serde(default)]
    pub soil: String,
    #[serde(default)]
    pub temperature: String,
}

/// Care instructions, either as the current structured record or as the
/// legacy single delimited string older results used. Untagged so a JSON
/// object deserializes as `Structured` and a JSON string as `Legacy`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CareGuide {
    Structured(CareFields),
    Legacy(String),
}

impl Default for CareGuide {
    fn default() -> Self {
        CareGuide::Structured(CareFields::default())
    }
}

/// Canonical identification result, one per submitted image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowerInfo {
    pub name: String,
    pub scientific_name: String,
    /// Normalized into [0.0, 1.0] before this struct is built.
    pub confidence: f64,
    pub description: String,
    pub poetry: String,
    pub botany: String,
    pub culture: String,
    pub care: CareGuide,
}

/// Descriptive fields returned by the detail step.
///
/// Every field defaults to empty: the model is asked for all of them but
/// missing ones surface as empty strings and get display-time fallbacks.
/// `poem` is accepted as an alias for `poetry` (older prompt wording).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FlowerDetails {
    #[serde(alias = "scientificName")]
    pub scientific_name: String,
    pub description: String,
    #[serde(alias = "poem")]
    pub poetry: String,
    pub botany: String,
    pub culture: String,
    pub care: CareGuide,
}
