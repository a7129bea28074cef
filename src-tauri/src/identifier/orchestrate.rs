//! Identification orchestrator: vision step, normalization, detail step,
//! merge. The two network calls are strictly sequential because the detail
//! request needs the resolved name.

use tracing::info;

use super::details::fetch_details;
use super::image_prep::prepare_image;
use super::normalize::{normalize, NameConfidence};
use super::prompts;
use super::types::{FlowerDetails, FlowerInfo};
use crate::error::IdentifyError;

/// Transport seam for the two AI calls. The production implementation is
/// [`super::providers::ProviderClient`]; tests inject doubles.
pub trait FlowerApi {
    /// Send the vision prompt with a base64 JPEG; returns the raw message
    /// content.
    fn vision(
        &self,
        system: &str,
        prompt: &str,
        image_base64: &str,
    ) -> impl std::future::Future<Output = Result<String, IdentifyError>> + Send;

    /// Send a text-only prompt; returns the raw message content.
    fn chat(
        &self,
        system: &str,
        prompt: &str,
    ) -> impl std::future::Future<Output = Result<String, IdentifyError>> + Send;
}

/// Run the full identification pipeline for one image.
///
/// Either both steps succeed or the caller sees a single failure; no
/// partial result is ever returned.
pub async fn identify<A: FlowerApi>(
    api: &A,
    image_bytes: &[u8],
    language: &str,
) -> Result<FlowerInfo, IdentifyError> {
    let image_base64 = prepare_image(image_bytes)?;

    let system = prompts::botanist_system_prompt(language);
    let raw = api
        .vision(system, &prompts::vision_prompt(language), &image_base64)
        .await?;
    let NameConfidence { name, confidence } = normalize(&raw);
    info!("Vision step resolved '{}' ({:.3})", name, confidence);

    let details = fetch_details(api, &name, language).await?;

    Ok(merge(name, confidence, details, language))
}

/// Merge the vision result with the detail record. Detail fields carry
/// over verbatim; only an empty description gets the template fallback.
pub fn merge(
    name: String,
    confidence: f64,
    details: FlowerDetails,
    language: &str,
) -> FlowerInfo {
    let description = if details.description.trim().is_empty() {
        default_description(&name, language)
    } else {
        details.description
    };

    FlowerInfo {
        scientific_name: details.scientific_name,
        confidence,
        description,
        poetry: details.poetry,
        botany: details.botany,
        culture: details.culture,
        care: details.care,
        name,
    }
}

/// Fallback description when the detail step returned none.
pub fn default_description(name: &str, language: &str) -> String {
    if language == "en" {
        format!("{name}, a beautiful flowering plant.")
    } else {
        format!("{name}，一种美丽的植物。")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifier::types::{CareFields, CareGuide};

    #[test]
    fn test_merge_keeps_detail_fields_verbatim() {
        let details = FlowerDetails {
            scientific_name: "Tulipa gesneriana".to_string(),
            description: "高雅的球根花卉".to_string(),
            poetry: "唯有春风最相惜，殷勤更向手中吹".to_string(),
            botany: "百合科郁金香属".to_string(),
            culture: "象征博爱与体贴".to_string(),
            care: CareGuide::Structured(CareFields {
                water: "保持微润".to_string(),
                sunlight: "充足光照".to_string(),
                soil: "排水良好".to_string(),
                temperature: "凉爽为宜".to_string(),
            }),
        };

        let info = merge("郁金香".to_string(), 0.95, details.clone(), "zh");
        assert_eq!(info.name, "郁金香");
        assert_eq!(info.confidence, 0.95);
        assert_eq!(info.scientific_name, details.scientific_name);
        assert_eq!(info.description, details.description);
        assert_eq!(info.poetry, details.poetry);
        assert_eq!(info.botany, details.botany);
        assert_eq!(info.culture, details.culture);
        assert_eq!(info.care, details.care);
    }

    #[test]
    fn test_merge_empty_description_gets_template() {
        let info = merge("梅花".to_string(), 0.9, FlowerDetails::default(), "zh");
        assert_eq!(info.description, "梅花，一种美丽的植物。");

        let info = merge("Plum".to_string(), 0.9, FlowerDetails::default(), "en");
        assert_eq!(info.description, "Plum, a beautiful flowering plant.");
    }

    #[test]
    fn test_merge_whitespace_description_gets_template() {
        let details = FlowerDetails {
            description: "  \n ".to_string(),
            ..FlowerDetails::default()
        };
        let info = merge("兰花".to_string(), 0.8, details, "zh");
        assert_eq!(info.description, "兰花，一种美丽的植物。");
    }
}
