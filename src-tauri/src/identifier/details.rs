//! Detail step: fetch the encyclopedia record for an identified flower.

use tracing::info;

use super::extract::{extract_json_object, strip_markdown_fences};
use super::orchestrate::FlowerApi;
use super::prompts;
use super::types::FlowerDetails;
use crate::error::IdentifyError;

/// Request the descriptive fields for `flower_name` and parse them.
///
/// The model is instructed to answer with a single JSON object; any
/// transport or parse failure surfaces as `DetailFetch` so the caller can
/// tell the two pipeline steps apart in the logs. Never retried.
pub async fn fetch_details<A: FlowerApi>(
    api: &A,
    flower_name: &str,
    language: &str,
) -> Result<FlowerDetails, IdentifyError> {
    info!("Fetching details for '{}'", flower_name);
    let system = prompts::botanist_system_prompt(language);
    let prompt = prompts::details_prompt(flower_name, language);
    let raw = api
        .chat(system, &prompt)
        .await
        .map_err(|e| IdentifyError::DetailFetch(e.to_string()))?;
    parse_details(&raw)
}

/// Parse a detail response: strip fences, take the first balanced `{...}`
/// span, deserialize. Missing fields default to empty.
pub fn parse_details(raw: &str) -> Result<FlowerDetails, IdentifyError> {
    let cleaned = strip_markdown_fences(raw);
    let span = extract_json_object(cleaned).ok_or_else(|| {
        IdentifyError::DetailFetch("no JSON object in detail response".to_string())
    })?;
    serde_json::from_str(span)
        .map_err(|e| IdentifyError::DetailFetch(format!("detail JSON does not match schema: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifier::types::CareGuide;

    const FULL_RESPONSE: &str = r#"{
        "scientificName": "Rosa rugosa",
        "description": "芬芳馥郁的蔷薇科名花",
        "poetry": "唯有牡丹真国色，花开时节动京城",
        "botany": "蔷薇科蔷薇属，落叶灌木",
        "culture": "象征爱情与美好",
        "care": {
            "water": "见干见湿",
            "sunlight": "充足光照",
            "soil": "疏松肥沃",
            "temperature": "15-25度为宜"
        }
    }"#;

    #[test]
    fn test_parse_full_response() {
        let details = parse_details(FULL_RESPONSE).unwrap();
        assert_eq!(details.scientific_name, "Rosa rugosa");
        assert_eq!(details.description, "芬芳馥郁的蔷薇科名花");
        match details.care {
            CareGuide::Structured(fields) => assert_eq!(fields.water, "见干见湿"),
            CareGuide::Legacy(_) => panic!("care object must parse as Structured"),
        }
    }

    #[test]
    fn test_parse_fenced_response() {
        let fenced = format!("```json\n{FULL_RESPONSE}\n```");
        let details = parse_details(&fenced).unwrap();
        assert_eq!(details.scientific_name, "Rosa rugosa");
    }

    #[test]
    fn test_parse_response_with_prose_around_object() {
        let noisy = format!("好的，以下是百科信息：\n{FULL_RESPONSE}\n希望对你有帮助");
        let details = parse_details(&noisy).unwrap();
        assert_eq!(details.culture, "象征爱情与美好");
    }

    #[test]
    fn test_parse_legacy_care_string() {
        let raw = r#"{"description":"d","care":"水分：适量浇水\n阳光：充足光照"}"#;
        let details = parse_details(raw).unwrap();
        assert_eq!(
            details.care,
            CareGuide::Legacy("水分：适量浇水\n阳光：充足光照".to_string())
        );
    }

    #[test]
    fn test_parse_missing_fields_default_empty() {
        let details = parse_details(r#"{"botany":"蔷薇科"}"#).unwrap();
        assert_eq!(details.botany, "蔷薇科");
        assert!(details.poetry.is_empty());
        assert!(details.scientific_name.is_empty());
    }

    #[test]
    fn test_parse_no_json_object_is_detail_fetch_error() {
        let err = parse_details("抱歉，我无法提供该信息。").unwrap_err();
        assert!(matches!(err, IdentifyError::DetailFetch(_)));
    }

    #[test]
    fn test_parse_empty_response() {
        assert!(matches!(
            parse_details("").unwrap_err(),
            IdentifyError::DetailFetch(_)
        ));
    }
}
