//! Normalization of raw vision output into `{name, confidence}`.
//!
//! The vision model is asked for a JSON object but the response must be
//! treated as untrusted: it may be free text, carry a label prefix, report
//! confidence as a percentage, or omit fields entirely. Structured
//! extraction is attempted first, then an ordered list of text fallbacks.

use std::sync::OnceLock;

use regex::Regex;

use super::extract::{extract_json_object, strip_markdown_fences};

/// Display name used whenever no usable name can be extracted.
pub const NAME_PLACEHOLDER: &str = "未知花卉";

/// Confidence used when neither a JSON field nor a text pattern yields one.
pub const DEFAULT_CONFIDENCE: f64 = 0.88;

/// The suspicious default several models emit regardless of the image.
const CONFIDENCE_PLACEHOLDER: f64 = 0.95;

/// Band the de-biased placeholder is clamped into.
const DEBIAS_BAND: (f64, f64) = (0.82, 0.99);

/// Label prefixes the models prepend in free-text answers.
const LABEL_PREFIXES: [&str; 3] = ["识别结果", "中文名称", "花名"];

#[derive(Debug, Clone, PartialEq)]
pub struct NameConfidence {
    pub name: String,
    pub confidence: f64,
}

fn percent_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d{1,3}(?:\.\d+)?)\s*%").expect("percent regex"))
}

fn decimal_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"0\.\d{1,4}").expect("decimal regex"))
}

/// Coerce raw vision output into a non-empty name and a confidence in
/// [0.0, 1.0].
pub fn normalize(raw: &str) -> NameConfidence {
    let cleaned = strip_markdown_fences(raw);
    if cleaned.is_empty() {
        return NameConfidence {
            name: NAME_PLACEHOLDER.to_string(),
            confidence: DEFAULT_CONFIDENCE,
        };
    }

    if let Some(span) = extract_json_object(cleaned) {
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(span) {
            let name = value
                .get("name")
                .and_then(|v| v.as_str())
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from);
            let confidence = value.get("confidence").and_then(confidence_from_value);
            if name.is_some() || confidence.is_some() {
                let name = name.unwrap_or_else(|| NAME_PLACEHOLDER.to_string());
                let confidence = coerce_confidence(&name, confidence);
                return NameConfidence { name, confidence };
            }
        }
    }

    fallback_parse(cleaned)
}

/// Percentage correction, placeholder de-biasing, final clamp.
fn coerce_confidence(name: &str, confidence: Option<f64>) -> f64 {
    let mut c = confidence.unwrap_or(DEFAULT_CONFIDENCE);
    if c > 1.0 {
        c /= 100.0;
    }
    if (c - CONFIDENCE_PLACEHOLDER).abs() < 1e-9 {
        c = debias_confidence(name, c);
    }
    c.clamp(0.0, 1.0)
}

/// Read a confidence out of a JSON number or a numeric string. Strings may
/// carry a trailing `%`; the percentage correction happens later.
fn confidence_from_value(value: &serde_json::Value) -> Option<f64> {
    if let Some(n) = value.as_f64() {
        return Some(n);
    }
    let s = value.as_str()?.trim().trim_end_matches('%');
    s.parse().ok()
}

/// Deterministic de-biasing for the placeholder confidence.
///
/// Policy: an FNV-1a hash of the name maps to an offset in
/// [-0.080, +0.040]; the adjusted value is clamped to [0.82, 0.99]. Same
/// name, same output, so results are stable and testable.
pub fn debias_confidence(name: &str, confidence: f64) -> f64 {
    let offset = (fnv1a(name) % 121) as f64 / 1000.0 - 0.08;
    (confidence + offset).clamp(DEBIAS_BAND.0, DEBIAS_BAND.1)
}

fn fnv1a(text: &str) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for b in text.bytes() {
        hash ^= u64::from(b);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

/// Text fallback when no valid JSON object is present: pattern-scan for a
/// confidence, derive the name from the first non-empty line.
fn fallback_parse(text: &str) -> NameConfidence {
    let confidence = percent_re()
        .captures(text)
        .and_then(|caps| caps[1].parse::<f64>().ok())
        .map(|p| p / 100.0)
        .or_else(|| {
            decimal_re()
                .find(text)
                .and_then(|m| m.as_str().parse::<f64>().ok())
        })
        .unwrap_or(DEFAULT_CONFIDENCE);

    let first_line = text
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("");
    let name = clean_name(first_line);
    let name = if name.is_empty() {
        NAME_PLACEHOLDER.to_string()
    } else {
        name
    };

    NameConfidence {
        name,
        confidence: confidence.clamp(0.0, 1.0),
    }
}

/// Strip known label prefixes, any embedded confidence pattern, and
/// surrounding punctuation from a free-text name line.
fn clean_name(line: &str) -> String {
    let mut rest = line.trim();
    for prefix in LABEL_PREFIXES {
        if let Some(stripped) = rest.strip_prefix(prefix) {
            rest = stripped.trim_start_matches(['：', ':']).trim();
            break;
        }
    }

    let mut name = rest.to_string();
    let pattern_range = percent_re()
        .find(&name)
        .map(|m| m.range())
        .or_else(|| decimal_re().find(&name).map(|m| m.range()));
    if let Some(range) = pattern_range {
        name.replace_range(range, "");
    }

    name.trim_matches(|c: char| c.is_whitespace() || is_name_punct(c))
        .to_string()
}

fn is_name_punct(c: char) -> bool {
    matches!(
        c,
        '：' | ':' | '，' | ',' | '。' | '.' | '；' | ';' | '！' | '!' | '？' | '?'
            | '"' | '\'' | '“' | '”' | '‘' | '’' | '(' | ')' | '（' | '）' | '【' | '】'
            | '[' | ']'
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_name_and_percentage_confidence() {
        let result = normalize(r#"{"name":"玫瑰","confidence":150}"#);
        assert_eq!(result.name, "玫瑰");
        // 150 -> /100 -> 1.5 -> clamped to 1.0
        assert_eq!(result.confidence, 1.0);
    }

    #[test]
    fn test_json_in_range_confidence_kept() {
        let result = normalize(r#"{"name":"兰花","confidence":0.87}"#);
        assert_eq!(result.name, "兰花");
        assert!((result.confidence - 0.87).abs() < 1e-9);
    }

    #[test]
    fn test_json_confidence_as_numeric_string() {
        let result = normalize(r#"{"name":"菊花","confidence":"0.76"}"#);
        assert!((result.confidence - 0.76).abs() < 1e-9);
    }

    #[test]
    fn test_json_confidence_as_percent_string() {
        let result = normalize(r#"{"name":"菊花","confidence":"92%"}"#);
        assert!((result.confidence - 0.92).abs() < 1e-9);
    }

    #[test]
    fn test_json_wrapped_in_markdown_fence() {
        let result = normalize("```json\n{\"name\":\"牡丹\",\"confidence\":0.9}\n```");
        assert_eq!(result.name, "牡丹");
        assert!((result.confidence - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_json_missing_confidence_uses_default() {
        let result = normalize(r#"{"name":"月季"}"#);
        assert_eq!(result.name, "月季");
        assert!((result.confidence - DEFAULT_CONFIDENCE).abs() < 1e-9);
    }

    #[test]
    fn test_json_missing_name_uses_placeholder() {
        let result = normalize(r#"{"confidence":0.7}"#);
        assert_eq!(result.name, NAME_PLACEHOLDER);
        assert!((result.confidence - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_placeholder_confidence_is_debiased() {
        let result = normalize(r#"{"name":"梅花","confidence":0.95}"#);
        assert_eq!(result.name, "梅花");
        assert!(result.confidence >= 0.82 && result.confidence <= 0.99);
        // Deterministic: a second run lands on the same value.
        let again = normalize(r#"{"name":"梅花","confidence":0.95}"#);
        assert_eq!(result.confidence, again.confidence);
        assert_eq!(result.confidence, debias_confidence("梅花", 0.95));
    }

    #[test]
    fn test_placeholder_as_whole_percent_is_debiased() {
        // 95 corrects to 0.95 first, then hits the placeholder check.
        let result = normalize(r#"{"name":"桂花","confidence":95}"#);
        assert!(result.confidence >= 0.82 && result.confidence <= 0.99);
        assert_eq!(result.confidence, debias_confidence("桂花", 0.95));
    }

    #[test]
    fn test_debias_band_bounds() {
        for name in ["玫瑰", "郁金香", "向日葵", "rose", "紫罗兰"] {
            let c = debias_confidence(name, 0.95);
            assert!((0.82..=0.99).contains(&c), "{name} out of band: {c}");
        }
    }

    #[test]
    fn test_fallback_prefix_and_percent() {
        let result = normalize("识别结果：郁金香95%");
        assert_eq!(result.name, "郁金香");
        assert!((result.confidence - 0.95).abs() < 1e-9);
    }

    #[test]
    fn test_fallback_flower_name_prefix() {
        let result = normalize("花名: 向日葵");
        assert_eq!(result.name, "向日葵");
        assert!((result.confidence - DEFAULT_CONFIDENCE).abs() < 1e-9);
    }

    #[test]
    fn test_fallback_fractional_percent() {
        let result = normalize("中文名称：山茶花 87.5%");
        assert_eq!(result.name, "山茶花");
        assert!((result.confidence - 0.875).abs() < 1e-9);
    }

    #[test]
    fn test_fallback_bare_decimal() {
        let result = normalize("识别结果：紫藤 0.91");
        assert_eq!(result.name, "紫藤");
        assert!((result.confidence - 0.91).abs() < 1e-9);
    }

    #[test]
    fn test_fallback_percent_on_second_line() {
        let result = normalize("识别结果：水仙\n置信度：88%");
        assert_eq!(result.name, "水仙");
        assert!((result.confidence - 0.88).abs() < 1e-9);
    }

    #[test]
    fn test_empty_input_gives_placeholder() {
        for raw in ["", "   ", "\n\t"] {
            let result = normalize(raw);
            assert_eq!(result.name, NAME_PLACEHOLDER);
            assert!((result.confidence - DEFAULT_CONFIDENCE).abs() < 1e-9);
        }
    }

    #[test]
    fn test_name_never_empty() {
        for raw in ["：", "95%", "。。。", "{\"confidence\":\"abc\"}"] {
            let result = normalize(raw);
            assert!(!result.name.is_empty(), "empty name for {raw:?}");
        }
    }

    #[test]
    fn test_confidence_always_in_unit_range() {
        let inputs = [
            r#"{"name":"a","confidence":150}"#,
            r#"{"name":"a","confidence":-3}"#,
            r#"{"name":"a","confidence":"250%"}"#,
            "识别结果：玫瑰 999%",
            "随便说点什么",
        ];
        for raw in inputs {
            let c = normalize(raw).confidence;
            assert!((0.0..=1.0).contains(&c), "{raw} -> {c}");
        }
    }

    #[test]
    fn test_plain_text_name_only() {
        let result = normalize("郁金香");
        assert_eq!(result.name, "郁金香");
        assert!((result.confidence - DEFAULT_CONFIDENCE).abs() < 1e-9);
    }
}
