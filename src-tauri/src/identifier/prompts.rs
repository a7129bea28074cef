//! Prompts and schemas for the vision and detail steps.

/// System prompt shared by the two text-generation calls.
pub fn botanist_system_prompt(language: &str) -> &'static str {
    if language == "en" {
        "You are a botanist who introduces flowers in concise, elegant language. \
         Always respond with valid JSON only, no markdown formatting or code blocks."
    } else {
        "你是一位植物学家，擅长用简洁优美的语言介绍花卉。\
         只返回合法的 JSON，不要包含 markdown 标记或代码块。"
    }
}

/// Prompt for the vision step: name plus confidence as a bare JSON object.
pub fn vision_prompt(language: &str) -> String {
    if language == "en" {
        r#"Identify the flower in this photo.

Return ONLY a JSON object, no other text, markdown, or explanation:
{"name": "common English flower name", "confidence": 0.0-1.0}

Use your honest confidence in the identification, not a fixed value.
If no flower is visible, use "unknown flower" with a low confidence."#
            .to_string()
    } else {
        r#"请识别这张图片中的花卉。

只返回一个 JSON 对象，不要包含任何其他文字、markdown 标记或解释：
{"name": "花卉的标准中文名称", "confidence": 0.0-1.0 之间的置信度}

置信度请如实给出，不要固定使用同一个数值。
如果图片中没有花卉，name 使用"未知花卉"并给出较低的置信度。"#
            .to_string()
    }
}

/// Prompt for the detail step: the full encyclopedia record for one flower.
pub fn details_prompt(flower_name: &str, language: &str) -> String {
    if language == "en" {
        format!(
            r#"Generate encyclopedia information for the flower "{flower_name}".

Requirements:
1. Return pure JSON only, with no other text or markdown markers.
2. The JSON structure must be exactly:
{{
  "scientificName": "Latin binomial name",
  "description": "a short, graceful introduction (under 30 words)",
  "poetry": "a famous couplet or two-line verse about this flower, the two parts separated by a comma",
  "botany": "botanical characteristics: family, genus, morphology (under 50 words)",
  "culture": "flower language or cultural symbolism (under 30 words)",
  "care": {{
    "water": "watering guidance (under 25 words)",
    "sunlight": "light guidance (under 25 words)",
    "soil": "soil guidance (under 25 words)",
    "temperature": "temperature guidance (under 25 words)"
  }}
}}

Return the JSON directly with no prefix or suffix."#
        )
    } else {
        format!(
            r#"请为"{flower_name}"生成花卉百科信息。

要求：
1. 必须返回纯 JSON 格式，不要包含任何其他文字或 markdown 标记
2. JSON 结构如下：
{{
  "scientificName": "拉丁学名",
  "description": "用优美的语言简短介绍这种花（30字以内）",
  "poetry": "与该花卉相关的著名诗词（必须包含上下句，用逗号分隔，如：'采菊东篱下，悠然见南山'）",
  "botany": "植物学特征简述（科属、形态等，50字以内）",
  "culture": "花语或文化寓意（30字以内）",
  "care": {{
    "water": "浇水要点（25字以内）",
    "sunlight": "光照要点（25字以内）",
    "soil": "土壤要点（25字以内）",
    "temperature": "温度要点（25字以内）"
  }}
}}

请直接返回 JSON，不要添加任何前缀或后缀。"#
        )
    }
}

/// JSON schema for the detail record, used with providers that support
/// strict structured output (OpenAI).
pub fn flower_details_json_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "scientificName": {
                "type": "string",
                "description": "Latin binomial name of the flower"
            },
            "description": {
                "type": "string",
                "description": "Short, graceful introduction to the flower"
            },
            "poetry": {
                "type": "string",
                "description": "A famous two-line verse about the flower, parts separated by a comma"
            },
            "botany": {
                "type": "string",
                "description": "Botanical characteristics: family, genus, morphology"
            },
            "culture": {
                "type": "string",
                "description": "Flower language or cultural symbolism"
            },
            "care": {
                "type": "object",
                "properties": {
                    "water": { "type": "string" },
                    "sunlight": { "type": "string" },
                    "soil": { "type": "string" },
                    "temperature": { "type": "string" }
                },
                "required": ["water", "sunlight", "soil", "temperature"],
                "additionalProperties": false
            }
        },
        "required": ["scientificName", "description", "poetry", "botany", "culture", "care"],
        "additionalProperties": false
    })
}
