//! [`ItemDetector`] backed by a vision LLM.
//!
//! Model output is treated as untrusted text: the first balanced JSON object
//! is cut out of it and read field by field, so prose around the JSON or a
//! sloppy field never costs the whole pass.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::domain::{
    common::entities::app_errors::CoreError,
    thali_recognition::{
        entities::{DEFAULT_CONFIDENCE, DetectorResponse, MAX_ITEM_QUANTITY, RawDetection},
        ports::{ItemDetector, LLMClient},
        prompts::strategy_prompt,
        schema::get_detection_response_schema,
        value_objects::{Category, Dietary, PassType, Portion, ThaliImage},
    },
};

#[derive(Debug, Clone)]
pub struct LlmItemDetector<L>
where
    L: LLMClient,
{
    llm: L,
}

impl<L> LlmItemDetector<L>
where
    L: LLMClient,
{
    pub fn new(llm: L) -> Self {
        Self { llm }
    }
}

impl<L> ItemDetector for LlmItemDetector<L>
where
    L: LLMClient,
{
    async fn detect(
        &self,
        image: ThaliImage,
        strategy: PassType,
    ) -> Result<DetectorResponse, CoreError> {
        let text = self
            .llm
            .generate_with_image(
                strategy_prompt(strategy),
                image,
                get_detection_response_schema(),
            )
            .await
            .map_err(|e| match e {
                CoreError::ResponseParseFailure(_) | CoreError::DetectorCallFailure(_) => e,
                other => CoreError::DetectorCallFailure(other.to_string()),
            })?;

        let response = parse_detector_response(&text, strategy)?;
        debug!(
            pass = strategy.as_str(),
            items = response.items.len(),
            "detector answered"
        );

        Ok(response)
    }
}

/// Returns the first balanced `{...}` in `text`. Braces inside string
/// literals do not count.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }

    None
}

pub fn parse_detector_response(
    text: &str,
    strategy: PassType,
) -> Result<DetectorResponse, CoreError> {
    let json = extract_json_object(text).ok_or_else(|| {
        CoreError::ResponseParseFailure("no JSON object in detector output".to_string())
    })?;

    let value: Value = serde_json::from_str(json)
        .map_err(|e| CoreError::ResponseParseFailure(format!("invalid detector JSON: {}", e)))?;
    let object = value.as_object().ok_or_else(|| {
        CoreError::ResponseParseFailure("detector output is not an object".to_string())
    })?;

    let detection_confidence = object
        .get("detection_confidence")
        .and_then(as_percent)
        .unwrap_or(DEFAULT_CONFIDENCE);

    let raw_items = object
        .get("items")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let items: Vec<RawDetection> = raw_items
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|item| parse_item(item, strategy))
        .collect();

    if items.len() < raw_items.len() {
        warn!(
            pass = strategy.as_str(),
            dropped = raw_items.len() - items.len(),
            "dropped detector items without a dish name"
        );
    }

    Ok(DetectorResponse {
        detection_confidence,
        items,
    })
}

fn parse_item(item: &Map<String, Value>, strategy: PassType) -> Option<RawDetection> {
    let text = |key: &str| {
        item.get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    };

    let dish_name = text("dish_name")?.to_string();

    Some(RawDetection {
        dish_name,
        category: text("category").map_or(Category::Unknown, Category::parse),
        quantity: item.get("quantity").and_then(as_count),
        position: text("position").map(str::to_string),
        confidence: item.get("confidence").and_then(as_percent),
        dietary: text("dietary").map_or(Dietary::Unknown, Dietary::parse),
        estimated_portion: text("estimated_portion").map_or(Portion::Medium, Portion::parse),
        pass_number: strategy.pass_number(),
        pass_type: strategy,
    })
}

/// Numbers may arrive as JSON numbers or numeric strings.
fn as_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

fn as_percent(value: &Value) -> Option<u8> {
    as_number(value).map(|n| n.round().clamp(0.0, 100.0) as u8)
}

fn as_count(value: &Value) -> Option<u32> {
    as_number(value).map(|n| n.round().clamp(1.0, f64::from(MAX_ITEM_QUANTITY)) as u32)
}
