use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::thali_recognition::{
    entities::RawDetection,
    value_objects::{Category, Dietary, NewThaliItem, Portion, PriceRange},
};

pub const DEFAULT_POSITION: &str = "not specified";
pub const DEFAULT_CONFIDENCE: u8 = 50;
pub const VERIFIED_CONFIDENCE: u8 = 80;
/// Upper bound on servings of one dish on a single plate.
pub const MAX_ITEM_QUANTITY: u32 = 99;

pub const SOURCE_MULTI_PASS: &str = "multi_pass_ai";
pub const SOURCE_MANUAL: &str = "manual";

/// Deduplicated dish across all passes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CanonicalItem {
    pub item_id: u32,
    pub dish_name: String,
    pub standard_name: String,
    pub category: Category,
    pub quantity: u32,
    pub position: String,
    pub confidence: u8,
    pub dietary: Dietary,
    pub estimated_portion: Portion,
    pub tags: Vec<String>,
    pub estimated_price: PriceRange,
    pub detection_source: String,
    pub verified: bool,
    pub manually_verified: bool,
    pub manually_added: bool,
}

impl CanonicalItem {
    /// Seeds a canonical item from the first detection of a dish. Enrichment
    /// fields are filled from the category until the enricher runs.
    pub fn from_detection(item_id: u32, detection: &RawDetection) -> Self {
        let confidence = detection.confidence.unwrap_or(DEFAULT_CONFIDENCE).min(100);
        let dish_name = detection.dish_name.trim().to_string();
        let (min, max) = detection.category.base_price();

        Self {
            item_id,
            standard_name: dish_name.to_lowercase(),
            dish_name,
            category: detection.category,
            quantity: detection.quantity.unwrap_or(1).clamp(1, MAX_ITEM_QUANTITY),
            position: detection
                .position
                .as_deref()
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .unwrap_or(DEFAULT_POSITION)
                .to_string(),
            confidence,
            dietary: detection.dietary,
            estimated_portion: detection.estimated_portion,
            tags: vec![detection.category.as_str().to_string()],
            estimated_price: PriceRange::inr(min, max),
            detection_source: SOURCE_MULTI_PASS.to_string(),
            verified: confidence > VERIFIED_CONFIDENCE,
            manually_verified: false,
            manually_added: false,
        }
    }

    /// Builds a reviewer-entered item. Manual entries are fully trusted.
    pub fn manual(item_id: u32, input: NewThaliItem) -> Self {
        let dish_name = input.dish_name.trim().to_string();
        let (min, max) = input.category.base_price();

        Self {
            item_id,
            standard_name: dish_name.to_lowercase(),
            dish_name,
            category: input.category,
            quantity: input.quantity.clamp(1, MAX_ITEM_QUANTITY),
            position: input
                .position
                .filter(|p| !p.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_POSITION.to_string()),
            confidence: 100,
            dietary: input.dietary,
            estimated_portion: input.estimated_portion,
            tags: vec![input.category.as_str().to_string()],
            estimated_price: input
                .estimated_price
                .unwrap_or_else(|| PriceRange::inr(min, max)),
            detection_source: SOURCE_MANUAL.to_string(),
            verified: true,
            manually_verified: false,
            manually_added: true,
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}
