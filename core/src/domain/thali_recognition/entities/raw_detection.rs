use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::thali_recognition::value_objects::{Category, Dietary, PassType, Portion};

/// One dish reported by one detection pass. Discarded after consolidation.
///
/// `quantity`, `position` and `confidence` stay optional because their
/// defaults differ between creating a canonical item and merging into one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RawDetection {
    pub dish_name: String,
    pub category: Category,
    pub quantity: Option<u32>,
    pub position: Option<String>,
    pub confidence: Option<u8>,
    pub dietary: Dietary,
    pub estimated_portion: Portion,
    pub pass_number: u8,
    pub pass_type: PassType,
}

/// Parsed answer of the detector for a single pass.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorResponse {
    pub detection_confidence: u8,
    pub items: Vec<RawDetection>,
}
