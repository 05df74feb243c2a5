use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::thali_recognition::value_objects::{DetectionQuality, RecommendedAction};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct QualityReport {
    pub total_items: usize,
    pub high_confidence_items: usize,
    pub medium_confidence_items: usize,
    pub low_confidence_items: usize,
    pub detection_coverage: DetectionCoverage,
    pub completeness_score: u8,
    pub detection_quality: DetectionQuality,
    pub recommended_action: RecommendedAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DetectionCoverage {
    pub has_main_dish: bool,
    pub has_carbs: bool,
    pub has_vegetables: bool,
    pub has_sides: bool,
}
