use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{
    common::generate_timestamp,
    thali_recognition::entities::{CanonicalItem, MealAnalysis, PassRecord, QualityReport},
};

pub const DETECTION_TYPE_MULTI_PASS: &str = "multi_pass_thali";

/// Successful outcome of one recognition call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RecognitionReport {
    pub recognition_id: Uuid,
    pub success: bool,
    pub detection_type: String,
    pub timestamp: DateTime<Utc>,
    pub detection_summary: DetectionSummary,
    pub items: Vec<CanonicalItem>,
    pub thali_analysis: MealAnalysis,
    pub quality_assurance: QualityReport,
    pub database_ready: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DetectionSummary {
    pub total_passes: usize,
    pub raw_detections: usize,
    pub final_unique_items: usize,
    pub overall_confidence: u8,
    pub detection_passes: Vec<PassRecord>,
}

impl RecognitionReport {
    pub fn new(
        detection_summary: DetectionSummary,
        items: Vec<CanonicalItem>,
        thali_analysis: MealAnalysis,
        quality_assurance: QualityReport,
    ) -> Self {
        let (now, timestamp) = generate_timestamp();

        Self {
            recognition_id: Uuid::new_v7(timestamp),
            success: true,
            detection_type: DETECTION_TYPE_MULTI_PASS.to_string(),
            timestamp: now,
            detection_summary,
            items,
            thali_analysis,
            quality_assurance,
            database_ready: true,
        }
    }
}
