use tracing::{info, warn};

use crate::domain::thali_recognition::{
    entities::{PassRecord, RawDetection},
    ports::ItemDetector,
    value_objects::{PassType, ThaliImage},
};

/// Mean pass confidence below which the recovery pass runs.
pub const RECOVERY_CONFIDENCE_THRESHOLD: f64 = 85.0;
/// Raw detection count below which the recovery pass runs.
pub const RECOVERY_MIN_RAW_DETECTIONS: usize = 3;

const PRIMARY_PASSES: [PassType; 3] = [
    PassType::Comprehensive,
    PassType::FocusedCategories,
    PassType::DetailVerification,
];

/// Result of a single pass. Failed passes carry no items and zero confidence.
#[derive(Debug, Clone, PartialEq)]
pub struct PassOutcome {
    pub pass_type: PassType,
    pub success: bool,
    pub items: Vec<RawDetection>,
    pub confidence: u8,
}

impl PassOutcome {
    fn failed(pass_type: PassType) -> Self {
        Self {
            pass_type,
            success: false,
            items: Vec::new(),
            confidence: 0,
        }
    }
}

/// Everything collected across the executed passes, in pass order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectionOutcome {
    pub raw_detections: Vec<RawDetection>,
    pub passes: Vec<PassRecord>,
    /// Confidences of successful passes only.
    pub confidences: Vec<u8>,
}

impl DetectionOutcome {
    fn record(&mut self, outcome: PassOutcome) {
        self.passes.push(PassRecord {
            pass_number: outcome.pass_type.pass_number(),
            pass_type: outcome.pass_type,
            success: outcome.success,
            items_found: outcome.items.len(),
            confidence: outcome.confidence,
        });

        if outcome.success {
            self.confidences.push(outcome.confidence);
        }
        self.raw_detections.extend(outcome.items);
    }

    pub fn mean_confidence(&self) -> Option<f64> {
        if self.confidences.is_empty() {
            return None;
        }
        let total: u32 = self.confidences.iter().map(|&c| u32::from(c)).sum();
        Some(f64::from(total) / self.confidences.len() as f64)
    }

    /// Rounded mean of successful pass confidences, 0 when every pass failed.
    pub fn overall_confidence(&self) -> u8 {
        self.mean_confidence()
            .map(|mean| mean.round().clamp(0.0, 100.0) as u8)
            .unwrap_or(0)
    }

    pub fn successful_passes(&self) -> usize {
        self.passes.iter().filter(|p| p.success).count()
    }

    /// The recovery pass compensates for a weak or sparse primary scan.
    pub fn needs_recovery_pass(&self) -> bool {
        let low_confidence = self
            .mean_confidence()
            .is_none_or(|mean| mean < RECOVERY_CONFIDENCE_THRESHOLD);

        low_confidence || self.raw_detections.len() < RECOVERY_MIN_RAW_DETECTIONS
    }
}

/// Runs the fixed pass schedule against the detector, strictly in sequence.
///
/// Three primary passes always run. A fourth `missed_items` pass runs when
/// [`DetectionOutcome::needs_recovery_pass`] holds after the third.
pub async fn run_detection_passes<D>(detector: &D, image: &ThaliImage) -> DetectionOutcome
where
    D: ItemDetector,
{
    let mut outcome = DetectionOutcome::default();

    for pass_type in PRIMARY_PASSES {
        outcome.record(run_pass(detector, image, pass_type).await);
    }

    if outcome.needs_recovery_pass() {
        info!(
            mean_confidence = ?outcome.mean_confidence(),
            raw_detections = outcome.raw_detections.len(),
            "running missed items recovery pass"
        );
        outcome.record(run_pass(detector, image, PassType::MissedItems).await);
    }

    info!(
        passes = outcome.passes.len(),
        raw_detections = outcome.raw_detections.len(),
        "multi-pass detection complete"
    );

    outcome
}

async fn run_pass<D>(detector: &D, image: &ThaliImage, pass_type: PassType) -> PassOutcome
where
    D: ItemDetector,
{
    let pass_number = pass_type.pass_number();
    info!(pass_number, pass_type = pass_type.as_str(), "starting detection pass");

    match detector.detect(image.clone(), pass_type).await {
        Ok(response) => {
            let items: Vec<RawDetection> = response
                .items
                .into_iter()
                .map(|mut item| {
                    item.pass_number = pass_number;
                    item.pass_type = pass_type;
                    item
                })
                .collect();

            info!(
                pass_number,
                items_found = items.len(),
                confidence = response.detection_confidence,
                "detection pass finished"
            );

            PassOutcome {
                pass_type,
                success: true,
                items,
                confidence: response.detection_confidence.min(100),
            }
        }
        Err(e) => {
            warn!(pass_number, error = %e, "detection pass failed");
            PassOutcome::failed(pass_type)
        }
    }
}
