use tracing::{error, info, instrument};

use crate::domain::{
    common::{entities::app_errors::CoreError, services::Service},
    thali_recognition::{
        consolidation::consolidate,
        enrichment::{analyze_meal, enrich_items},
        entities::{DetectionSummary, RecognitionReport},
        orchestrator::{DetectionOutcome, run_detection_passes},
        ports::{ItemDetector, ThaliRecognitionService, ThaliStore},
        quality::assess_quality,
        value_objects::{RecognizeThaliInput, SaveThaliRequest, SaveThaliResponse, ThaliImage},
    },
};

/// Turns the raw pass outcome into the final report.
///
/// An outcome without a single usable detection is a failure, never an empty
/// success.
pub fn build_report(outcome: &DetectionOutcome) -> Result<RecognitionReport, CoreError> {
    let items = enrich_items(consolidate(&outcome.raw_detections));
    if items.is_empty() {
        return Err(CoreError::NoItemsDetected);
    }

    let thali_analysis = analyze_meal(&items);
    let quality_assurance = assess_quality(&items, &outcome.passes);

    let detection_summary = DetectionSummary {
        total_passes: outcome.passes.len(),
        raw_detections: outcome.raw_detections.len(),
        final_unique_items: items.len(),
        overall_confidence: outcome.overall_confidence(),
        detection_passes: outcome.passes.clone(),
    };

    Ok(RecognitionReport::new(
        detection_summary,
        items,
        thali_analysis,
        quality_assurance,
    ))
}

impl<D, TS> ThaliRecognitionService for Service<D, TS>
where
    D: ItemDetector,
    TS: ThaliStore,
{
    #[instrument(
        skip(self, input),
        fields(detection_mode = ?input.detection_mode, max_iterations = ?input.max_iterations)
    )]
    async fn recognize_thali(
        &self,
        input: RecognizeThaliInput,
    ) -> Result<RecognitionReport, CoreError> {
        // 1. Validate before any pass runs
        let image = ThaliImage::from_payload(&input.image)?;

        // 2. Multi-pass detection
        let outcome = run_detection_passes(self.item_detector.as_ref(), &image).await;
        if outcome.raw_detections.is_empty() {
            error!(
                passes = outcome.passes.len(),
                "no pass produced a usable detection"
            );
            return Err(CoreError::NoItemsDetected);
        }

        // 3. Consolidate, enrich and score
        let report = build_report(&outcome)?;

        info!(
            raw_detections = report.detection_summary.raw_detections,
            unique_items = report.detection_summary.final_unique_items,
            overall_confidence = report.detection_summary.overall_confidence,
            "thali recognition complete"
        );

        Ok(report)
    }

    #[instrument(skip(self, request), fields(session_owner_id = %request.session_owner_id))]
    async fn save_thali(&self, request: SaveThaliRequest) -> Result<SaveThaliResponse, CoreError> {
        if request.items.is_empty() {
            return Err(CoreError::Invalid(
                "at least one item is required to save a thali".to_string(),
            ));
        }

        let response = self.thali_store.save(request).await?;
        info!(saved_items = response.saved_items, "thali saved");

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::thali_recognition::{
        ports::{MockItemDetector, MockThaliStore},
        test_support::{RecordingStore, ScriptedDetector, detection},
        value_objects::{Category, DetectionQuality, PassType, RecommendedAction},
    };

    const IMAGE: &str = "data:image/jpeg;base64,aGVsbG8=";

    fn service(detector: ScriptedDetector) -> Service<ScriptedDetector, RecordingStore> {
        Service::new(detector, RecordingStore::default())
    }

    fn full_plate_detector() -> ScriptedDetector {
        ScriptedDetector::new()
            .respond(
                PassType::Comprehensive,
                88,
                vec![
                    detection("Dal Tadka", Category::Dal, 1, 92),
                    detection("Jeera Rice", Category::Rice, 1, 90),
                    detection("Aloo Gobi", Category::Vegetable, 1, 85),
                ],
            )
            .respond(
                PassType::FocusedCategories,
                86,
                vec![
                    detection("Roti", Category::Bread, 2, 88),
                    detection("Mango Pickle", Category::Sides, 1, 75),
                ],
            )
            .respond(
                PassType::DetailVerification,
                90,
                vec![
                    detection("Yellow Dal", Category::Dal, 1, 80),
                    detection("roti", Category::Bread, 1, 90),
                ],
            )
    }

    #[tokio::test]
    async fn test_recognize_full_plate() {
        let service = service(full_plate_detector());

        let report = service
            .recognize_thali(RecognizeThaliInput::from_image(IMAGE))
            .await
            .unwrap();

        assert!(report.success);
        assert!(report.database_ready);
        assert_eq!(report.detection_type, "multi_pass_thali");
        assert_eq!(report.detection_summary.total_passes, 3);
        assert_eq!(report.detection_summary.raw_detections, 7);
        assert_eq!(report.detection_summary.final_unique_items, 5);
        assert_eq!(report.detection_summary.overall_confidence, 88);

        let dal = &report.items[0];
        assert_eq!(dal.dish_name, "Dal Tadka");
        assert_eq!(dal.standard_name, "dal");
        assert_eq!(dal.quantity, 2);
        assert_eq!(dal.confidence, 92);

        let roti = report
            .items
            .iter()
            .find(|i| i.category == Category::Bread)
            .unwrap();
        assert_eq!(roti.quantity, 3);

        assert_eq!(report.quality_assurance.completeness_score, 90);
        assert_eq!(
            report.quality_assurance.detection_quality,
            DetectionQuality::Comprehensive
        );
        assert_eq!(
            report.quality_assurance.recommended_action,
            RecommendedAction::AutoApprove
        );
    }

    #[tokio::test]
    async fn test_recognize_rejects_missing_image_before_any_pass() {
        let mut detector = MockItemDetector::new();
        detector.expect_detect().never();
        let mut store = MockThaliStore::new();
        store.expect_save().never();
        let service = Service::new(detector, store);

        let result = service
            .recognize_thali(RecognizeThaliInput::from_image("  "))
            .await;

        assert!(matches!(result, Err(CoreError::MissingImage)));
    }

    #[tokio::test]
    async fn test_recognize_fails_when_every_pass_fails() {
        let service = service(
            ScriptedDetector::new()
                .fail(PassType::Comprehensive)
                .fail(PassType::FocusedCategories)
                .fail(PassType::DetailVerification)
                .fail(PassType::MissedItems),
        );

        let result = service
            .recognize_thali(RecognizeThaliInput::from_image(IMAGE))
            .await;

        assert!(matches!(result, Err(CoreError::NoItemsDetected)));
        assert_eq!(service.item_detector.calls().len(), 4);
    }

    #[tokio::test]
    async fn test_sparse_plate_is_sent_to_manual_review() {
        let service = service(
            ScriptedDetector::new()
                .respond(
                    PassType::Comprehensive,
                    95,
                    vec![detection("Masala Dosa", Category::MainDish, 1, 95)],
                )
                .respond(PassType::FocusedCategories, 95, vec![])
                .respond(PassType::DetailVerification, 95, vec![]),
        );

        let report = service
            .recognize_thali(RecognizeThaliInput::from_image(IMAGE))
            .await
            .unwrap();

        // the unscripted recovery pass ran and failed locally
        assert_eq!(report.detection_summary.total_passes, 4);
        assert_eq!(report.detection_summary.overall_confidence, 95);
        assert_eq!(
            report.quality_assurance.recommended_action,
            RecommendedAction::ManualReview
        );
    }

    #[test]
    fn test_build_report_rejects_empty_outcome() {
        let outcome = DetectionOutcome::default();
        assert!(matches!(
            build_report(&outcome),
            Err(CoreError::NoItemsDetected)
        ));
    }

    #[tokio::test]
    async fn test_save_requires_items() {
        let mut store = MockThaliStore::new();
        store.expect_save().never();
        let service = Service::new(MockItemDetector::new(), store);
        let report = build_report(&DetectionOutcome {
            raw_detections: vec![detection("Lassi", Category::Beverage, 1, 90)],
            ..Default::default()
        })
        .unwrap();

        let request = SaveThaliRequest {
            session_owner_id: uuid::Uuid::new_v4(),
            thali_analysis: report.thali_analysis.clone(),
            recognition_data: report,
            items: vec![],
            timestamp: chrono::Utc::now(),
        };

        let result = service.save_thali(request).await;

        assert!(matches!(result, Err(CoreError::Invalid(_))));
    }
}
