//! Client-side review session around one recognition call.
//!
//! The session owns the only mutable copy of the detected items. Local edits
//! never touch the stored [`RecognitionReport`], and every summary is derived
//! from the edited list.

use std::collections::BTreeSet;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::{
    common::entities::app_errors::CoreError,
    thali_recognition::{
        enrichment::{analyze_meal, enrich_item, estimated_calories, estimated_total_price},
        entities::{
            CanonicalItem, DietaryInfo, MAX_ITEM_QUANTITY, RecognitionReport, ThaliSummary,
        },
        ports::ThaliRecognitionService,
        value_objects::{
            Dietary, ItemPatch, NewThaliItem, RecognizeThaliInput, SaveThaliRequest,
            SaveThaliResponse,
        },
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Idle,
    Loading,
    Success,
    Error,
}

type SessionListener = Box<dyn Fn(SessionStatus) + Send + Sync>;

pub struct RecognitionSession<S>
where
    S: ThaliRecognitionService,
{
    service: S,
    status: SessionStatus,
    result: Option<RecognitionReport>,
    error: Option<String>,
    detected_items: Vec<CanonicalItem>,
    next_item_id: u32,
    auto_save_owner: Option<Uuid>,
    listeners: Vec<SessionListener>,
}

impl<S> RecognitionSession<S>
where
    S: ThaliRecognitionService,
{
    pub fn new(service: S) -> Self {
        Self {
            service,
            status: SessionStatus::Idle,
            result: None,
            error: None,
            detected_items: Vec::new(),
            next_item_id: 1,
            auto_save_owner: None,
            listeners: Vec::new(),
        }
    }

    /// Saves every successful recognition for `session_owner_id` right away.
    /// A failed auto-save is logged and leaves the session in `Success`.
    pub fn with_auto_save(mut self, session_owner_id: Uuid) -> Self {
        self.auto_save_owner = Some(session_owner_id);
        self
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn result(&self) -> Option<&RecognitionReport> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn detected_items(&self) -> &[CanonicalItem] {
        &self.detected_items
    }

    /// Registers a callback fired after every state change and item edit.
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: Fn(SessionStatus) + Send + Sync + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Runs the full pipeline once. A second call while one is in flight is
    /// rejected. Dropping the returned future mid-flight puts the session
    /// back to `Idle`.
    pub async fn recognize(
        &mut self,
        input: RecognizeThaliInput,
    ) -> Result<RecognitionReport, CoreError> {
        if self.status == SessionStatus::Loading {
            return Err(CoreError::InvalidSessionState(
                "a recognition is already in flight".to_string(),
            ));
        }

        self.result = None;
        self.error = None;
        self.detected_items.clear();
        self.set_status(SessionStatus::Loading);

        let in_flight = InFlight {
            session: &mut *self,
            settled: false,
        };
        let outcome = in_flight.session.service.recognize_thali(input).await;
        let report = in_flight.settle(outcome)?;

        if let Some(owner) = self.auto_save_owner
            && let Err(e) = self.save(owner).await
        {
            warn!(error = %e, "auto-save after recognition failed");
        }

        Ok(report)
    }

    /// Applies a reviewer's edit and marks the item as manually verified.
    pub fn update_item_details(&mut self, item_id: u32, patch: ItemPatch) -> Result<(), CoreError> {
        self.ensure_reviewing()?;
        if patch
            .quantity
            .is_some_and(|q| q == 0 || q > MAX_ITEM_QUANTITY)
        {
            return Err(CoreError::Invalid(format!(
                "quantity must be between 1 and {MAX_ITEM_QUANTITY}"
            )));
        }
        if patch.confidence.is_some_and(|c| c > 100) {
            return Err(CoreError::Invalid(
                "confidence must be between 0 and 100".to_string(),
            ));
        }

        let item = self
            .detected_items
            .iter_mut()
            .find(|item| item.item_id == item_id)
            .ok_or(CoreError::ItemNotFound(item_id))?;

        apply_patch(item, patch);
        item.manually_verified = true;

        self.notify();
        Ok(())
    }

    pub fn remove_item(&mut self, item_id: u32) -> Result<CanonicalItem, CoreError> {
        self.ensure_reviewing()?;

        let index = self
            .detected_items
            .iter()
            .position(|item| item.item_id == item_id)
            .ok_or(CoreError::ItemNotFound(item_id))?;
        let removed = self.detected_items.remove(index);

        self.notify();
        Ok(removed)
    }

    /// Appends a hand-entered dish and returns its fresh id.
    pub fn add_manual_item(&mut self, input: NewThaliItem) -> Result<u32, CoreError> {
        self.ensure_reviewing()?;
        if input.dish_name.trim().is_empty() {
            return Err(CoreError::Invalid("dish_name is required".to_string()));
        }

        let item_id = self.next_item_id;
        self.next_item_id += 1;

        let price_override = input.estimated_price.clone();
        let mut item = enrich_item(CanonicalItem::manual(item_id, input));
        if let Some(price) = price_override {
            item.estimated_price = price;
        }

        self.detected_items.push(item);
        self.notify();
        Ok(item_id)
    }

    /// Totals over the current, possibly edited, item list. `None` until a
    /// recognition has succeeded.
    pub fn get_summary(&self) -> Option<ThaliSummary> {
        self.result.as_ref()?;

        let items = &self.detected_items;
        let mut seen = BTreeSet::new();
        let categories = items
            .iter()
            .map(|item| item.category)
            .filter(|category| seen.insert(category.as_str()))
            .collect();

        let vegetarian_items = items
            .iter()
            .filter(|item| item.dietary == Dietary::Vegetarian)
            .count();
        let non_vegetarian_items = items
            .iter()
            .filter(|item| item.dietary == Dietary::NonVegetarian)
            .count();

        Some(ThaliSummary {
            total_items: items.len(),
            categories,
            estimated_price: estimated_total_price(items),
            estimated_calories: estimated_calories(items),
            dietary_info: DietaryInfo {
                vegetarian_items,
                non_vegetarian_items,
                is_fully_vegetarian: non_vegetarian_items == 0,
            },
        })
    }

    pub fn clear_result(&mut self) {
        self.result = None;
        self.error = None;
        self.detected_items.clear();
        self.next_item_id = 1;
        self.set_status(SessionStatus::Idle);
    }

    /// Sends the reviewed plate to the persistence collaborator. The session
    /// is left untouched whatever the outcome; callers retry by calling again.
    pub async fn save(&self, session_owner_id: Uuid) -> Result<SaveThaliResponse, CoreError> {
        let recognition_data = match (self.status, &self.result) {
            (SessionStatus::Success, Some(result)) => result.clone(),
            _ => {
                return Err(CoreError::InvalidSessionState(
                    "nothing to save before a successful recognition".to_string(),
                ));
            }
        };

        let request = SaveThaliRequest {
            session_owner_id,
            recognition_data,
            items: self.detected_items.clone(),
            thali_analysis: analyze_meal(&self.detected_items),
            timestamp: Utc::now(),
        };

        let response = self.service.save_thali(request).await?;
        info!(saved_items = response.saved_items, "review committed");

        Ok(response)
    }

    fn ensure_reviewing(&self) -> Result<(), CoreError> {
        if self.status == SessionStatus::Success {
            Ok(())
        } else {
            Err(CoreError::InvalidSessionState(format!(
                "items can only be edited after a successful recognition, session is {:?}",
                self.status
            )))
        }
    }

    fn set_status(&mut self, status: SessionStatus) {
        self.status = status;
        self.notify();
    }

    fn notify(&self) {
        for listener in &self.listeners {
            listener(self.status);
        }
    }
}

/// Session borrowed for the duration of one recognition call.
struct InFlight<'a, S>
where
    S: ThaliRecognitionService,
{
    session: &'a mut RecognitionSession<S>,
    settled: bool,
}

impl<S> InFlight<'_, S>
where
    S: ThaliRecognitionService,
{
    fn settle(
        mut self,
        outcome: Result<RecognitionReport, CoreError>,
    ) -> Result<RecognitionReport, CoreError> {
        self.settled = true;
        let session = &mut *self.session;

        match outcome {
            Ok(report) => {
                session.detected_items = report.items.clone();
                session.next_item_id = report
                    .items
                    .iter()
                    .map(|item| item.item_id)
                    .max()
                    .unwrap_or(0)
                    + 1;
                session.result = Some(report.clone());
                session.set_status(SessionStatus::Success);
                Ok(report)
            }
            Err(e) => {
                warn!(error = %e, "thali recognition failed");
                session.error = Some(e.to_string());
                session.set_status(SessionStatus::Error);
                Err(e)
            }
        }
    }
}

impl<S> Drop for InFlight<'_, S>
where
    S: ThaliRecognitionService,
{
    fn drop(&mut self) {
        if !self.settled {
            warn!("thali recognition dropped before completing");
            self.session.set_status(SessionStatus::Idle);
        }
    }
}

fn apply_patch(item: &mut CanonicalItem, patch: ItemPatch) {
    if let Some(dish_name) = patch.dish_name {
        item.dish_name = dish_name;
    }
    if let Some(standard_name) = patch.standard_name {
        item.standard_name = standard_name;
    }
    if let Some(category) = patch.category {
        item.category = category;
    }
    if let Some(quantity) = patch.quantity {
        item.quantity = quantity;
    }
    if let Some(position) = patch.position {
        item.position = position;
    }
    if let Some(confidence) = patch.confidence {
        item.confidence = confidence;
    }
    if let Some(dietary) = patch.dietary {
        item.dietary = dietary;
    }
    if let Some(estimated_portion) = patch.estimated_portion {
        item.estimated_portion = estimated_portion;
    }
    if let Some(tags) = patch.tags {
        item.tags = tags;
    }
    if let Some(estimated_price) = patch.estimated_price {
        item.estimated_price = estimated_price;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::domain::{
        common::services::Service,
        thali_recognition::{
            entities::DetectorResponse,
            ports::ItemDetector,
            test_support::{RecordingStore, ScriptedDetector, detection},
            value_objects::{Category, PassType, Portion, PriceRange, ThaliImage},
        },
    };

    /// Detector whose calls never complete.
    struct StalledDetector;

    impl ItemDetector for StalledDetector {
        async fn detect(
            &self,
            _image: ThaliImage,
            _strategy: PassType,
        ) -> Result<DetectorResponse, CoreError> {
            std::future::pending().await
        }
    }

    const IMAGE: &str = "data:image/jpeg;base64,aGVsbG8=";

    type TestSession = RecognitionSession<Service<ScriptedDetector, RecordingStore>>;

    fn plate_detector() -> ScriptedDetector {
        let mut chicken = detection("Chicken Curry", Category::MainDish, 1, 90);
        chicken.dietary = Dietary::NonVegetarian;

        ScriptedDetector::new()
            .respond(
                PassType::Comprehensive,
                90,
                vec![
                    chicken,
                    detection("Jeera Rice", Category::Rice, 1, 90),
                    detection("Butter Naan", Category::Bread, 2, 85),
                ],
            )
            .respond(PassType::FocusedCategories, 90, vec![])
            .respond(PassType::DetailVerification, 90, vec![])
    }

    fn session_with(store: RecordingStore) -> TestSession {
        RecognitionSession::new(Service::new(plate_detector(), store))
    }

    async fn reviewed_session() -> TestSession {
        let mut session = session_with(RecordingStore::default());
        session
            .recognize(RecognizeThaliInput::from_image(IMAGE))
            .await
            .unwrap();
        session
    }

    fn raita() -> NewThaliItem {
        NewThaliItem {
            dish_name: "Boondi Raita".to_string(),
            category: Category::Sides,
            quantity: 1,
            position: None,
            dietary: Dietary::Vegetarian,
            estimated_portion: Portion::Small,
            estimated_price: None,
        }
    }

    #[test]
    fn test_new_session_is_idle() {
        let session = session_with(RecordingStore::default());

        assert_eq!(session.status(), SessionStatus::Idle);
        assert!(session.result().is_none());
        assert!(session.error().is_none());
        assert!(session.get_summary().is_none());
    }

    #[tokio::test]
    async fn test_recognize_moves_through_loading_to_success() {
        let mut session = session_with(RecordingStore::default());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        session.subscribe(move |status| sink.lock().unwrap().push(status));

        session
            .recognize(RecognizeThaliInput::from_image(IMAGE))
            .await
            .unwrap();

        assert_eq!(session.status(), SessionStatus::Success);
        assert_eq!(session.detected_items().len(), 3);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![SessionStatus::Loading, SessionStatus::Success]
        );
    }

    #[tokio::test]
    async fn test_failed_recognition_stores_error() {
        let mut session = RecognitionSession::new(Service::new(
            ScriptedDetector::new(),
            RecordingStore::default(),
        ));

        let result = session
            .recognize(RecognizeThaliInput::from_image(IMAGE))
            .await;

        assert!(result.is_err());
        assert_eq!(session.status(), SessionStatus::Error);
        assert_eq!(
            session.error(),
            Some("No food items could be detected in the image")
        );
        assert!(session.result().is_none());
    }

    #[tokio::test]
    async fn test_recognize_is_rejected_while_loading() {
        let mut session = reviewed_session().await;
        session.status = SessionStatus::Loading;

        let result = session
            .recognize(RecognizeThaliInput::from_image(IMAGE))
            .await;

        assert!(matches!(result, Err(CoreError::InvalidSessionState(_))));
    }

    #[tokio::test]
    async fn test_dropped_recognition_returns_to_idle() {
        let mut session =
            RecognitionSession::new(Service::new(StalledDetector, RecordingStore::default()));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        session.subscribe(move |status| sink.lock().unwrap().push(status));

        tokio::select! {
            biased;
            _ = session.recognize(RecognizeThaliInput::from_image(IMAGE)) => {
                panic!("stalled detector answered")
            }
            _ = std::future::ready(()) => {}
        }

        assert_eq!(session.status(), SessionStatus::Idle);
        assert!(session.result().is_none());
        assert_eq!(
            *seen.lock().unwrap(),
            vec![SessionStatus::Loading, SessionStatus::Idle]
        );
    }

    #[tokio::test]
    async fn test_auto_save_commits_after_recognition() {
        let owner = Uuid::new_v4();
        let mut session = session_with(RecordingStore::default()).with_auto_save(owner);

        session
            .recognize(RecognizeThaliInput::from_image(IMAGE))
            .await
            .unwrap();

        let requests = session.service.thali_store.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].session_owner_id, owner);
        assert_eq!(requests[0].items.len(), 3);
    }

    #[tokio::test]
    async fn test_failed_auto_save_keeps_recognition() {
        let mut session = session_with(RecordingStore::failing()).with_auto_save(Uuid::new_v4());

        let report = session
            .recognize(RecognizeThaliInput::from_image(IMAGE))
            .await
            .unwrap();

        assert_eq!(report.items.len(), 3);
        assert_eq!(session.status(), SessionStatus::Success);
        assert!(session.error().is_none());
    }

    #[tokio::test]
    async fn test_recognize_without_auto_save_stores_nothing() {
        let session = reviewed_session().await;

        assert!(session.service.thali_store.requests().is_empty());
    }

    #[tokio::test]
    async fn test_update_item_marks_manually_verified() {
        let mut session = reviewed_session().await;

        session
            .update_item_details(
                2,
                ItemPatch {
                    dish_name: Some("Peas Pulao".to_string()),
                    quantity: Some(2),
                    ..Default::default()
                },
            )
            .unwrap();

        let item = &session.detected_items()[1];
        assert_eq!(item.dish_name, "Peas Pulao");
        assert_eq!(item.quantity, 2);
        assert!(item.manually_verified);
        // the stored result is untouched
        assert_eq!(session.result().unwrap().items[1].dish_name, "Jeera Rice");
    }

    #[tokio::test]
    async fn test_update_rejects_unknown_item_and_zero_quantity() {
        let mut session = reviewed_session().await;

        assert!(matches!(
            session.update_item_details(99, ItemPatch::default()),
            Err(CoreError::ItemNotFound(99))
        ));
        assert!(matches!(
            session.update_item_details(
                1,
                ItemPatch {
                    quantity: Some(0),
                    ..Default::default()
                }
            ),
            Err(CoreError::Invalid(_))
        ));
    }

    #[tokio::test]
    async fn test_update_rejects_oversized_quantity() {
        let mut session = reviewed_session().await;

        let result = session.update_item_details(
            1,
            ItemPatch {
                quantity: Some(u32::MAX),
                ..Default::default()
            },
        );

        assert!(matches!(result, Err(CoreError::Invalid(_))));
        assert_eq!(session.detected_items()[0].quantity, 1);
        assert!(session.get_summary().is_some());
    }

    #[tokio::test]
    async fn test_manual_quantity_is_capped() {
        let mut session = reviewed_session().await;
        let mut input = raita();
        input.quantity = u32::MAX;

        let item_id = session.add_manual_item(input).unwrap();
        let item = session
            .detected_items()
            .iter()
            .find(|i| i.item_id == item_id)
            .unwrap();

        assert_eq!(item.quantity, MAX_ITEM_QUANTITY);
    }

    #[tokio::test]
    async fn test_add_then_remove_restores_items() {
        let mut session = reviewed_session().await;
        let before = session.detected_items().to_vec();

        let item_id = session.add_manual_item(raita()).unwrap();
        let added = session.detected_items().last().unwrap().clone();
        assert_eq!(added.item_id, 4);
        assert_eq!(added.confidence, 100);
        assert!(added.manually_added);
        assert_eq!(added.standard_name, "boondi raita");

        session.remove_item(item_id).unwrap();

        assert_eq!(session.detected_items(), before.as_slice());
    }

    #[tokio::test]
    async fn test_manual_ids_stay_unique_after_removal() {
        let mut session = reviewed_session().await;

        session.remove_item(3).unwrap();
        let first = session.add_manual_item(raita()).unwrap();
        let second = session.add_manual_item(raita()).unwrap();

        assert_ne!(first, second);
        assert!(first > 3 && second > 3);
    }

    #[tokio::test]
    async fn test_manual_price_override_is_kept() {
        let mut session = reviewed_session().await;
        let mut input = raita();
        input.estimated_price = Some(PriceRange::inr(35, 45));

        let item_id = session.add_manual_item(input).unwrap();
        let item = session
            .detected_items()
            .iter()
            .find(|i| i.item_id == item_id)
            .unwrap();

        assert_eq!(item.estimated_price, PriceRange::inr(35, 45));
    }

    #[tokio::test]
    async fn test_summary_reflects_edits() {
        let mut session = reviewed_session().await;

        let summary = session.get_summary().unwrap();
        // chicken 80*1.3=104, rice 40, naan 2*15
        assert_eq!(summary.estimated_price, 174);
        assert_eq!(summary.estimated_calories, 200 + 150 + 160);
        assert_eq!(summary.dietary_info.non_vegetarian_items, 1);
        assert!(!summary.dietary_info.is_fully_vegetarian);

        session.remove_item(1).unwrap();
        session.add_manual_item(raita()).unwrap();

        let summary = session.get_summary().unwrap();
        assert_eq!(summary.total_items, 3);
        assert_eq!(
            summary.categories,
            vec![Category::Rice, Category::Bread, Category::Sides]
        );
        assert_eq!(summary.estimated_price, 40 + 30 + 20);
        assert_eq!(summary.dietary_info.vegetarian_items, 3);
        assert!(summary.dietary_info.is_fully_vegetarian);
    }

    #[tokio::test]
    async fn test_edits_are_rejected_outside_success() {
        let mut session = session_with(RecordingStore::default());

        assert!(matches!(
            session.add_manual_item(raita()),
            Err(CoreError::InvalidSessionState(_))
        ));
        assert!(matches!(
            session.remove_item(1),
            Err(CoreError::InvalidSessionState(_))
        ));
    }

    #[tokio::test]
    async fn test_clear_result_returns_to_idle() {
        let mut session = reviewed_session().await;

        session.clear_result();

        assert_eq!(session.status(), SessionStatus::Idle);
        assert!(session.result().is_none());
        assert!(session.detected_items().is_empty());
    }

    #[tokio::test]
    async fn test_save_sends_current_items() {
        let mut session = reviewed_session().await;
        session.remove_item(2).unwrap();
        let owner = Uuid::new_v4();

        let response = session.save(owner).await.unwrap();

        assert!(response.success);
        assert_eq!(response.saved_items, 2);
        let requests = session.service.thali_store.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].session_owner_id, owner);
        assert_eq!(requests[0].items.len(), 2);
        assert_eq!(requests[0].recognition_data.items.len(), 3);
    }

    #[tokio::test]
    async fn test_failed_save_keeps_session_state() {
        let mut session = session_with(RecordingStore::failing());
        session
            .recognize(RecognizeThaliInput::from_image(IMAGE))
            .await
            .unwrap();
        let before = session.detected_items().to_vec();

        let result = session.save(Uuid::new_v4()).await;

        assert!(matches!(result, Err(CoreError::ExternalServiceError(_))));
        assert_eq!(session.status(), SessionStatus::Success);
        assert_eq!(session.detected_items(), before.as_slice());
    }
}
