use std::future::Future;

use crate::domain::{
    common::entities::app_errors::CoreError,
    thali_recognition::{
        entities::{DetectorResponse, RecognitionReport},
        value_objects::{
            PassType, RecognizeThaliInput, SaveThaliRequest, SaveThaliResponse, ThaliImage,
        },
    },
};

/// LLM Client trait for calling vision models
#[cfg_attr(test, mockall::automock)]
pub trait LLMClient: Send + Sync {
    fn generate_with_image(
        &self,
        prompt: String,
        image: ThaliImage,
        response_schema: serde_json::Value,
    ) -> impl Future<Output = Result<String, CoreError>> + Send;
}

/// External detector returning the dishes it sees for one scan strategy.
///
/// Failures are local to a pass: callers record them and move on.
#[cfg_attr(test, mockall::automock)]
pub trait ItemDetector: Send + Sync {
    fn detect(
        &self,
        image: ThaliImage,
        strategy: PassType,
    ) -> impl Future<Output = Result<DetectorResponse, CoreError>> + Send;
}

/// Persistence collaborator receiving reviewed plates.
#[cfg_attr(test, mockall::automock)]
pub trait ThaliStore: Send + Sync {
    fn save(
        &self,
        request: SaveThaliRequest,
    ) -> impl Future<Output = Result<SaveThaliResponse, CoreError>> + Send;
}

/// Service trait for thali recognition business logic
#[cfg_attr(test, mockall::automock)]
pub trait ThaliRecognitionService: Send + Sync {
    fn recognize_thali(
        &self,
        input: RecognizeThaliInput,
    ) -> impl Future<Output = Result<RecognitionReport, CoreError>> + Send;

    fn save_thali(
        &self,
        request: SaveThaliRequest,
    ) -> impl Future<Output = Result<SaveThaliResponse, CoreError>> + Send;
}
