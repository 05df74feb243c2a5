use std::{collections::HashMap, sync::Mutex};

use crate::domain::{
    common::entities::app_errors::CoreError,
    thali_recognition::{
        entities::{DetectorResponse, RawDetection},
        ports::{ItemDetector, ThaliStore},
        value_objects::{
            Category, Dietary, PassType, Portion, SaveThaliRequest, SaveThaliResponse,
            ThaliImage,
        },
    },
};

pub fn test_image() -> ThaliImage {
    ThaliImage::from_payload("data:image/jpeg;base64,aGVsbG8=").unwrap()
}

pub fn detection(name: &str, category: Category, quantity: u32, confidence: u8) -> RawDetection {
    RawDetection {
        dish_name: name.to_string(),
        category,
        quantity: Some(quantity),
        position: None,
        confidence: Some(confidence),
        dietary: Dietary::Vegetarian,
        estimated_portion: Portion::Medium,
        pass_number: 1,
        pass_type: PassType::Comprehensive,
    }
}

/// Detector answering from a fixed script; unscripted passes fail.
#[derive(Default)]
pub struct ScriptedDetector {
    script: HashMap<PassType, Option<DetectorResponse>>,
    calls: Mutex<Vec<PassType>>,
}

impl ScriptedDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, pass: PassType, confidence: u8, items: Vec<RawDetection>) -> Self {
        self.script.insert(
            pass,
            Some(DetectorResponse {
                detection_confidence: confidence,
                items,
            }),
        );
        self
    }

    pub fn fail(mut self, pass: PassType) -> Self {
        self.script.insert(pass, None);
        self
    }

    pub fn calls(&self) -> Vec<PassType> {
        self.calls.lock().unwrap().clone()
    }
}

impl ItemDetector for ScriptedDetector {
    async fn detect(
        &self,
        _image: ThaliImage,
        strategy: PassType,
    ) -> Result<DetectorResponse, CoreError> {
        self.calls.lock().unwrap().push(strategy);

        match self.script.get(&strategy) {
            Some(Some(response)) => Ok(response.clone()),
            Some(None) => Err(CoreError::DetectorCallFailure(
                "scripted failure".to_string(),
            )),
            None => Err(CoreError::ResponseParseFailure(
                "no scripted response".to_string(),
            )),
        }
    }
}

/// Store that records every request it receives.
#[derive(Default)]
pub struct RecordingStore {
    pub fail: bool,
    requests: Mutex<Vec<SaveThaliRequest>>,
}

impl RecordingStore {
    pub fn failing() -> Self {
        Self {
            fail: true,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<SaveThaliRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl ThaliStore for RecordingStore {
    async fn save(&self, request: SaveThaliRequest) -> Result<SaveThaliResponse, CoreError> {
        if self.fail {
            return Err(CoreError::ExternalServiceError(
                "store unavailable".to_string(),
            ));
        }

        let saved_items = request.items.len();
        self.requests.lock().unwrap().push(request);

        Ok(SaveThaliResponse {
            success: true,
            saved_items,
        })
    }
}
