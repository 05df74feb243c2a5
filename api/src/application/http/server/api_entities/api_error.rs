use axum::{
    Json,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thaliscan_core::domain::common::entities::app_errors::CoreError;
use thiserror::Error;
use tracing::error;
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

const RECOGNITION_FAILED: &str = "Multi-pass thali recognition failed";

const SUGGESTED_CATEGORIES: [&str; 7] = [
    "Main Dishes",
    "Rice Items",
    "Breads",
    "Dal/Lentils",
    "Vegetables",
    "Sides",
    "Beverages",
];

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    /// The pipeline ran but could not produce a plate.
    #[error("{0}")]
    RecognitionFailed(String),

    #[error("{0}")]
    InternalServerError(String),
}

/// Body of every 4xx answer.
#[derive(Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ManualEntryFallback {
    pub manual_entry: bool,
    pub suggested_categories: Vec<String>,
}

/// Body returned when recognition fails; points the client to manual entry.
#[derive(Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RecognitionFailure {
    pub success: bool,
    pub error: String,
    pub message: String,
    pub fallback: ManualEntryFallback,
}

impl RecognitionFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: RECOGNITION_FAILED.to_string(),
            message: message.into(),
            fallback: ManualEntryFallback {
                manual_entry: true,
                suggested_categories: SUGGESTED_CATEGORIES.iter().map(|c| c.to_string()).collect(),
            },
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(error: CoreError) -> Self {
        let message = error.to_string();
        if error.is_validation() {
            return ApiError::BadRequest(message);
        }

        match error {
            CoreError::ItemNotFound(_) => ApiError::NotFound(message),
            CoreError::InternalServerError => ApiError::InternalServerError(message),
            _ => ApiError::RecognitionFailed(message),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(ErrorBody { error: message })).into_response()
            }
            ApiError::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(ErrorBody { error: message })).into_response()
            }
            ApiError::RecognitionFailed(message) | ApiError::InternalServerError(message) => {
                error!("thali recognition failed: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(RecognitionFailure::new(message)),
                )
                    .into_response()
            }
        }
    }
}

/// JSON extractor that runs `validator` rules before the handler sees the body.
pub struct ValidateJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidateJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;

        value
            .validate()
            .map_err(|errors| ApiError::BadRequest(first_validation_message(&errors)))?;

        Ok(ValidateJson(value))
    }
}

/// Message of the first failing rule, fields taken in name order.
fn first_validation_message(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|(a, _), (b, _)| a.cmp(b));

    fields
        .into_iter()
        .find_map(|(field, field_errors)| {
            field_errors.first().map(|e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field))
            })
        })
        .unwrap_or_else(|| "Invalid request body".to_string())
}
