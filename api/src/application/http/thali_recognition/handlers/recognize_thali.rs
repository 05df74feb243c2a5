use axum::extract::State;
use thaliscan_core::domain::thali_recognition::{
    entities::RecognitionReport, ports::ThaliRecognitionService,
};

use crate::application::http::{
    server::{
        api_entities::{
            api_error::{ApiError, ErrorBody, RecognitionFailure, ValidateJson},
            response::Response,
        },
        app_state::AppState,
    },
    thali_recognition::validators::RecognizeThaliRequest,
};

#[utoipa::path(
    post,
    path = "",
    tag = "thali-recognition",
    summary = "Recognize a thali",
    description = "Runs the multi-pass detector over a plate photo and returns the deduplicated, enriched items with a meal analysis and quality report.",
    responses(
        (status = 200, body = RecognitionReport),
        (status = 400, body = ErrorBody),
        (status = 500, body = RecognitionFailure)
    ),
    request_body = RecognizeThaliRequest
)]
pub async fn recognize_thali(
    State(state): State<AppState>,
    ValidateJson(payload): ValidateJson<RecognizeThaliRequest>,
) -> Result<Response<RecognitionReport>, ApiError> {
    let report = state
        .service
        .recognize_thali(payload.into())
        .await
        .map_err(ApiError::from)?;

    Ok(Response::OK(report))
}
