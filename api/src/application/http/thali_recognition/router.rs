use axum::{Router, routing::post};
use utoipa::OpenApi;

use super::handlers::recognize_thali::{__path_recognize_thali, recognize_thali};
use crate::application::http::server::app_state::AppState;

#[derive(OpenApi)]
#[openapi(paths(recognize_thali))]
pub struct ThaliRecognitionApiDoc;

pub fn thali_recognition_routes(state: AppState) -> Router<AppState> {
    Router::new().route(
        &format!("{}/thali-recognition", state.args.server.root_path),
        post(recognize_thali),
    )
}
