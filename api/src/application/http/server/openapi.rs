use crate::application::http::thali_recognition::router::ThaliRecognitionApiDoc;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Thaliscan API"
    ),
    nest(
        (path = "/thali-recognition", api = ThaliRecognitionApiDoc),
    )
)]
pub struct ApiDoc;
