use serde::{Deserialize, Serialize};
use thaliscan_core::domain::thali_recognition::value_objects::RecognizeThaliInput;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, ToSchema, Validate)]
pub struct RecognizeThaliRequest {
    /// Base64 image, optionally as a `data:image/...;base64,` URL.
    #[validate(
        required(message = "Image data is required"),
        length(min = 1, message = "Image data is required")
    )]
    pub image: Option<String>,
    #[schema(example = "comprehensive")]
    pub detection_mode: Option<String>,
    #[schema(example = 3)]
    pub max_iterations: Option<u32>,
}

impl From<RecognizeThaliRequest> for RecognizeThaliInput {
    fn from(request: RecognizeThaliRequest) -> Self {
        RecognizeThaliInput {
            image: request.image.unwrap_or_default(),
            detection_mode: request.detection_mode,
            max_iterations: request.max_iterations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(image: Option<&str>) -> RecognizeThaliRequest {
        RecognizeThaliRequest {
            image: image.map(str::to_string),
            detection_mode: None,
            max_iterations: None,
        }
    }

    #[test]
    fn test_image_is_required() {
        let errors = request(None).validate().unwrap_err();
        let field_errors = errors.field_errors();

        assert_eq!(
            field_errors["image"][0].message.as_deref(),
            Some("Image data is required")
        );
        assert!(request(Some("")).validate().is_err());
        assert!(request(Some("aGVsbG8=")).validate().is_ok());
    }

    #[test]
    fn test_optional_knobs_are_passed_through() {
        let input = RecognizeThaliInput::from(RecognizeThaliRequest {
            image: Some("aGVsbG8=".to_string()),
            detection_mode: Some("comprehensive".to_string()),
            max_iterations: Some(5),
        });

        assert_eq!(input.image, "aGVsbG8=");
        assert_eq!(input.detection_mode.as_deref(), Some("comprehensive"));
        assert_eq!(input.max_iterations, Some(5));
    }
}
