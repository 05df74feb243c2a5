use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Image data is required")]
    MissingImage,

    #[error("Invalid image data: {0}")]
    InvalidImage(String),

    #[error("Item detector call failed: {0}")]
    DetectorCallFailure(String),

    #[error("Failed to parse detector response: {0}")]
    ResponseParseFailure(String),

    #[error("No food items could be detected in the image")]
    NoItemsDetected,

    #[error("Invalid session state: {0}")]
    InvalidSessionState(String),

    #[error("Item {0} not found")]
    ItemNotFound(u32),

    #[error("Invalid input: {0}")]
    Invalid(String),

    #[error("External service error: {0}")]
    ExternalServiceError(String),

    #[error("Internal server error")]
    InternalServerError,
}

impl CoreError {
    /// Whether the error was caused by the caller's input rather than the pipeline.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            CoreError::MissingImage | CoreError::InvalidImage(_) | CoreError::Invalid(_)
        )
    }
}
