pub mod gemini_client;
pub mod item_detector;

pub use gemini_client::GeminiLLMClient;
pub use item_detector::LlmItemDetector;
