pub mod common;
pub mod thali_recognition;
