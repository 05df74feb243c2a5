pub mod health;
pub mod server;
pub mod thali_recognition;
