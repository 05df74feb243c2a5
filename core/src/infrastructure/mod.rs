pub mod llm;
pub mod thali_store;
