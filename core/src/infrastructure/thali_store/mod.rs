pub mod http_thali_store;

pub use http_thali_store::HttpThaliStore;
