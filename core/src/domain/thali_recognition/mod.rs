pub mod consolidation;
pub mod enrichment;
pub mod entities;
pub mod orchestrator;
pub mod ports;
pub mod prompts;
pub mod quality;
pub mod schema;
pub mod services;
pub mod session;
#[cfg(test)]
pub(crate) mod test_support;
pub mod value_objects;

pub use entities::*;
pub use ports::*;
pub use value_objects::*;
