pub mod canonical_item;
pub mod meal_analysis;
pub mod pass_record;
pub mod quality_report;
pub mod raw_detection;
pub mod recognition_report;
pub mod thali_summary;

pub use canonical_item::*;
pub use meal_analysis::*;
pub use pass_record::*;
pub use quality_report::*;
pub use raw_detection::*;
pub use recognition_report::*;
pub use thali_summary::*;
