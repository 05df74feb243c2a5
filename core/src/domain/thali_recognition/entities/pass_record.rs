use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::thali_recognition::value_objects::PassType;

/// Metadata of one executed detection pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PassRecord {
    pub pass_number: u8,
    pub pass_type: PassType,
    pub success: bool,
    pub items_found: usize,
    pub confidence: u8,
}
