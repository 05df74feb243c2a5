use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::thali_recognition::value_objects::Category;

/// Totals recomputed from the reviewer's current item list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ThaliSummary {
    pub total_items: usize,
    pub categories: Vec<Category>,
    pub estimated_price: u32,
    pub estimated_calories: u32,
    pub dietary_info: DietaryInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DietaryInfo {
    pub vegetarian_items: usize,
    pub non_vegetarian_items: usize,
    pub is_fully_vegetarian: bool,
}
