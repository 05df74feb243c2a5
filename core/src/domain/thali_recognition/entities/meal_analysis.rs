use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::thali_recognition::value_objects::ValueRating;

/// Aggregate nutrition and pricing estimate for a whole plate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MealAnalysis {
    pub meal_type: String,
    pub cuisine_style: String,
    pub is_complete_meal: bool,
    pub nutritional_info: NutritionalInfo,
    pub pricing_info: PricingInfo,
    pub meal_completeness: MealCompleteness,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct NutritionalInfo {
    pub estimated_calories: u32,
    pub protein_sources: usize,
    pub vegetable_count: usize,
    pub carb_sources: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PricingInfo {
    pub estimated_total_price: u32,
    pub price_per_item_avg: u32,
    pub value_rating: ValueRating,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MealCompleteness {
    pub has_protein: bool,
    pub has_carbs: bool,
    pub has_vegetables: bool,
    pub has_dairy: bool,
    pub completeness_score: u8,
}
