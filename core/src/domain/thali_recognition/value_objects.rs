use std::sync::LazyLock;

use base64::{Engine as _, engine::general_purpose};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{
    common::entities::app_errors::CoreError,
    thali_recognition::entities::{CanonicalItem, MealAnalysis, RecognitionReport},
};

const DEFAULT_IMAGE_MIME_TYPE: &str = "image/jpeg";

static DATA_URL_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^data:(image/[a-zA-Z0-9.+-]+);base64,").expect("data url pattern is valid")
});

/// Dish category as reported by the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    MainDish,
    Rice,
    Bread,
    Dal,
    Vegetable,
    Sides,
    Beverage,
    Dessert,
    Unknown,
}

impl Category {
    /// Lenient mapping from detector labels. Anything unrecognised lands in
    /// [`Category::Unknown`].
    pub fn parse(label: &str) -> Self {
        let normalized = label.trim().to_lowercase().replace([' ', '-'], "_");

        match normalized.as_str() {
            "main_dish" | "main" | "main_course" | "curry" => Category::MainDish,
            "rice" => Category::Rice,
            "bread" | "breads" => Category::Bread,
            "dal" | "lentils" | "dal_lentils" => Category::Dal,
            "vegetable" | "vegetables" | "sabzi" => Category::Vegetable,
            "sides" | "side" | "side_dish" | "condiment" | "condiments" => Category::Sides,
            "beverage" | "beverages" | "drink" => Category::Beverage,
            "dessert" | "sweet" | "desserts" => Category::Dessert,
            _ => Category::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::MainDish => "main_dish",
            Category::Rice => "rice",
            Category::Bread => "bread",
            Category::Dal => "dal",
            Category::Vegetable => "vegetable",
            Category::Sides => "sides",
            Category::Beverage => "beverage",
            Category::Dessert => "dessert",
            Category::Unknown => "unknown",
        }
    }

    /// Base price range in INR before name-based multipliers.
    pub fn base_price(&self) -> (u32, u32) {
        match self {
            Category::MainDish => (80, 150),
            Category::Rice => (40, 80),
            Category::Bread => (15, 40),
            Category::Dal => (60, 100),
            Category::Vegetable => (70, 120),
            Category::Sides => (20, 50),
            Category::Beverage => (30, 80),
            Category::Dessert | Category::Unknown => (50, 100),
        }
    }

    pub fn calories_per_unit(&self) -> u32 {
        match self {
            Category::MainDish => 200,
            Category::Rice => 150,
            Category::Bread => 80,
            Category::Dal => 120,
            Category::Vegetable => 100,
            Category::Sides => 50,
            Category::Beverage | Category::Dessert | Category::Unknown => 100,
        }
    }

    pub fn is_carb(&self) -> bool {
        matches!(self, Category::Rice | Category::Bread)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Dietary {
    Vegetarian,
    NonVegetarian,
    Vegan,
    Unknown,
}

impl Dietary {
    pub fn parse(label: &str) -> Self {
        let normalized = label.trim().to_lowercase().replace([' ', '_'], "-");

        match normalized.as_str() {
            "vegetarian" | "veg" => Dietary::Vegetarian,
            "non-vegetarian" | "non-veg" | "nonveg" => Dietary::NonVegetarian,
            "vegan" => Dietary::Vegan,
            _ => Dietary::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Portion {
    Small,
    Medium,
    Large,
}

impl Portion {
    /// Unrecognised sizes fall back to [`Portion::Medium`].
    pub fn parse(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "small" => Portion::Small,
            "large" => Portion::Large,
            _ => Portion::Medium,
        }
    }
}

/// Scan strategy of a single detection pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PassType {
    Comprehensive,
    FocusedCategories,
    DetailVerification,
    MissedItems,
}

impl PassType {
    pub fn pass_number(&self) -> u8 {
        match self {
            PassType::Comprehensive => 1,
            PassType::FocusedCategories => 2,
            PassType::DetailVerification => 3,
            PassType::MissedItems => 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PassType::Comprehensive => "comprehensive",
            PassType::FocusedCategories => "focused_categories",
            PassType::DetailVerification => "detail_verification",
            PassType::MissedItems => "missed_items",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PriceRange {
    pub min: u32,
    pub max: u32,
    pub currency: String,
}

impl PriceRange {
    pub fn inr(min: u32, max: u32) -> Self {
        Self {
            min,
            max,
            currency: "INR".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ValueRating {
    Budget,
    Moderate,
    Premium,
}

impl ValueRating {
    pub fn from_total_price(total: u32) -> Self {
        if total < 200 {
            ValueRating::Budget
        } else if total < 400 {
            ValueRating::Moderate
        } else {
            ValueRating::Premium
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DetectionQuality {
    Comprehensive,
    Standard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RecommendedAction {
    ManualReview,
    AutoApprove,
    UserVerify,
}

/// Decoded plate photo handed to the detector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThaliImage {
    pub mime_type: String,
    pub data: Bytes,
}

impl ThaliImage {
    /// Accepts either a `data:image/<fmt>;base64,` URL or bare base64.
    pub fn from_payload(payload: &str) -> Result<Self, CoreError> {
        let payload = payload.trim();
        if payload.is_empty() {
            return Err(CoreError::MissingImage);
        }

        let (mime_type, encoded) = match DATA_URL_PREFIX.captures(payload) {
            Some(captures) => {
                let prefix_len = captures.get(0).map_or(0, |m| m.end());
                (captures[1].to_string(), &payload[prefix_len..])
            }
            None => (DEFAULT_IMAGE_MIME_TYPE.to_string(), payload),
        };

        let data = general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| CoreError::InvalidImage(format!("image is not valid base64: {}", e)))?;

        if data.is_empty() {
            return Err(CoreError::InvalidImage("decoded image is empty".to_string()));
        }

        Ok(Self {
            mime_type,
            data: Bytes::from(data),
        })
    }

    pub fn to_base64(&self) -> String {
        general_purpose::STANDARD.encode(&self.data)
    }
}

#[derive(Debug, Clone)]
pub struct RecognizeThaliInput {
    pub image: String,
    /// Accepted for compatibility; the pass schedule is fixed.
    pub detection_mode: Option<String>,
    /// Accepted for compatibility; the pass schedule is fixed.
    pub max_iterations: Option<u32>,
}

impl RecognizeThaliInput {
    pub fn from_image(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            detection_mode: None,
            max_iterations: None,
        }
    }
}

/// Partial update applied by a reviewer to one detected item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ItemPatch {
    pub dish_name: Option<String>,
    pub standard_name: Option<String>,
    pub category: Option<Category>,
    pub quantity: Option<u32>,
    pub position: Option<String>,
    pub confidence: Option<u8>,
    pub dietary: Option<Dietary>,
    pub estimated_portion: Option<Portion>,
    pub tags: Option<Vec<String>>,
    pub estimated_price: Option<PriceRange>,
}

/// Dish entered by hand during review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NewThaliItem {
    pub dish_name: String,
    pub category: Category,
    pub quantity: u32,
    pub position: Option<String>,
    pub dietary: Dietary,
    pub estimated_portion: Portion,
    pub estimated_price: Option<PriceRange>,
}

/// Payload accepted by the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SaveThaliRequest {
    pub session_owner_id: Uuid,
    pub recognition_data: RecognitionReport,
    pub items: Vec<CanonicalItem>,
    pub thali_analysis: MealAnalysis,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SaveThaliResponse {
    pub success: bool,
    pub saved_items: usize,
}
