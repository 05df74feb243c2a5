use crate::domain::thali_recognition::{
    entities::{
        CanonicalItem, MealAnalysis, MealCompleteness, NutritionalInfo, PricingInfo,
    },
    quality::completeness_score,
    value_objects::{Category, PriceRange, ValueRating},
};

/// Canonical names and the variants that map onto them. The first entry with
/// a variant contained in the dish name wins.
const STANDARD_NAMES: &[(&str, &[&str])] = &[
    ("dal", &["dal tadka", "yellow dal", "toor dal", "moong dal"]),
    ("rajma", &["rajma curry", "kidney beans", "rajma masala"]),
    ("roti", &["chapati", "phulka", "wheat bread"]),
    ("rice", &["steamed rice", "plain rice", "white rice"]),
    ("jeera rice", &["cumin rice", "zeera rice"]),
];

/// Keyword triggers and the tags they add.
const TAG_RULES: &[(&[&str], &[&str])] = &[
    (&["paneer"], &["paneer", "dairy"]),
    (&["chicken"], &["chicken", "non-veg"]),
    (&["dal", "lentil"], &["lentils", "protein"]),
    (&["rice"], &["rice", "grain"]),
    (&["roti", "naan"], &["bread", "wheat"]),
    (&["fried"], &["fried"]),
    (&["curry"], &["gravy", "curry"]),
    (&["dry"], &["dry"]),
];

/// Price multipliers in priority order; only the first matching rule applies.
const PRICE_MULTIPLIERS: &[(&[&str], f64)] = &[
    (&["basic", "simple"], 0.8),
    (&["special", "premium"], 1.5),
    (&["paneer", "chicken"], 1.3),
];

const MEAL_TYPE: &str = "lunch";
const CUISINE_STYLE: &str = "North Indian";

pub fn standardize_dish_name(dish_name: &str) -> String {
    let dish_lower = dish_name.trim().to_lowercase();

    STANDARD_NAMES
        .iter()
        .find(|(_, variants)| variants.iter().any(|v| dish_lower.contains(v)))
        .map(|(standard, _)| standard.to_string())
        .unwrap_or(dish_lower)
}

/// Searchable tags: the category first, then keyword tags without repeats.
pub fn generate_tags(dish_name: &str, category: Category) -> Vec<String> {
    let dish_lower = dish_name.to_lowercase();
    let mut tags = vec![category.as_str().to_string()];

    for (keywords, rule_tags) in TAG_RULES {
        if keywords.iter().any(|k| dish_lower.contains(k)) {
            for tag in rule_tags.iter() {
                if !tags.iter().any(|t| t == tag) {
                    tags.push(tag.to_string());
                }
            }
        }
    }

    tags
}

pub fn estimate_price(dish_name: &str, category: Category) -> PriceRange {
    let dish_lower = dish_name.to_lowercase();
    let (min, max) = category.base_price();

    let multiplier = PRICE_MULTIPLIERS
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| dish_lower.contains(k)))
        .map_or(1.0, |(_, m)| *m);

    PriceRange::inr(
        (f64::from(min) * multiplier).round() as u32,
        (f64::from(max) * multiplier).round() as u32,
    )
}

/// Fills the derived fields of a canonical item from its current name.
pub fn enrich_item(mut item: CanonicalItem) -> CanonicalItem {
    item.standard_name = standardize_dish_name(&item.dish_name);
    item.tags = generate_tags(&item.dish_name, item.category);
    item.estimated_price = estimate_price(&item.dish_name, item.category);
    item
}

pub fn enrich_items(items: Vec<CanonicalItem>) -> Vec<CanonicalItem> {
    items.into_iter().map(enrich_item).collect()
}

pub fn estimated_calories(items: &[CanonicalItem]) -> u32 {
    items
        .iter()
        .map(|item| item.category.calories_per_unit().saturating_mul(item.quantity))
        .fold(0, u32::saturating_add)
}

/// Lower-bound plate price: minimum estimate times quantity.
pub fn estimated_total_price(items: &[CanonicalItem]) -> u32 {
    items
        .iter()
        .map(|item| item.estimated_price.min.saturating_mul(item.quantity))
        .fold(0, u32::saturating_add)
}

pub fn analyze_meal(items: &[CanonicalItem]) -> MealAnalysis {
    let is_protein = |item: &&CanonicalItem| item.has_tag("protein") || item.category == Category::Dal;

    let total_price = estimated_total_price(items);
    let price_per_item_avg = if items.is_empty() {
        0
    } else {
        (f64::from(total_price) / items.len() as f64).round() as u32
    };

    MealAnalysis {
        meal_type: MEAL_TYPE.to_string(),
        cuisine_style: CUISINE_STYLE.to_string(),
        is_complete_meal: true,
        nutritional_info: NutritionalInfo {
            estimated_calories: estimated_calories(items),
            protein_sources: items.iter().filter(is_protein).count(),
            vegetable_count: items
                .iter()
                .filter(|i| matches!(i.category, Category::Vegetable | Category::Sides))
                .count(),
            carb_sources: items.iter().filter(|i| i.category.is_carb()).count(),
        },
        pricing_info: PricingInfo {
            estimated_total_price: total_price,
            price_per_item_avg,
            value_rating: ValueRating::from_total_price(total_price),
        },
        meal_completeness: MealCompleteness {
            has_protein: items.iter().any(|i| is_protein(&i)),
            has_carbs: items.iter().any(|i| i.category.is_carb()),
            has_vegetables: items.iter().any(|i| i.category == Category::Vegetable),
            has_dairy: items.iter().any(|i| i.has_tag("dairy")),
            completeness_score: completeness_score(items),
        },
    }
}
