use std::collections::HashSet;

use crate::domain::thali_recognition::{
    entities::{CanonicalItem, DetectionCoverage, PassRecord, QualityReport},
    value_objects::{Category, DetectionQuality, RecommendedAction},
};

pub const HIGH_CONFIDENCE: u8 = 80;
pub const MEDIUM_CONFIDENCE: u8 = 60;
/// Confidence an item needs to count towards auto-approval.
pub const TRUSTED_CONFIDENCE: u8 = 70;
pub const AUTO_APPROVE_RATIO: f64 = 0.8;
pub const MIN_ITEMS_FOR_REVIEWLESS: usize = 3;
pub const COMPREHENSIVE_PASSES: usize = 3;

/// Weighted category coverage of a plate, capped at 100.
pub fn completeness_score(items: &[CanonicalItem]) -> u8 {
    let categories: HashSet<Category> = items.iter().map(|item| item.category).collect();
    let has = |category| categories.contains(&category);

    let mut score: u32 = 0;
    if has(Category::MainDish) || has(Category::Dal) {
        score += 25;
    }
    if has(Category::Rice) {
        score += 20;
    }
    if has(Category::Bread) {
        score += 15;
    }
    if has(Category::Vegetable) {
        score += 20;
    }
    if has(Category::Sides) {
        score += 10;
    }
    if has(Category::Beverage) {
        score += 10;
    }

    score.min(100) as u8
}

pub fn recommended_action(items: &[CanonicalItem]) -> RecommendedAction {
    if items.len() < MIN_ITEMS_FOR_REVIEWLESS {
        return RecommendedAction::ManualReview;
    }

    let trusted = items
        .iter()
        .filter(|item| item.confidence >= TRUSTED_CONFIDENCE)
        .count();

    if trusted as f64 / items.len() as f64 > AUTO_APPROVE_RATIO {
        RecommendedAction::AutoApprove
    } else {
        RecommendedAction::UserVerify
    }
}

/// Scores the consolidated plate. Only passes that returned a usable answer
/// count towards the detection quality.
pub fn assess_quality(items: &[CanonicalItem], passes: &[PassRecord]) -> QualityReport {
    let successful_passes = passes.iter().filter(|p| p.success).count();
    let any_of = |wanted: &[Category]| items.iter().any(|item| wanted.contains(&item.category));

    QualityReport {
        total_items: items.len(),
        high_confidence_items: items
            .iter()
            .filter(|i| i.confidence >= HIGH_CONFIDENCE)
            .count(),
        medium_confidence_items: items
            .iter()
            .filter(|i| (MEDIUM_CONFIDENCE..HIGH_CONFIDENCE).contains(&i.confidence))
            .count(),
        low_confidence_items: items
            .iter()
            .filter(|i| i.confidence < MEDIUM_CONFIDENCE)
            .count(),
        detection_coverage: DetectionCoverage {
            has_main_dish: any_of(&[Category::MainDish, Category::Dal]),
            has_carbs: any_of(&[Category::Rice, Category::Bread]),
            has_vegetables: any_of(&[Category::Vegetable]),
            has_sides: any_of(&[Category::Sides]),
        },
        completeness_score: completeness_score(items),
        detection_quality: if successful_passes >= COMPREHENSIVE_PASSES {
            DetectionQuality::Comprehensive
        } else {
            DetectionQuality::Standard
        },
        recommended_action: recommended_action(items),
    }
}
