//! Deduplication of raw detections into canonical items.
//!
//! Merging is greedy: every detection joins the first existing item, in
//! creation order, whose key is similar enough. The outcome therefore depends
//! on the order detections arrive in, but is deterministic for a fixed order.

use tracing::debug;

use crate::domain::thali_recognition::entities::{CanonicalItem, MAX_ITEM_QUANTITY, RawDetection};

/// Similarity a pair of names must exceed to be treated as the same dish.
pub const SIMILARITY_THRESHOLD: f64 = 0.7;

/// Case-insensitive, trimmed lookup key for a dish name.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Mean of word overlap and character overlap, in `[0, 1]`.
pub fn similarity(a: &str, b: &str) -> f64 {
    (word_overlap(a, b) + char_overlap(a, b)) / 2.0
}

/// Words of either name that contain, or are contained in, a word of the
/// other name, relative to the longer name's word count.
fn word_overlap(a: &str, b: &str) -> f64 {
    let words_a: Vec<&str> = a.split_whitespace().collect();
    let words_b: Vec<&str> = b.split_whitespace().collect();

    if words_a.is_empty() && words_b.is_empty() {
        return 1.0;
    }
    if words_a.is_empty() || words_b.is_empty() {
        return 0.0;
    }

    let shared = matched_words(&words_a, &words_b) + matched_words(&words_b, &words_a);
    let longest = words_a.len().max(words_b.len());

    (shared as f64 / longest as f64).min(1.0)
}

fn matched_words(from: &[&str], to: &[&str]) -> usize {
    from.iter()
        .filter(|word| {
            to.iter()
                .any(|other| word.contains(*other) || other.contains(**word))
        })
        .count()
}

/// Fraction of the shorter name's characters found anywhere in the longer one.
fn char_overlap(a: &str, b: &str) -> f64 {
    let (longer, shorter) = if a.chars().count() > b.chars().count() {
        (a, b)
    } else {
        (b, a)
    };

    let shorter_len = shorter.chars().count();
    if shorter_len == 0 {
        return if longer.is_empty() { 1.0 } else { 0.0 };
    }

    let matches = shorter.chars().filter(|c| longer.contains(*c)).count();
    matches as f64 / shorter_len as f64
}

/// Collapses raw detections, in arrival order, into canonical items with
/// sequential ids starting at 1. Detections with a blank name are dropped.
pub fn consolidate(detections: &[RawDetection]) -> Vec<CanonicalItem> {
    let mut items: Vec<CanonicalItem> = Vec::new();
    let mut keys: Vec<String> = Vec::new();

    for detection in detections {
        let key = normalize_name(&detection.dish_name);
        if key.is_empty() {
            continue;
        }

        let existing = keys
            .iter()
            .position(|existing_key| similarity(existing_key, &key) > SIMILARITY_THRESHOLD);

        match existing {
            Some(index) => {
                debug!(
                    incoming = %detection.dish_name,
                    into = %items[index].dish_name,
                    "merging duplicate detection"
                );
                merge_detection(&mut items[index], detection);
            }
            None => {
                let item_id = items.len() as u32 + 1;
                items.push(CanonicalItem::from_detection(item_id, detection));
                keys.push(key);
            }
        }
    }

    debug!(
        raw = detections.len(),
        unique = items.len(),
        "consolidation complete"
    );

    items
}

fn merge_detection(item: &mut CanonicalItem, detection: &RawDetection) {
    item.quantity = item
        .quantity
        .saturating_add(detection.quantity.unwrap_or(1).max(1))
        .min(MAX_ITEM_QUANTITY);
    item.confidence = item
        .confidence
        .max(detection.confidence.unwrap_or(0).min(100));

    // more words is more specific; ties keep the first name seen
    let incoming_name = detection.dish_name.trim();
    if incoming_name.split_whitespace().count() > item.dish_name.split_whitespace().count() {
        item.dish_name = incoming_name.to_string();
    }

    if let Some(position) = detection
        .position
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        && !item.position.split(", ").any(|known| known == position)
    {
        item.position = format!("{}, {}", item.position, position);
    }
}
