use crate::domain::thali_recognition::value_objects::PassType;

const RESPONSE_FORMAT: &str = r#"Answer with a single JSON object and nothing else:
{
  "detection_confidence": 0-100,
  "items": [
    {
      "dish_name": "specific dish name",
      "category": "main_dish | rice | bread | dal | vegetable | sides | beverage | dessert",
      "quantity": 1,
      "position": "top-left | top-center | top-right | center-left | center | center-right | bottom-left | bottom-center | bottom-right",
      "confidence": 0-100,
      "dietary": "vegetarian | non-vegetarian | vegan",
      "estimated_portion": "small | medium | large"
    }
  ]
}"#;

/// Builds the scan-strategy prompt sent to the detector for a pass.
pub fn strategy_prompt(strategy: PassType) -> String {
    let instructions = match strategy {
        PassType::Comprehensive => {
            "Pass 1, comprehensive scan. You are an expert in Indian food. Detect every \
             visible food item on this thali photo.\n\
             - Split the photo into a 3x3 grid and inspect every zone in turn.\n\
             - Look at bowls, katoris, plates, cups and loose items.\n\
             - Count identical pieces: two rotis means quantity 2.\n\
             - Use the most specific dish name you can justify."
        }
        PassType::FocusedCategories => {
            "Pass 2, focused category scan. Re-examine the photo for items a first scan \
             usually misses.\n\
             - Breads: roti, naan, paratha, puri, bhatura. Count each piece.\n\
             - Small sides: pickle, chutney, papad, salad, onion, lemon.\n\
             - Beverages: glasses, cups, bottles.\n\
             - Garnishes: green chilli, coriander, mint.\n\
             - Edges, corners and anything partly hidden behind a larger dish."
        }
        PassType::DetailVerification => {
            "Pass 3, detail verification. Inspect the photo closely for what is left.\n\
             - Tiny accompaniments and items smaller than a coin.\n\
             - Stacked or layered items and the real contents of each container.\n\
             - Liquids such as dal, curry and drinks.\n\
             - Recount every item and correct quantities.\n\
             - Decide whether similar-looking portions are actually different dishes."
        }
        PassType::MissedItems => {
            "Pass 4, missed items recovery. Earlier scans may have missed something.\n\
             - Check the usual thali composition: if rice is present look for dal, if \
             there is a curry look for bread.\n\
             - Use shadows and reflections to find hidden items.\n\
             - Report items that are at least half visible.\n\
             - Confirm every visible container has been identified, including the \
             background and the plate rim."
        }
    };

    format!("{}\n\n{}", instructions, RESPONSE_FORMAT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_strategy_has_distinct_prompt() {
        let prompts: Vec<String> = [
            PassType::Comprehensive,
            PassType::FocusedCategories,
            PassType::DetailVerification,
            PassType::MissedItems,
        ]
        .into_iter()
        .map(strategy_prompt)
        .collect();

        for (i, prompt) in prompts.iter().enumerate() {
            assert!(prompt.contains("detection_confidence"));
            assert!(prompt.starts_with(&format!("Pass {}", i + 1)));
        }
    }
}
