use serde_json::json;

/// Returns the JSON schema the detector is asked to answer with
pub fn get_detection_response_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "detection_confidence": { "type": "number" },
            "items": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "dish_name": { "type": "string" },
                        "category": {
                            "type": "string",
                            "enum": [
                                "main_dish", "rice", "bread", "dal",
                                "vegetable", "sides", "beverage", "dessert"
                            ]
                        },
                        "quantity": { "type": "integer" },
                        "position": { "type": "string" },
                        "confidence": { "type": "number" },
                        "dietary": {
                            "type": "string",
                            "enum": ["vegetarian", "non-vegetarian", "vegan"]
                        },
                        "estimated_portion": {
                            "type": "string",
                            "enum": ["small", "medium", "large"]
                        }
                    },
                    "required": ["dish_name", "category", "quantity", "confidence"]
                }
            }
        },
        "required": ["detection_confidence", "items"]
    })
}
