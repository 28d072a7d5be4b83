//! Prompt and response schema for categorization requests

use serde_json::{json, Value};

/// Placeholder used when no categories exist yet
pub const NO_CATEGORIES: &str = "None";

/// Build the system instruction for a classification call
pub fn system_instruction(existing_categories: &[String]) -> String {
    let current = if existing_categories.is_empty() {
        NO_CATEGORIES.to_string()
    } else {
        existing_categories.join(", ")
    };

    format!(
        "You are a categorization engine for audience responses.\n\
         Your task is to classify one open-ended answer submitted during a presentation.\n\
         \n\
         Current existing categories are: {current}.\n\
         \n\
         RULES:\n\
         1. If the answer strongly aligns with an EXISTING category, use that category name exactly.\n\
         2. If the answer represents a NEW, distinct topic, create a CONCISE (2-4 word) and descriptive new category name.\n\
         3. You MUST return your response in the specified JSON format.\n\
         4. Set 'is_new' to true only if you propose a new category name."
    )
}

/// Build the user turn carrying the answer
pub fn user_query(answer: &str) -> String {
    format!("User's response: '{}'. Classify this response.", answer)
}

/// JSON schema the model must answer with
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "category_name": {
                "type": "STRING",
                "description": "The determined category name for the response."
            },
            "is_new": {
                "type": "BOOLEAN",
                "description": "True if category_name is a new category, false if it is an existing one."
            }
        },
        "required": ["category_name", "is_new"]
    })
}

/// Full `generateContent` request body
pub fn generate_request(answer: &str, existing_categories: &[String]) -> Value {
    json!({
        "contents": [{ "parts": [{ "text": user_query(answer) }] }],
        "systemInstruction": { "parts": [{ "text": system_instruction(existing_categories) }] },
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": response_schema()
        }
    })
}
