//! Function-calling schema that shapes the model's output.

use crate::analysis::MentalState;
use crate::constants::{
    ANALYSIS_TOOL_NAME, MAX_RECOMMENDATIONS, MIN_RECOMMENDATIONS, MOOD_SCORE_MAX, MOOD_SCORE_MIN,
};
use serde_json::{json, Value};

/// The single tool offered to the model.
pub fn analysis_tool() -> Value {
    let states: Vec<&str> = MentalState::ALL.iter().map(|s| s.as_str()).collect();

    json!({
        "type": "function",
        "function": {
            "name": ANALYSIS_TOOL_NAME,
            "description": "Analyze the mental state from journal entry",
            "parameters": {
                "type": "object",
                "properties": {
                    "mood_score": {
                        "type": "number",
                        "minimum": MOOD_SCORE_MIN,
                        "maximum": MOOD_SCORE_MAX,
                        "description": "Mood score from 0-100"
                    },
                    "mental_state": {
                        "type": "string",
                        "enum": states
                    },
                    "suggestions": {
                        "type": "array",
                        "items": { "type": "string" },
                        "minItems": MIN_RECOMMENDATIONS,
                        "maxItems": MAX_RECOMMENDATIONS,
                        "description": "Self-improvement suggestions"
                    },
                    "habits": {
                        "type": "array",
                        "items": { "type": "string" },
                        "minItems": MIN_RECOMMENDATIONS,
                        "maxItems": MAX_RECOMMENDATIONS,
                        "description": "Daily habits and micro-tasks"
                    },
                    "breathing_prompt": {
                        "type": "string",
                        "description": "Breathing or meditation guidance"
                    }
                },
                "required": ["mood_score", "mental_state", "suggestions", "habits", "breathing_prompt"],
                "additionalProperties": false
            }
        }
    })
}

/// Forces the model to call [`analysis_tool`].
pub fn forced_tool_choice() -> Value {
    json!({
        "type": "function",
        "function": { "name": ANALYSIS_TOOL_NAME }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_requires_all_five_fields() {
        let tool = analysis_tool();
        let required = tool["function"]["parameters"]["required"]
            .as_array()
            .unwrap();
        let required: Vec<&str> = required.iter().map(|v| v.as_str().unwrap()).collect();
        assert_eq!(
            required,
            vec!["mood_score", "mental_state", "suggestions", "habits", "breathing_prompt"]
        );
    }

    #[test]
    fn test_schema_disallows_additional_properties() {
        let tool = analysis_tool();
        assert_eq!(
            tool["function"]["parameters"]["additionalProperties"],
            Value::Bool(false)
        );
    }

    #[test]
    fn test_schema_enum_is_closed_set() {
        let tool = analysis_tool();
        let states = tool["function"]["parameters"]["properties"]["mental_state"]["enum"]
            .as_array()
            .unwrap();
        assert_eq!(states.len(), 10);
        assert!(states.contains(&json!("peaceful")));
        assert!(states.contains(&json!("overwhelmed")));
    }

    #[test]
    fn test_tool_choice_names_the_tool() {
        let tool = analysis_tool();
        let choice = forced_tool_choice();
        assert_eq!(choice["function"]["name"], tool["function"]["name"]);
        assert_eq!(choice["type"], "function");
    }
}
