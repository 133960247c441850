use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::TurnValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TriggerEntry {
    pub code: &'static str,
    pub triggers: &'static [&'static str],
    pub response: &'static str,
}

impl TriggerEntry {
    /// `lowered` must already be in matching form (see `lexicon::matching_form`).
    pub fn matches(&self, lowered: &str) -> bool {
        self.triggers.iter().any(|trigger| lowered.contains(trigger))
    }
}

/// Wire shape of an inbound turn. `message` stays untyped so a missing or
/// non-string value reaches validation instead of failing deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatTurnRequest {
    #[serde(default)]
    pub message: Value,
}

impl ChatTurnRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Value::String(message.into()),
        }
    }

    pub fn validated_message(&self) -> Result<&str, TurnValidationError> {
        match &self.message {
            Value::Null => Err(TurnValidationError::Missing),
            Value::String(text) => validate_message(text),
            other => Err(TurnValidationError::NotAString {
                found: json_type_name(other),
            }),
        }
    }
}

pub fn validate_message(message: &str) -> Result<&str, TurnValidationError> {
    if message.trim().is_empty() {
        return Err(TurnValidationError::Empty);
    }
    Ok(message)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurnResponse {
    pub reply: String,
}

impl ChatTurnResponse {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnOutcome {
    Crisis,
    Completed,
    EmptyCompletion,
    ProviderFailure,
}

impl TurnOutcome {
    pub fn is_fallback(self) -> bool {
        matches!(self, Self::EmptyCompletion | Self::ProviderFailure)
    }
}

/// Result of classifying a validated message, before any provider call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "route", rename_all = "snake_case")]
pub enum TurnPlan {
    Crisis {
        matched_phrase: &'static str,
    },
    Model {
        detected: Option<&'static TriggerEntry>,
        directive: String,
    },
}

impl TurnPlan {
    pub fn detected_code(&self) -> Option<&'static str> {
        match self {
            Self::Crisis { .. } => None,
            Self::Model { detected, .. } => detected.map(|entry| entry.code),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TurnReport {
    #[serde(flatten)]
    pub response: ChatTurnResponse,
    pub outcome: TurnOutcome,
    pub detected_code: Option<&'static str>,
}

impl TurnReport {
    pub fn new(
        reply: impl Into<String>,
        outcome: TurnOutcome,
        detected_code: Option<&'static str>,
    ) -> Self {
        Self {
            response: ChatTurnResponse::new(reply),
            outcome,
            detected_code,
        }
    }

    pub fn reply(&self) -> &str {
        &self.response.reply
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn validation_rejects_non_strings_and_blanks() {
        let parse = |body: Value| serde_json::from_value::<ChatTurnRequest>(body).unwrap();

        assert_eq!(
            parse(json!({})).validated_message(),
            Err(TurnValidationError::Missing)
        );
        assert_eq!(
            parse(json!({ "message": null })).validated_message(),
            Err(TurnValidationError::Missing)
        );
        assert_eq!(
            parse(json!({ "message": 123 })).validated_message(),
            Err(TurnValidationError::NotAString { found: "number" })
        );
        assert_eq!(
            parse(json!({ "message": "" })).validated_message(),
            Err(TurnValidationError::Empty)
        );
        assert_eq!(
            parse(json!({ "message": " \n\t " })).validated_message(),
            Err(TurnValidationError::Empty)
        );
        assert_eq!(
            parse(json!({ "message": "hello" })).validated_message(),
            Ok("hello")
        );
    }

    #[test]
    fn report_serializes_reply_at_top_level() {
        let report = TurnReport::new("hi", TurnOutcome::Completed, Some("dpdr"));
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["reply"], "hi");
        assert_eq!(value["outcome"], "completed");
        assert_eq!(value["detected_code"], "dpdr");
    }

    #[test]
    fn plan_serializes_with_route_tag() {
        let crisis = serde_json::to_value(TurnPlan::Crisis {
            matched_phrase: "want to die",
        })
        .unwrap();
        assert_eq!(crisis, json!({ "route": "crisis", "matched_phrase": "want to die" }));

        let entry = crate::lexicon::trigger_entry("dpdr").unwrap();
        let model = serde_json::to_value(TurnPlan::Model {
            detected: Some(entry),
            directive: "be present".to_string(),
        })
        .unwrap();
        assert_eq!(model["route"], "model");
        assert_eq!(model["detected"]["code"], "dpdr");
        assert_eq!(model["detected"]["response"], entry.response);
        assert!(model["detected"]["triggers"].is_array());
        assert_eq!(model["directive"], "be present");
    }
}
