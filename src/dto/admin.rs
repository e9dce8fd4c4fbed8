//! DTO definitions used by the admin REST API and the admin WebSocket actions.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dto::validation::validate_wheel_rows,
    state::match_state::{WordEntry, WordKind},
};

/// Payload creating a new match from one word list per team.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateMatchRequest {
    #[validate(custom(function = "validate_wheel_rows"))]
    pub wheel1: Vec<WordInput>,
    #[validate(custom(function = "validate_wheel_rows"))]
    pub wheel2: Vec<WordInput>,
}

/// One row of a submitted word list, assigned to letters in order.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WordInput {
    pub word: String,
    pub definition: String,
    /// `starts-with` (default, alias `starts`) or `contains`.
    #[serde(default, rename = "type")]
    pub kind: Option<WordKind>,
}

impl From<WordInput> for WordEntry {
    fn from(value: WordInput) -> Self {
        Self {
            word: value.word,
            definition: value.definition,
            kind: value.kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use validator::Validate;

    use super::*;
    use crate::state::match_state::WHEEL_SIZE;

    fn rows(count: usize) -> Vec<WordInput> {
        (0..count)
            .map(|index| WordInput {
                word: format!("palabra{index}"),
                definition: "pista".into(),
                kind: Some(WordKind::Contains),
            })
            .collect()
    }

    #[test]
    fn full_wheels_pass_validation() {
        let request = CreateMatchRequest {
            wheel1: rows(WHEEL_SIZE),
            wheel2: rows(WHEEL_SIZE + 3),
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn short_wheel_is_reported_by_field() {
        let request = CreateMatchRequest {
            wheel1: rows(WHEEL_SIZE),
            wheel2: rows(4),
        };

        let errors = request.validate().unwrap_err();

        assert!(errors.field_errors().contains_key("wheel2"));
        assert!(!errors.field_errors().contains_key("wheel1"));
    }

    #[test]
    fn word_input_keeps_type_field_on_the_wire() {
        let value = serde_json::to_value(&rows(1)[0]).unwrap();
        assert_eq!(value["type"], "contains");
    }
}
