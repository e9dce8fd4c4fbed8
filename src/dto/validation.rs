//! Validation helpers for DTOs.

use validator::ValidationError;

use crate::{dto::admin::WordInput, state::match_state::WHEEL_SIZE};

/// Validates that a submitted wheel lists at least one row per letter.
///
/// Blank rows are counted here; the engine later rejects wheels that do not
/// hold enough rows with both a word and a definition.
///
/// # Examples
///
/// ```ignore
/// validate_wheel_rows(&rows_27) // Ok
/// validate_wheel_rows(&rows_26) // Err - too short
/// ```
pub fn validate_wheel_rows(rows: &[WordInput]) -> Result<(), ValidationError> {
    if rows.len() < WHEEL_SIZE {
        let mut err = ValidationError::new("wheel_length");
        err.message = Some(
            format!(
                "Each wheel needs at least {WHEEL_SIZE} words (got {})",
                rows.len()
            )
            .into(),
        );
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(count: usize) -> Vec<WordInput> {
        (0..count)
            .map(|index| WordInput {
                word: format!("word{index}"),
                definition: "clue".into(),
                kind: None,
            })
            .collect()
    }

    #[test]
    fn test_validate_wheel_rows_valid() {
        assert!(validate_wheel_rows(&rows(27)).is_ok());
        assert!(validate_wheel_rows(&rows(40)).is_ok());
    }

    #[test]
    fn test_validate_wheel_rows_too_short() {
        let err = validate_wheel_rows(&rows(26)).unwrap_err();
        assert_eq!(err.code, "wheel_length");
        assert!(validate_wheel_rows(&[]).is_err());
    }
}
