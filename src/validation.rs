//! Request validation rules
//!
//! Pure checks run by handlers before any store call, so a rejected request
//! never causes a partial write. Required-field checks report the rule that
//! failed rather than the individual field.

use chrono::{Datelike, Utc};
use serde_json::Value;
use thiserror::Error;

/// Earliest year accepted by any year-like field.
pub const MIN_YEAR: i64 = 1800;

/// How far past the current year a movie release may be dated.
pub const MOVIE_YEAR_LOOKAHEAD: i64 = 5;

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// One or more fields of a rule set were absent or blank.
    #[error("{0} are required")]
    MissingFields(&'static str),
    #[error("{field} must be an integer")]
    NotAnInteger { field: &'static str },
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
    },
    #[error("password must be at least 6 characters")]
    PasswordTooShort,
    #[error("request body must be a JSON object")]
    MalformedBody,
}

pub fn current_year() -> i64 {
    i64::from(Utc::now().year())
}

/// A JSON value counts as missing when it is absent, `null`, `false`, zero,
/// or a blank string.
pub fn is_missing(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Bool(b)) => !b,
        Some(Value::Number(n)) => n.as_f64() == Some(0.0),
        Some(Value::Array(_)) | Some(Value::Object(_)) => false,
    }
}

/// Fail with `rule` unless every value is present.
pub fn require_all(rule: &'static str, values: &[Option<&Value>]) -> Result<(), ValidationError> {
    if values.iter().any(|v| is_missing(*v)) {
        return Err(ValidationError::MissingFields(rule));
    }
    Ok(())
}

/// Read a required text field, trimmed.
pub fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Parse a year-like value, accepting integral JSON numbers and numeric strings.
pub fn parse_integer(field: &'static str, value: &Value) -> Result<i64, ValidationError> {
    let not_integer = ValidationError::NotAnInteger { field };
    match value {
        Value::Number(n) => n.as_i64().ok_or(not_integer),
        Value::String(s) => s.trim().parse().map_err(|_| not_integer),
        _ => Err(not_integer),
    }
}

fn year_in_range(
    field: &'static str,
    value: &Value,
    max: i64,
) -> Result<i64, ValidationError> {
    let year = parse_integer(field, value)?;
    if !(MIN_YEAR..=max).contains(&year) {
        return Err(ValidationError::OutOfRange {
            field,
            min: MIN_YEAR,
            max,
        });
    }
    Ok(year)
}

/// Release year: `1800 ..= current_year + 5`.
pub fn movie_year(value: &Value, current_year: i64) -> Result<i64, ValidationError> {
    year_in_range("year", value, current_year + MOVIE_YEAR_LOOKAHEAD)
}

/// Birth year: `1800 ..= current_year`. Deliberately tighter than [`movie_year`].
pub fn birth_year(value: &Value, current_year: i64) -> Result<i64, ValidationError> {
    year_in_range("birthYear", value, current_year)
}

pub fn password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const NOW: i64 = 2025;

    #[test]
    fn test_missing_values() {
        assert!(is_missing(None));
        assert!(is_missing(Some(&json!(null))));
        assert!(is_missing(Some(&json!(""))));
        assert!(is_missing(Some(&json!("   "))));
        assert!(is_missing(Some(&json!(0))));

        assert!(!is_missing(Some(&json!("X"))));
        assert!(!is_missing(Some(&json!(2000))));
        assert!(!is_missing(Some(&json!("2000"))));
    }

    #[test]
    fn test_require_all_names_the_rule() {
        let title = json!("X");
        let err = require_all("title, director and year", &[Some(&title), None]).unwrap_err();

        assert_eq!(err, ValidationError::MissingFields("title, director and year"));
        assert_eq!(err.to_string(), "title, director and year are required");
        assert!(require_all("title", &[Some(&title)]).is_ok());
    }

    #[test]
    fn test_movie_year_boundaries() {
        assert!(movie_year(&json!(1799), NOW).is_err());
        assert_eq!(movie_year(&json!(1800), NOW), Ok(1800));
        assert_eq!(movie_year(&json!(NOW + 5), NOW), Ok(NOW + 5));
        assert_eq!(
            movie_year(&json!(NOW + 6), NOW),
            Err(ValidationError::OutOfRange {
                field: "year",
                min: 1800,
                max: NOW + 5
            })
        );
    }

    #[test]
    fn test_birth_year_boundaries_are_tighter() {
        assert!(birth_year(&json!(1799), NOW).is_err());
        assert_eq!(birth_year(&json!(NOW), NOW), Ok(NOW));
        assert!(birth_year(&json!(NOW + 1), NOW).is_err());
        // the same value is a valid release year
        assert!(movie_year(&json!(NOW + 1), NOW).is_ok());
    }

    #[test]
    fn test_year_parsing() {
        assert_eq!(movie_year(&json!("1994"), NOW), Ok(1994));
        assert_eq!(movie_year(&json!(" 1994 "), NOW), Ok(1994));
        assert_eq!(
            movie_year(&json!("nineteen"), NOW),
            Err(ValidationError::NotAnInteger { field: "year" })
        );
        assert!(movie_year(&json!(1994.5), NOW).is_err());
        assert!(birth_year(&json!(true), NOW).is_err());
    }

    #[test]
    fn test_text_is_trimmed() {
        assert_eq!(text(Some(&json!("  Heat "))), Some("Heat".to_string()));
        assert_eq!(text(Some(&json!(1917))), Some("1917".to_string()));
        assert_eq!(text(Some(&json!(["a"]))), None);
        assert_eq!(text(None), None);
    }

    #[test]
    fn test_password_length() {
        assert_eq!(password("12345"), Err(ValidationError::PasswordTooShort));
        assert!(password("secret").is_ok());
    }

    #[test]
    fn test_current_year_is_plausible() {
        assert!(current_year() >= 2024);
    }
}
