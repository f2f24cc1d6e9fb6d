//! Field-level validation shared by the domain drafts.

use serde_json::json;

use super::Error;

/// A single field failing validation before any write happens.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Required text was empty once trimmed.
    #[error("{field} must not be blank")]
    Blank {
        /// Offending field, in wire casing.
        field: &'static str,
    },
    /// Text exceeded its character limit.
    #[error("{field} must be at most {max} characters")]
    TooLong {
        /// Offending field, in wire casing.
        field: &'static str,
        /// Maximum permitted length in characters.
        max: usize,
    },
    /// A list that needs at least one entry was empty.
    #[error("{field} must contain at least one entry")]
    Empty {
        /// Offending field, in wire casing.
        field: &'static str,
    },
    /// A number fell outside its permitted range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        /// Offending field, in wire casing.
        field: &'static str,
        /// Inclusive lower bound.
        min: i64,
        /// Inclusive upper bound.
        max: i64,
    },
    /// The value is malformed in a field-specific way.
    #[error("{field} is invalid: {reason}")]
    Invalid {
        /// Offending field, in wire casing.
        field: &'static str,
        /// Human-readable explanation.
        reason: String,
    },
}

impl ValidationError {
    /// Field that failed validation.
    pub const fn field(&self) -> &'static str {
        match self {
            Self::Blank { field }
            | Self::TooLong { field, .. }
            | Self::Empty { field }
            | Self::OutOfRange { field, .. }
            | Self::Invalid { field, .. } => field,
        }
    }

    const fn code(&self) -> &'static str {
        match self {
            Self::Blank { .. } => "blank",
            Self::TooLong { .. } => "too_long",
            Self::Empty { .. } => "empty",
            Self::OutOfRange { .. } => "out_of_range",
            Self::Invalid { .. } => "invalid",
        }
    }
}

impl From<ValidationError> for Error {
    fn from(value: ValidationError) -> Self {
        Error::invalid_request(value.to_string())
            .with_details(json!({ "field": value.field(), "code": value.code() }))
    }
}

/// Trim `value` and require it to be non-blank and at most `max` characters.
pub(crate) fn required_text(
    field: &'static str,
    value: &str,
    max: usize,
) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Blank { field });
    }
    if trimmed.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(trimmed.to_owned())
}

/// Trim optional text, collapsing blank input to `None`.
pub(crate) fn optional_text(
    field: &'static str,
    value: Option<&str>,
    max: usize,
) -> Result<Option<String>, ValidationError> {
    match value.map(str::trim).filter(|text| !text.is_empty()) {
        Some(text) => required_text(field, text, max).map(Some),
        None => Ok(None),
    }
}
