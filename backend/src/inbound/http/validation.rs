//! Request-shape validation shared by the HTTP handlers.
//!
//! Field-level business validation lives in the domain; this module only
//! turns malformed path segments and query strings into `invalid_request`
//! errors with a stable `details` payload.

use std::str::FromStr;

use serde_json::json;

use crate::domain::{Error, IdValidationError, ParseVocabularyError};

/// Validation error codes for malformed request parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    InvalidUuid,
    UnknownValue,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            Self::InvalidUuid => "invalid_uuid",
            Self::UnknownValue => "unknown_value",
        }
    }
}

/// Wire name of the offending request field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

fn invalid_value(field: FieldName, code: ErrorCode, message: String, value: &str) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "value": value,
        "code": code.as_str(),
    }))
}

/// Parse a path or query identifier.
pub(crate) fn parse_id<T>(raw: &str, field: FieldName) -> Result<T, Error>
where
    T: FromStr<Err = IdValidationError>,
{
    raw.parse::<T>().map_err(|err| {
        invalid_value(field, ErrorCode::InvalidUuid, err.to_string(), raw)
    })
}

/// Parse one closed-vocabulary value.
pub(crate) fn parse_choice<T>(raw: &str, field: FieldName) -> Result<T, Error>
where
    T: FromStr<Err = ParseVocabularyError>,
{
    raw.parse::<T>().map_err(|err| {
        invalid_value(field, ErrorCode::UnknownValue, err.to_string(), raw)
    })
}

/// Parse a comma-separated list of vocabulary values.
///
/// Empty segments are skipped so `species=dog,` behaves like `species=dog`.
pub(crate) fn parse_choice_list<T>(raw: Option<&str>, field: FieldName) -> Result<Vec<T>, Error>
where
    T: FromStr<Err = ParseVocabularyError>,
{
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    raw.split(',')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .enumerate()
        .map(|(index, segment)| {
            segment.parse::<T>().map_err(|err| {
                Error::invalid_request(err.to_string()).with_details(json!({
                    "field": field.as_str(),
                    "index": index,
                    "value": segment,
                    "code": ErrorCode::UnknownValue.as_str(),
                }))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ErrorCode as DomainCode, PetId, Species};
    use rstest::rstest;

    #[rstest]
    fn bad_ids_report_the_field_and_value() {
        let err = parse_id::<PetId>("rex", FieldName::new("id")).expect_err("not a uuid");
        assert_eq!(err.code(), DomainCode::InvalidRequest);
        assert_eq!(
            err.details(),
            Some(&json!({ "field": "id", "value": "rex", "code": "invalid_uuid" }))
        );
    }

    #[rstest]
    #[case(None, vec![])]
    #[case(Some(""), vec![])]
    #[case(Some("dog"), vec![Species::Dog])]
    #[case(Some("dog, cat,"), vec![Species::Dog, Species::Cat])]
    fn lists_split_on_commas(#[case] raw: Option<&str>, #[case] expected: Vec<Species>) {
        let parsed: Vec<Species> =
            parse_choice_list(raw, FieldName::new("species")).expect("valid list");
        assert_eq!(parsed, expected);
    }

    #[rstest]
    fn unknown_list_entries_carry_their_index() {
        let err = parse_choice_list::<Species>(Some("dog,dragon"), FieldName::new("species"))
            .expect_err("dragon is not a species");
        assert_eq!(
            err.details(),
            Some(&json!({
                "field": "species",
                "index": 1,
                "value": "dragon",
                "code": "unknown_value",
            }))
        );
    }
}
