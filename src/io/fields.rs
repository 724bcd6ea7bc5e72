//! Helpers for writing record parsers for contest files.

use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum FieldError {
    #[error("Line is empty, but expected a test case index")]
    MissingIndex,

    #[error("Test case index `{0}` is not a non-negative integer")]
    InvalidIndex(String),

    #[error("Field `{field}` cannot be parsed")]
    InvalidField { field: String },

    #[error("Expected {expected} fields, but found {found}")]
    FieldCount { expected: usize, found: usize },
}

/// Splits an output line into its leading test case index and the remaining text.
///
/// ```
/// use vpwharness::io::fields::split_index;
/// assert_eq!(split_index("3 Alice 100"), Ok((3, "Alice 100")));
/// ```
pub fn split_index(line: &str) -> Result<(usize, &str), FieldError> {
    let line = line.trim();
    let (head, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));

    if head.is_empty() {
        return Err(FieldError::MissingIndex);
    }

    let index = head
        .parse::<usize>()
        .map_err(|_| FieldError::InvalidIndex(head.to_string()))?;

    Ok((index, rest.trim_start()))
}

/// Parses all whitespace separated fields of `text`.
pub fn parse_fields<T: FromStr>(text: &str) -> Result<Vec<T>, FieldError> {
    text.split_whitespace()
        .map(|field| {
            field.parse().map_err(|_| FieldError::InvalidField {
                field: field.to_string(),
            })
        })
        .collect()
}

/// Splits `text` into exactly `N` whitespace separated fields.
pub fn split_exact<const N: usize>(text: &str) -> Result<[&str; N], FieldError> {
    let fields: Vec<_> = text.split_whitespace().collect();
    let found = fields.len();

    fields
        .try_into()
        .map_err(|_| FieldError::FieldCount { expected: N, found })
}
