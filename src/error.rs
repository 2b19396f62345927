//! Contains the errors returned by Marksheet.
//!
//! Numbering and scoring never fail. Errors only happen at the serialization boundary, when a test
//! definition or an answer map is parsed from or written to JSON.

use thiserror::Error;

/// An error returned when loading a test definition.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum TestDefinitionError {
    #[error("cannot parse test definition: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("test definition must be a JSON object, found {0}")]
    NotAnObject(String),
}

/// An error returned when reading or writing an answer map.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum AnswerMapError {
    #[error("cannot parse answer map: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("cannot serialize answer map: {0}")]
    Serialize(#[source] serde_json::Error),
}
