//! Error handling for the JSON and RDF validators
//!
//! Every fallible operation in the crate returns [`ValidatorError`]. Callers
//! that only need to tell "the data is wrong" apart from "the inputs are
//! broken" can match on [`ValidatorError::kind`] instead of the variants.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use thiserror::Error;

pub type Result<T, E = ValidatorError> = std::result::Result<T, E>;

// =============================================================================
// ERROR KINDS
// =============================================================================

/// Closed classification of every [`ValidatorError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The instance or data graph does not satisfy its constraints
    Validation,
    /// A schema file, Turtle file or results graph could not be read or decoded
    MalformedInput,
    /// The schema document is not valid under its own dialect
    MalformedSchema,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::MalformedInput => "malformed_input",
            ErrorKind::MalformedSchema => "malformed_schema",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// SCHEMA VIOLATION
// =============================================================================

/// A single constraint violation reported by a [`SchemaEngine`](crate::json::SchemaEngine).
///
/// Owned and engine-independent so it can travel as the `source()` of a
/// [`ValidatorError`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaViolation {
    pub message: String,
    /// JSON pointer into the instance, empty for the root
    pub instance_path: String,
    /// JSON pointer into the schema to the failing keyword
    pub schema_path: String,
}

impl SchemaViolation {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            instance_path: String::new(),
            schema_path: String::new(),
        }
    }

    pub fn at(mut self, instance_path: impl Into<String>, schema_path: impl Into<String>) -> Self {
        self.instance_path = instance_path.into();
        self.schema_path = schema_path.into();
        self
    }
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{} (at {})", self.message, self.instance_path)
        }
    }
}

impl std::error::Error for SchemaViolation {}

// =============================================================================
// VALIDATOR ERROR
// =============================================================================

#[derive(Debug, Error)]
pub enum ValidatorError {
    /// Data does not conform. The message carries the diagnostic payload.
    #[error("{message}")]
    Validation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    },

    #[error("failed to read {location}")]
    Io {
        location: String,
        #[source]
        source: io::Error,
    },

    #[error("schema file {path} is not valid JSON")]
    SchemaDecode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("schema {path} is not a valid JSON Schema")]
    InvalidSchema {
        path: String,
        #[source]
        source: SchemaViolation,
    },

    #[error("failed to parse Turtle from {location}")]
    RdfParse {
        location: String,
        #[source]
        source: oxigraph::io::RdfParseError,
    },

    #[error("failed to serialize validation results graph")]
    Serialize(#[source] io::Error),
}

impl ValidatorError {
    pub fn validation(message: impl Into<String>) -> Self {
        ValidatorError::Validation {
            message: message.into(),
            source: None,
        }
    }

    pub fn validation_caused_by<E>(message: impl Into<String>, cause: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ValidatorError::Validation {
            message: message.into(),
            source: Some(Box::new(cause)),
        }
    }

    pub fn io(location: impl Into<String>, source: io::Error) -> Self {
        ValidatorError::Io {
            location: location.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ValidatorError::Validation { .. } => ErrorKind::Validation,
            ValidatorError::Io { .. }
            | ValidatorError::SchemaDecode { .. }
            | ValidatorError::RdfParse { .. }
            | ValidatorError::Serialize(_) => ErrorKind::MalformedInput,
            ValidatorError::InvalidSchema { .. } => ErrorKind::MalformedSchema,
        }
    }

    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }
}
