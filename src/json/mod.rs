//! JSON document validation against JSON Schema files
//!
//! # Example
//!
//! ```rust,no_run
//! use validation_tool::json::JsonValidator;
//! use serde_json::json;
//!
//! let validator = JsonValidator::new();
//! validator.validate_json(&json!({"name": "Ada"}), "schemas/person.json", false)?;
//! # Ok::<(), validation_tool::ValidatorError>(())
//! ```

pub mod cache;
pub mod engine;

pub use cache::{CacheStats, SchemaCache};
pub use engine::{JsonSchemaEngine, SchemaEngine, best_match};

use crate::error::{Result, ValidatorError};
use crate::logging::validation_span;
use serde_json::Value;

/// Validates JSON values against schema files, caching parsed schemas by path.
pub struct JsonValidator<E = JsonSchemaEngine> {
    cache: SchemaCache,
    engine: E,
}

impl JsonValidator<JsonSchemaEngine> {
    pub fn new() -> Self {
        Self::with_engine(JsonSchemaEngine::new())
    }
}

impl Default for JsonValidator<JsonSchemaEngine> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: SchemaEngine> JsonValidator<E> {
    pub fn with_engine(engine: E) -> Self {
        Self {
            cache: SchemaCache::new(),
            engine,
        }
    }

    /// Validate `data` against the schema stored at `schema_path`.
    ///
    /// The schema file is read on first use and whenever `force_reload` is set;
    /// otherwise the cached copy is reused.
    ///
    /// # Errors
    /// - [`ValidatorError::Io`] / [`ValidatorError::SchemaDecode`] when the file
    ///   cannot be read or is not JSON
    /// - [`ValidatorError::InvalidSchema`] when the schema fails its meta-schema
    /// - [`ValidatorError::Validation`] when `data` does not conform; its
    ///   `source()` is the best-matching violation
    pub fn validate_json(
        &self,
        data: &Value,
        schema_path: &str,
        force_reload: bool,
    ) -> Result<bool> {
        let _span = validation_span("json", schema_path).entered();
        let schema = self.cache.get_or_load(schema_path, force_reload)?;

        self.engine
            .check_schema(&schema)
            .map_err(|source| ValidatorError::InvalidSchema {
                path: schema_path.to_string(),
                source,
            })?;

        match self.engine.evaluate(&schema, data) {
            Ok(()) => {
                tracing::info!(schema_path, "JSON is valid");
                Ok(true)
            }
            Err(violation) => {
                tracing::error!(schema_path, error = %violation, "JSON validation error");
                Err(ValidatorError::validation_caused_by(
                    format!("JSON validation error: {violation}"),
                    violation,
                ))
            }
        }
    }

    pub fn cache(&self) -> &SchemaCache {
        &self.cache
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Drop every cached schema so the next call re-reads from disk.
    pub fn reset_cache(&self) {
        self.cache.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SchemaViolation;
    use assert_matches::assert_matches;
    use parking_lot::Mutex;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Records what it was asked to evaluate and answers with a canned outcome.
    #[derive(Default)]
    struct RecordingEngine {
        calls: Mutex<Vec<(Value, Value)>>,
        reject: Option<SchemaViolation>,
    }

    impl SchemaEngine for RecordingEngine {
        fn check_schema(&self, _schema: &Value) -> std::result::Result<(), SchemaViolation> {
            Ok(())
        }

        fn evaluate(
            &self,
            schema: &Value,
            instance: &Value,
        ) -> std::result::Result<(), SchemaViolation> {
            self.calls.lock().push((instance.clone(), schema.clone()));
            match &self.reject {
                Some(violation) => Err(violation.clone()),
                None => Ok(()),
            }
        }
    }

    fn schema_file(contents: &str) -> (NamedTempFile, String) {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        let path = file.path().to_str().unwrap().to_string();
        (file, path)
    }

    #[test]
    fn test_engine_receives_instance_and_cached_schema() {
        let (_file, path) = schema_file("{}");
        let validator = JsonValidator::with_engine(RecordingEngine::default());

        assert!(validator.validate_json(&json!({}), &path, false).unwrap());

        let calls = validator.engine().calls.lock();
        assert_eq!(calls.as_slice(), &[(json!({}), json!({}))]);
    }

    #[test]
    fn test_engine_rejection_becomes_validation_error() {
        let (_file, path) = schema_file("{}");
        let validator = JsonValidator::with_engine(RecordingEngine {
            reject: Some(SchemaViolation::new("Invalid")),
            ..Default::default()
        });

        let err = validator.validate_json(&json!({}), &path, false).unwrap_err();
        assert_matches!(err, ValidatorError::Validation { source: Some(_), .. });
    }

    #[test]
    fn test_reset_cache_forces_reload() {
        let (_file, path) = schema_file("{}");
        let validator = JsonValidator::new();
        validator.validate_json(&json!(1), &path, false).unwrap();
        validator.validate_json(&json!(2), &path, false).unwrap();
        assert_eq!(validator.cache().stats().loads, 1);

        validator.reset_cache();
        validator.validate_json(&json!(3), &path, false).unwrap();
        assert_eq!(validator.cache().stats().loads, 1);
        assert_eq!(validator.cache().stats().hits, 0);
    }
}
