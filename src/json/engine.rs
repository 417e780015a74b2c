//! JSON Schema evaluation seam
//!
//! [`SchemaEngine`] is the only place the validator touches a JSON Schema
//! implementation. [`JsonSchemaEngine`] backs it with the `jsonschema` crate,
//! which picks the draft from the schema's `$schema` keyword.

use crate::error::SchemaViolation;
use jsonschema::ValidationError;
use jsonschema::error::ValidationErrorKind;
use serde_json::Value;

pub trait SchemaEngine: Send + Sync {
    /// Check the schema document against the meta-schema of its dialect.
    fn check_schema(&self, schema: &Value) -> Result<(), SchemaViolation>;

    /// Evaluate `instance`, returning the single most relevant violation on failure.
    fn evaluate(&self, schema: &Value, instance: &Value) -> Result<(), SchemaViolation>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSchemaEngine;

impl JsonSchemaEngine {
    pub fn new() -> Self {
        Self
    }
}

impl SchemaEngine for JsonSchemaEngine {
    fn check_schema(&self, schema: &Value) -> Result<(), SchemaViolation> {
        match jsonschema::meta::try_validate(schema) {
            Ok(outcome) => outcome.map_err(|error| violation_from(&error)),
            // `$schema` names a dialect with no known meta-schema
            Err(error) => Err(SchemaViolation::new(error.to_string()).at("", "/$schema")),
        }
    }

    fn evaluate(&self, schema: &Value, instance: &Value) -> Result<(), SchemaViolation> {
        let validator =
            jsonschema::validator_for(schema).map_err(|error| violation_from(&error))?;

        match best_match(validator.iter_errors(instance)) {
            Some(error) => Err(violation_from(&error)),
            None => Ok(()),
        }
    }
}

fn violation_from(error: &ValidationError<'_>) -> SchemaViolation {
    SchemaViolation::new(error.to_string())
        .at(error.instance_path.to_string(), error.schema_path.to_string())
}

/// Pick the most relevant error out of everything the evaluator reported.
///
/// Errors raised by `anyOf`/`oneOf` only say that no branch matched, so any
/// other error outranks them. Among the rest the shallowest instance location
/// wins; ties keep evaluation order.
pub fn best_match<'i>(
    errors: impl Iterator<Item = ValidationError<'i>>,
) -> Option<ValidationError<'i>> {
    errors
        .enumerate()
        .min_by_key(|(index, error)| {
            let weak = is_weak(&error.kind);
            let depth = pointer_depth(&error.instance_path.to_string());
            (weak, depth, *index)
        })
        .map(|(_, error)| error)
}

fn is_weak(kind: &ValidationErrorKind) -> bool {
    matches!(
        kind,
        ValidationErrorKind::AnyOf { .. }
            | ValidationErrorKind::OneOfNotValid { .. }
            | ValidationErrorKind::OneOfMultipleValid { .. }
    )
}

fn pointer_depth(pointer: &str) -> usize {
    pointer.split('/').filter(|segment| !segment.is_empty()).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_schema_accepts_anything() {
        let engine = JsonSchemaEngine::new();
        assert!(engine.check_schema(&json!({})).is_ok());
        assert!(engine.evaluate(&json!({}), &json!({})).is_ok());
        assert!(engine.evaluate(&json!({}), &json!([1, "two", null])).is_ok());
    }

    #[test]
    fn test_type_mismatch_reports_location() {
        let engine = JsonSchemaEngine::new();
        let schema = json!({
            "type": "object",
            "properties": { "name": { "type": "string" } }
        });

        let violation = engine
            .evaluate(&schema, &json!({ "name": 42 }))
            .unwrap_err();
        assert_eq!(violation.instance_path, "/name");
        assert!(violation.schema_path.ends_with("/type"));
    }

    #[test]
    fn test_check_schema_rejects_bad_keyword_value() {
        let engine = JsonSchemaEngine::new();
        assert!(engine.check_schema(&json!({ "type": 12 })).is_err());
        assert!(engine.check_schema(&json!({ "minLength": -1 })).is_err());
    }

    #[test]
    fn test_unknown_dialect_is_a_schema_violation() {
        let engine = JsonSchemaEngine::new();
        let schema = json!({ "$schema": "http://example.com/custom-dialect", "type": "string" });

        let violation = engine.check_schema(&schema).unwrap_err();
        assert_eq!(violation.schema_path, "/$schema");
        assert!(violation.message.contains("custom-dialect"));
    }

    #[test]
    fn test_declared_draft_selects_meta_schema() {
        let engine = JsonSchemaEngine::new();
        // Boolean exclusiveMinimum only exists in draft 4
        let legacy = json!({
            "$schema": "http://json-schema.org/draft-04/schema#",
            "minimum": 0,
            "exclusiveMinimum": true
        });
        assert!(engine.check_schema(&legacy).is_ok());
        assert!(engine.evaluate(&legacy, &json!(0)).is_err());
        assert!(engine.evaluate(&legacy, &json!(1)).is_ok());

        let current = json!({ "minimum": 0, "exclusiveMinimum": true });
        assert!(engine.check_schema(&current).is_err());
    }

    #[test]
    fn test_best_match_prefers_shallow_errors() {
        let schema = json!({
            "type": "object",
            "required": ["id"],
            "properties": {
                "tags": { "type": "array", "items": { "type": "string" } }
            }
        });
        let instance = json!({ "tags": [1] });
        let validator = jsonschema::validator_for(&schema).unwrap();

        let error = best_match(validator.iter_errors(&instance)).unwrap();
        assert_eq!(error.instance_path.to_string(), "");
        assert!(error.to_string().contains("id"));
    }

    #[test]
    fn test_best_match_ranks_any_of_last() {
        let schema = json!({
            "properties": {
                "a": { "anyOf": [{ "type": "string" }, { "type": "boolean" }] },
                "b": { "type": "string" }
            }
        });
        let instance = json!({ "a": 1, "b": 2 });
        let validator = jsonschema::validator_for(&schema).unwrap();

        let error = best_match(validator.iter_errors(&instance)).unwrap();
        assert_eq!(error.instance_path.to_string(), "/b");
    }

    #[test]
    fn test_best_match_none_when_valid() {
        let schema = json!({ "type": "integer" });
        let instance = json!(3);
        let validator = jsonschema::validator_for(&schema).unwrap();
        assert!(best_match(validator.iter_errors(&instance)).is_none());
    }

    #[test]
    fn test_pointer_depth() {
        assert_eq!(pointer_depth(""), 0);
        assert_eq!(pointer_depth("/a"), 1);
        assert_eq!(pointer_depth("/a/0/b"), 3);
    }
}
