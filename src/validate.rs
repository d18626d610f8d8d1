//! Argument validation against a [`Schema`]
//!
//! Collects every failure in one pass so the caller can fix all of them in a
//! single round trip. Absent optional fields stay absent and unknown keys are
//! dropped; nothing is defaulted here.

use serde_json::{Map, Value};

use crate::types::{
    json_type_name, FailureReason, Field, FieldKind, ResolvedArguments, Schema, ValidationFailure,
};

/// Validate raw caller arguments against `schema`
///
/// `null` (or no arguments at all) is treated as an empty object.
pub fn validate(
    schema: &Schema,
    raw: &Value,
) -> std::result::Result<ResolvedArguments, Vec<ValidationFailure>> {
    let empty = Map::new();
    let object = match raw {
        Value::Null => &empty,
        Value::Object(map) => map,
        other => {
            return Err(vec![ValidationFailure::new(
                "arguments",
                "object",
                FailureReason::TypeMismatch {
                    actual: json_type_name(other).to_string(),
                },
            )])
        }
    };

    let mut failures = Vec::new();
    let resolved = validate_object(schema, object, "", &mut failures);

    if failures.is_empty() {
        let mut args = ResolvedArguments::new();
        for (name, value) in resolved {
            args.insert(name, value);
        }
        Ok(args)
    } else {
        Err(failures)
    }
}

fn validate_object(
    schema: &Schema,
    object: &Map<String, Value>,
    prefix: &str,
    failures: &mut Vec<ValidationFailure>,
) -> Map<String, Value> {
    // Missing required fields first, all of them
    for field in schema.required_fields() {
        if !object.contains_key(&field.name) {
            failures.push(ValidationFailure::new(
                path_of(prefix, &field.name),
                field.expected(),
                FailureReason::Missing,
            ));
        }
    }

    let mut resolved = Map::new();
    for field in schema.fields() {
        let Some(value) = object.get(&field.name) else {
            continue;
        };
        if let Some(checked) = check_field(field, value, &path_of(prefix, &field.name), failures) {
            resolved.insert(field.name.clone(), checked);
        }
    }
    resolved
}

fn check_field(
    field: &Field,
    value: &Value,
    path: &str,
    failures: &mut Vec<ValidationFailure>,
) -> Option<Value> {
    let matches = match (&field.kind, value) {
        (_, Value::Null) if field.nullable => return Some(Value::Null),
        (FieldKind::String, Value::String(_)) => true,
        (FieldKind::Number, Value::Number(_)) => true,
        (FieldKind::Boolean, Value::Bool(_)) => true,
        (FieldKind::Object(inner), Value::Object(map)) => {
            let before = failures.len();
            let nested = validate_object(inner, map, path, failures);
            return (failures.len() == before).then_some(Value::Object(nested));
        }
        _ => false,
    };

    if matches {
        Some(value.clone())
    } else {
        failures.push(ValidationFailure::new(
            path,
            field.expected(),
            FailureReason::TypeMismatch {
                actual: json_type_name(value).to_string(),
            },
        ));
        None
    }
}

fn path_of(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}
