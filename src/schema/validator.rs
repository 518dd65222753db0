//! Schema validation
//!
//! [`SchemaValidator`] is the seam entity types validate through. The
//! bundled [`RuleValidator`] walks a [`Schema`] and collects every
//! violation instead of stopping at the first one.

use super::error::{ValidationError, ValidationResult, Violation};
use super::rules::{FieldRule, RuleKind, Schema};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidateOptions {
    /// Drop keys the schema does not declare instead of rejecting them.
    pub strip_unknown: bool,
}

impl ValidateOptions {
    pub fn strip_unknown() -> Self {
        Self {
            strip_unknown: true,
        }
    }
}

/// Validates a JSON object against a schema, returning the cleaned value.
pub trait SchemaValidator: Send + Sync {
    fn validate(
        &self,
        data: &Value,
        schema: &Schema,
        options: ValidateOptions,
    ) -> ValidationResult<Value>;
}

/// Default validator driven by [`FieldRule`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleValidator;

impl RuleValidator {
    pub fn new() -> Self {
        Self
    }
}

impl SchemaValidator for RuleValidator {
    fn validate(
        &self,
        data: &Value,
        schema: &Schema,
        options: ValidateOptions,
    ) -> ValidationResult<Value> {
        let object = data
            .as_object()
            .ok_or_else(|| ValidationError::single("value", "must be an object"))?;

        let mut violations = Vec::new();
        let cleaned = validate_object("", object, schema, options, &mut violations);

        if violations.is_empty() {
            Ok(Value::Object(cleaned))
        } else {
            Err(ValidationError::new(violations))
        }
    }
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

fn validate_object(
    prefix: &str,
    object: &Map<String, Value>,
    schema: &Schema,
    options: ValidateOptions,
    violations: &mut Vec<Violation>,
) -> Map<String, Value> {
    let mut cleaned = Map::new();

    for (name, rule) in schema.iter() {
        let path = join_path(prefix, name);
        match object.get(name) {
            None => {
                if let Some(default) = &rule.default {
                    cleaned.insert(name.to_string(), default.clone());
                } else if rule.required {
                    violations.push(Violation::new(path, "is required"));
                }
            }
            Some(value) => {
                if let Some(value) = validate_value(&path, value, rule, options, violations) {
                    cleaned.insert(name.to_string(), value);
                }
            }
        }
    }

    if !options.strip_unknown {
        for name in object.keys().filter(|name| !schema.contains(name)) {
            violations.push(Violation::new(join_path(prefix, name), "is not allowed"));
        }
    }

    cleaned
}

fn validate_value(
    path: &str,
    value: &Value,
    rule: &FieldRule,
    options: ValidateOptions,
    violations: &mut Vec<Violation>,
) -> Option<Value> {
    if value.is_null() {
        if rule.nullable {
            return Some(Value::Null);
        }
        violations.push(Violation::new(path, "must not be null"));
        return None;
    }

    if let Some(allowed) = &rule.allowed {
        if !allowed.contains(value) {
            violations.push(Violation::new(path, "must be one of the allowed values"));
            return None;
        }
    }

    let cleaned = match (&rule.kind, value) {
        (RuleKind::Any, value) => value.clone(),
        (RuleKind::String, Value::String(s)) => {
            check_bounds(path, s.chars().count() as f64, rule, "length", violations);
            value.clone()
        }
        (RuleKind::Integer, Value::Number(n)) if is_integral(n) => {
            check_bounds(path, n.as_f64().unwrap_or_default(), rule, "value", violations);
            value.clone()
        }
        (RuleKind::Number, Value::Number(n)) => {
            check_bounds(path, n.as_f64().unwrap_or_default(), rule, "value", violations);
            value.clone()
        }
        (RuleKind::Boolean, Value::Bool(_)) => value.clone(),
        (RuleKind::Array(item_rule), Value::Array(items)) => {
            check_bounds(path, items.len() as f64, rule, "length", violations);
            match item_rule {
                Some(item_rule) => Value::Array(
                    items
                        .iter()
                        .enumerate()
                        .filter_map(|(index, item)| {
                            let item_path = format!("{}[{}]", path, index);
                            validate_value(&item_path, item, item_rule, options, violations)
                        })
                        .collect(),
                ),
                None => value.clone(),
            }
        }
        (RuleKind::Object(nested), Value::Object(object)) => match nested {
            Some(schema) => {
                Value::Object(validate_object(path, object, schema, options, violations))
            }
            None => value.clone(),
        },
        (kind, _) => {
            violations.push(Violation::new(path, format!("must be {}", kind.describe())));
            return None;
        }
    };

    Some(cleaned)
}

fn is_integral(n: &serde_json::Number) -> bool {
    n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0)
}

fn check_bounds(
    path: &str,
    measured: f64,
    rule: &FieldRule,
    what: &str,
    violations: &mut Vec<Violation>,
) {
    if let Some(min) = rule.min {
        if measured < min {
            violations.push(Violation::new(path, format!("{} must be at least {}", what, min)));
        }
    }
    if let Some(max) = rule.max {
        if measured > max {
            violations.push(Violation::new(path, format!("{} must be at most {}", what, max)));
        }
    }
}
