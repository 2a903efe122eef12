//! Declarative schema validation for YAML documents.
//!
//! Every document Stackwright reads (environment manifests, command
//! descriptors, configuration files) is checked against a [`Shape`] before
//! any field is accessed. Validation collects every violation instead of
//! stopping at the first one, so users can fix all problems at once.
//!
//! # Example
//!
//! ```
//! use stackwright::validation::{validate_value, Field, Shape};
//!
//! let shape = Shape::map(vec![Field::required("name", Shape::Str)]);
//! let value: serde_yaml::Value = serde_yaml::from_str("other: 1").unwrap();
//! let violations = validate_value(&shape, &value);
//! assert_eq!(violations.len(), 2);
//! ```

pub mod documents;

use std::fmt;
use std::fs;
use std::path::Path;

use serde_yaml::Value;

use crate::error::{Result, StackwrightError};

pub use documents::{
    command_descriptor_shape, configuration_shape, environment_shape, plugin_descriptor_shape,
};

/// A single schema violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Dotted path to the offending value (e.g. `environment.components[1].name`).
    pub path: String,
    /// What is wrong with the value.
    pub message: String,
}

impl Violation {
    /// Create a new violation.
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "<root>: {}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// The expected shape of a YAML value.
#[derive(Debug, Clone)]
pub enum Shape {
    /// Any value.
    Any,
    /// A string.
    Str,
    /// A boolean.
    Bool,
    /// An integer.
    Int,
    /// One of a fixed set of strings.
    Enum(Vec<&'static str>),
    /// A list whose items all have the given shape.
    List(Box<Shape>),
    /// A mapping with known fields.
    Map {
        fields: Vec<Field>,
        allow_unknown: bool,
    },
    /// A mapping with arbitrary string keys.
    AnyMap,
    /// The first alternative that produces no violations wins.
    OneOf(Vec<Shape>),
}

/// A field of a [`Shape::Map`].
#[derive(Debug, Clone)]
pub struct Field {
    pub name: &'static str,
    pub required: bool,
    pub shape: Shape,
}

impl Field {
    /// A field that must be present.
    pub fn required(name: &'static str, shape: Shape) -> Self {
        Self {
            name,
            required: true,
            shape,
        }
    }

    /// A field that may be omitted.
    pub fn optional(name: &'static str, shape: Shape) -> Self {
        Self {
            name,
            required: false,
            shape,
        }
    }
}

impl Shape {
    /// A closed mapping: unknown keys are violations.
    pub fn map(fields: Vec<Field>) -> Self {
        Shape::Map {
            fields,
            allow_unknown: false,
        }
    }

    /// A list of `item`.
    pub fn list(item: Shape) -> Self {
        Shape::List(Box::new(item))
    }

    fn describe(&self) -> String {
        match self {
            Shape::Any => "any value".to_string(),
            Shape::Str => "a string".to_string(),
            Shape::Bool => "a boolean".to_string(),
            Shape::Int => "an integer".to_string(),
            Shape::Enum(values) => format!("one of {}", values.join(", ")),
            Shape::List(_) => "a list".to_string(),
            Shape::Map { .. } | Shape::AnyMap => "a mapping".to_string(),
            Shape::OneOf(shapes) => shapes
                .iter()
                .map(Shape::describe)
                .collect::<Vec<_>>()
                .join(" or "),
        }
    }
}

/// Validate `value` against `shape`, returning every violation found.
pub fn validate_value(shape: &Shape, value: &Value) -> Vec<Violation> {
    let mut violations = Vec::new();
    check(shape, value, "", &mut violations);
    violations
}

/// Read, parse and validate a YAML file.
///
/// Returns the parsed document when it satisfies `shape`.
///
/// # Errors
///
/// Returns `Validation` if the file is missing, not a file, or not YAML, and
/// `SchemaValidation` listing every violation otherwise.
pub fn validate_file(shape: &Shape, path: &Path) -> Result<Value> {
    if !path.exists() {
        return Err(StackwrightError::Validation {
            message: format!("The file '{}' does not exist!", path.display()),
        });
    }
    if !path.is_file() {
        return Err(StackwrightError::Validation {
            message: format!("Unable to validate path '{}'. Expected a file!", path.display()),
        });
    }

    let content = fs::read_to_string(path)?;
    let value: Value =
        serde_yaml::from_str(&content).map_err(|e| StackwrightError::Validation {
            message: format!("Unable to parse '{}': {}", path.display(), e),
        })?;

    let violations = validate_value(shape, &value);
    if !violations.is_empty() {
        return Err(StackwrightError::SchemaValidation {
            path: path.to_path_buf(),
            violations,
        });
    }

    tracing::trace!("The document at '{}' is valid", path.display());
    Ok(value)
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

fn check(shape: &Shape, value: &Value, path: &str, violations: &mut Vec<Violation>) {
    let mismatch = |violations: &mut Vec<Violation>| {
        violations.push(Violation::new(
            path,
            format!("expected {}, found {}", shape.describe(), kind_of(value)),
        ));
    };

    match shape {
        Shape::Any => {}
        Shape::Str => {
            if !value.is_string() {
                mismatch(violations);
            }
        }
        Shape::Bool => {
            if !value.is_bool() {
                mismatch(violations);
            }
        }
        Shape::Int => {
            if !(value.is_i64() || value.is_u64()) {
                mismatch(violations);
            }
        }
        Shape::Enum(allowed) => match value.as_str() {
            Some(s) if allowed.contains(&s) => {}
            _ => mismatch(violations),
        },
        Shape::List(item) => match value.as_sequence() {
            Some(items) => {
                for (index, entry) in items.iter().enumerate() {
                    check(item, entry, &format!("{}[{}]", path, index), violations);
                }
            }
            None => mismatch(violations),
        },
        Shape::AnyMap => {
            if !value.is_mapping() {
                mismatch(violations);
            }
        }
        Shape::Map {
            fields,
            allow_unknown,
        } => {
            let Some(mapping) = value.as_mapping() else {
                mismatch(violations);
                return;
            };

            for field in fields {
                match mapping.get(field.name) {
                    Some(Value::Null) | None if field.required => {
                        violations.push(Violation::new(
                            join(path, field.name),
                            "required field is missing",
                        ));
                    }
                    Some(Value::Null) | None => {}
                    Some(entry) => check(&field.shape, entry, &join(path, field.name), violations),
                }
            }

            if !allow_unknown {
                for key in mapping.keys() {
                    let known = key
                        .as_str()
                        .map(|k| fields.iter().any(|f| f.name == k))
                        .unwrap_or(false);
                    if !known {
                        let label = key.as_str().map(str::to_string).unwrap_or_else(|| {
                            serde_yaml::to_string(key).unwrap_or_default().trim().to_string()
                        });
                        violations.push(Violation::new(join(path, &label), "unexpected field"));
                    }
                }
            }
        }
        Shape::OneOf(alternatives) => {
            // The closest alternative is the one whose shallowest violation
            // lies deepest; ties go to the one with fewer violations.
            let mut best: Option<(usize, Vec<Violation>)> = None;
            for alternative in alternatives {
                let found = validate_value(alternative, value);
                if found.is_empty() {
                    return;
                }
                let depth = found.iter().map(|v| depth_of(&v.path)).min().unwrap_or(0);
                let closer = match &best {
                    None => true,
                    Some((best_depth, best_found)) => {
                        depth > *best_depth
                            || (depth == *best_depth && found.len() < best_found.len())
                    }
                };
                if closer {
                    best = Some((depth, found));
                }
            }
            match best.map(|(_, found)| found) {
                Some(found) if value.is_sequence() || value.is_mapping() => {
                    for violation in found {
                        let nested = if violation.path.is_empty() {
                            path.to_string()
                        } else if violation.path.starts_with('[') {
                            format!("{}{}", path, violation.path)
                        } else {
                            join(path, &violation.path)
                        };
                        violations.push(Violation::new(nested, violation.message));
                    }
                }
                _ => mismatch(violations),
            }
        }
    }
}

fn depth_of(path: &str) -> usize {
    if path.is_empty() {
        0
    } else {
        1 + path.matches(|c| c == '.' || c == '[').count()
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn yaml(s: &str) -> Value {
        serde_yaml::from_str(s).unwrap()
    }

    #[test]
    fn valid_document_has_no_violations() {
        let shape = Shape::map(vec![
            Field::required("name", Shape::Str),
            Field::optional("tags", Shape::list(Shape::Str)),
        ]);
        assert!(validate_value(&shape, &yaml("name: x\ntags: [a, b]")).is_empty());
    }

    #[test]
    fn collects_every_violation() {
        let shape = Shape::map(vec![
            Field::required("name", Shape::Str),
            Field::required("count", Shape::Int),
            Field::optional("tags", Shape::list(Shape::Str)),
        ]);
        let violations = validate_value(&shape, &yaml("tags: [a, 3]\nextra: true"));

        let paths: Vec<_> = violations.iter().map(|v| v.path.as_str()).collect();
        assert!(paths.contains(&"name"));
        assert!(paths.contains(&"count"));
        assert!(paths.contains(&"tags[1]"));
        assert!(paths.contains(&"extra"));
        assert_eq!(violations.len(), 4);
    }

    #[test]
    fn enum_rejects_unknown_value() {
        let shape = Shape::Enum(vec!["install", "verify"]);
        let violations = validate_value(&shape, &yaml("manage"));
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("one of install, verify"));
    }

    #[test]
    fn one_of_accepts_any_alternative() {
        let shape = Shape::OneOf(vec![Shape::Str, Shape::list(Shape::Str)]);
        assert!(validate_value(&shape, &yaml("linux")).is_empty());
        assert!(validate_value(&shape, &yaml("[linux, windows]")).is_empty());
        assert_eq!(validate_value(&shape, &yaml("3")).len(), 1);
    }

    #[test]
    fn one_of_reports_nested_violations_of_closest_alternative() {
        let shape = Shape::OneOf(vec![
            Shape::list(Shape::Str),
            Shape::list(Shape::map(vec![Field::required("packages", Shape::list(Shape::Str))])),
        ]);
        let violations = validate_value(&shape, &yaml("[{manager: apt}]"));
        assert!(violations.iter().any(|v| v.path == "[0].packages"));
    }

    #[test]
    fn validate_file_missing() {
        let result = validate_file(&Shape::Any, Path::new("/does/not/exist.yml"));
        assert!(matches!(result, Err(StackwrightError::Validation { .. })));
    }

    #[test]
    fn validate_file_reports_schema_errors() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("doc.yml");
        fs::write(&file, "other: 1").unwrap();

        let shape = Shape::map(vec![Field::required("name", Shape::Str)]);
        match validate_file(&shape, &file) {
            Err(StackwrightError::SchemaValidation { violations, .. }) => {
                assert_eq!(violations.len(), 2)
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn validate_file_rejects_invalid_yaml() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("doc.yml");
        fs::write(&file, "name: [unclosed").unwrap();
        assert!(matches!(
            validate_file(&Shape::Any, &file),
            Err(StackwrightError::Validation { .. })
        ));
    }
}
