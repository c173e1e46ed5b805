//! Building a [`TypeSpec`] from command-line pairs and YAML mapping files
//!
//! A YAML type mapping is a single top-level mapping of column names to tags:
//!
//! ```yaml
//! Age(x): integer
//! l_x: integer
//! q_x: numeric
//! ```
//!
//! Malformed mappings are rejected here, before any conversion starts. Tags are
//! not checked: an unknown tag is reported per column during coercion.

use crate::error::{ConvertError, ConvertResult};
use crate::types::TypeSpec;
use serde_yaml::Value;
use std::path::Path;

/// Parse one `NAME=TYPE` pair. The split is on the last `=`, so column names
/// may themselves contain `=`.
pub fn parse_type_pair(pair: &str) -> ConvertResult<(String, String)> {
    let (name, tag) = pair.rsplit_once('=').ok_or_else(|| {
        ConvertError::TypeSpec(format!("expected NAME=TYPE, got '{}'", pair))
    })?;

    let name = name.trim();
    let tag = tag.trim();
    if name.is_empty() {
        return Err(ConvertError::TypeSpec(format!(
            "missing column name in '{}'",
            pair
        )));
    }
    if tag.is_empty() {
        return Err(ConvertError::TypeSpec(format!("missing type in '{}'", pair)));
    }

    Ok((name.to_string(), tag.to_string()))
}

/// Build a mapping from `NAME=TYPE` pairs, keeping their order
pub fn type_spec_from_pairs<S: AsRef<str>>(pairs: &[S]) -> ConvertResult<TypeSpec> {
    pairs
        .iter()
        .map(|pair| parse_type_pair(pair.as_ref()))
        .collect()
}

/// Parse a YAML mapping of column name to type tag
pub fn type_spec_from_yaml(content: &str) -> ConvertResult<TypeSpec> {
    let yaml: Value = serde_yaml::from_str(content)?;

    let map = match yaml {
        Value::Mapping(map) => map,
        // An empty document means no conversions
        Value::Null => return Ok(TypeSpec::new()),
        other => {
            return Err(ConvertError::TypeSpec(format!(
                "type mapping must be a mapping of column names to types, found {}",
                value_kind(&other)
            )))
        }
    };

    let mut spec = TypeSpec::new();
    for (key, value) in map {
        let Some(column) = scalar_text(&key) else {
            return Err(ConvertError::TypeSpec(format!(
                "column names must be text, found {}",
                value_kind(&key)
            )));
        };
        let tag = match value {
            Value::String(tag) => tag,
            other => {
                return Err(ConvertError::TypeSpec(format!(
                    "type of column '{}' must be text, found {}",
                    column,
                    value_kind(&other)
                )))
            }
        };
        spec.insert(column, tag);
    }
    Ok(spec)
}

/// Read a YAML type mapping file
pub fn load_type_spec(path: &Path) -> ConvertResult<TypeSpec> {
    let content = std::fs::read_to_string(path)?;
    type_spec_from_yaml(&content)
}

/// Column names such as `2024` or `true` arrive as YAML scalars; keep their text
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn entries(spec: &TypeSpec) -> Vec<(&str, &str)> {
        spec.iter().collect()
    }

    #[test]
    fn test_parse_type_pair() {
        assert_eq!(
            parse_type_pair("Age(x)=integer").unwrap(),
            ("Age(x)".to_string(), "integer".to_string())
        );
        assert_eq!(
            parse_type_pair(" a=b = factor ").unwrap(),
            ("a=b".to_string(), "factor".to_string())
        );
    }

    #[test]
    fn test_parse_type_pair_rejects_malformed() {
        assert!(matches!(parse_type_pair("age"), Err(ConvertError::TypeSpec(_))));
        assert!(matches!(parse_type_pair("=integer"), Err(ConvertError::TypeSpec(_))));
        assert!(matches!(parse_type_pair("age="), Err(ConvertError::TypeSpec(_))));
    }

    #[test]
    fn test_pairs_keep_order() {
        let spec = type_spec_from_pairs(&["q_x=numeric", "Age(x)=integer"]).unwrap();
        assert_eq!(entries(&spec), vec![("q_x", "numeric"), ("Age(x)", "integer")]);
    }

    #[test]
    fn test_yaml_mapping_in_document_order() {
        let spec = type_spec_from_yaml("Age(x): integer\nl_x: integer\nq_x: numeric\n").unwrap();
        assert_eq!(
            entries(&spec),
            vec![("Age(x)", "integer"), ("l_x", "integer"), ("q_x", "numeric")]
        );
    }

    #[test]
    fn test_yaml_keeps_unknown_tags() {
        let spec = type_spec_from_yaml("z: complex\n").unwrap();
        assert_eq!(entries(&spec), vec![("z", "complex")]);
    }

    #[test]
    fn test_yaml_numeric_column_name() {
        let spec = type_spec_from_yaml("2024: numeric\n").unwrap();
        assert_eq!(entries(&spec), vec![("2024", "numeric")]);
    }

    #[test]
    fn test_yaml_empty_document() {
        assert!(type_spec_from_yaml("").unwrap().is_empty());
    }

    #[test]
    fn test_yaml_not_a_mapping() {
        let err = type_spec_from_yaml("- integer\n- numeric\n").unwrap_err();
        assert!(matches!(err, ConvertError::TypeSpec(_)));
        assert!(err.to_string().contains("a sequence"));
    }

    #[test]
    fn test_yaml_non_text_type() {
        let err = type_spec_from_yaml("age: [integer]\n").unwrap_err();
        assert!(err.to_string().contains("'age'"));
    }

    #[test]
    fn test_yaml_syntax_error() {
        let err = type_spec_from_yaml("age: [integer\n").unwrap_err();
        assert!(matches!(err, ConvertError::Yaml(_)));
    }
}
