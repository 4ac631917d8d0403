//! Variable map types and the string-leaf projection

use indexmap::IndexMap;
use serde_yaml::{Mapping, Value};

/// Type-preserving variable map, in document order
pub type VarMap = IndexMap<String, Value>;

/// String-only variable map used for group and host vars
pub type StringVars = IndexMap<String, String>;

/// Render a YAML mapping key as a variable name.
///
/// Scalar keys (`8080:`, `true:`) become their textual form; composite keys
/// cannot name a variable and yield `None`.
pub fn key_to_string(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some("null".to_string()),
        Value::Tagged(tagged) => key_to_string(&tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

/// Convert a parsed YAML mapping into a [`VarMap`].
pub fn var_map_from_mapping(mapping: Mapping) -> VarMap {
    let mut vars = VarMap::with_capacity(mapping.len());
    for (key, value) in mapping {
        match key_to_string(&key) {
            Some(name) => {
                vars.insert(name, value);
            }
            None => tracing::debug!("skipping variable with a non-scalar key"),
        }
    }
    vars
}

/// String-leaf projection.
///
/// Keeps only the entries whose value is a string (including strings under a
/// YAML tag such as `!unsafe`). Numbers, booleans, nulls, sequences and
/// mappings are dropped, not stringified.
pub fn string_leaves(vars: &VarMap) -> StringVars {
    vars.iter()
        .filter_map(|(key, value)| string_leaf(value).map(|s| (key.clone(), s.to_string())))
        .collect()
}

fn string_leaf(value: &Value) -> Option<&str> {
    match value {
        Value::String(s) => Some(s),
        Value::Tagged(tagged) => match &tagged.value {
            Value::String(s) => Some(s),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> VarMap {
        let mapping: Mapping = serde_yaml::from_str(yaml).unwrap();
        var_map_from_mapping(mapping)
    }

    #[test]
    fn test_string_leaves_drops_non_strings() {
        let vars = parse(
            "name: web\nport: 8080\nenabled: true\nnothing: ~\nlist: [a, b]\nnested: {a: b}\nquoted: '8080'\n",
        );
        let strings = string_leaves(&vars);

        assert_eq!(strings.len(), 2);
        assert_eq!(strings.get("name").map(String::as_str), Some("web"));
        assert_eq!(strings.get("quoted").map(String::as_str), Some("8080"));
        assert!(!strings.contains_key("port"));
        assert!(!strings.contains_key("list"));
    }

    #[test]
    fn test_string_leaves_keeps_tagged_strings() {
        let vars = parse("raw: !unsafe '{{ not_templated }}'\n");
        let strings = string_leaves(&vars);
        assert_eq!(strings.get("raw").map(String::as_str), Some("{{ not_templated }}"));
    }

    #[test]
    fn test_scalar_keys_are_stringified() {
        let vars = parse("8080: http\ntrue: yes-key\n");
        assert!(vars.contains_key("8080"));
        assert!(vars.contains_key("true"));
    }

    #[test]
    fn test_document_order_preserved() {
        let vars = parse("zeta: 1\nalpha: 2\nmid: 3\n");
        let keys: Vec<_> = vars.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }
}
