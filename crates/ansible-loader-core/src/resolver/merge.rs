//! Ordered last-writer-wins merge

use crate::types::VarMap;

/// Merge variable maps in order; a key set by a later map replaces the
/// earlier value. Keys keep the position of their first appearance.
pub fn merge_ordered<I>(sources: I) -> VarMap
where
    I: IntoIterator<Item = VarMap>,
{
    sources.into_iter().fold(VarMap::new(), |mut merged, source| {
        merged.extend(source);
        merged
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_yaml::Value;

    fn vars(yaml: &str) -> VarMap {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_later_wins() {
        let merged = merge_ordered([vars("a: 1\nb: 2\n"), vars("b: 3\nc: 4\n")]);
        let keys: Vec<_> = merged.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
        assert_eq!(merged["a"].as_i64(), Some(1));
        assert_eq!(merged["b"].as_i64(), Some(3));
        assert_eq!(merged["c"].as_i64(), Some(4));
    }

    #[test]
    fn test_values_are_replaced_not_deep_merged() {
        let merged = merge_ordered([vars("db: {host: a, port: 1}\n"), vars("db: {host: b}\n")]);
        let db = merged["db"].as_mapping().unwrap();
        assert_eq!(db.get("host").and_then(Value::as_str), Some("b"));
        assert!(db.get("port").is_none());
    }

    #[test]
    fn test_empty_sources() {
        assert!(merge_ordered(Vec::<VarMap>::new()).is_empty());
        assert!(merge_ordered([VarMap::new(), VarMap::new()]).is_empty());
    }
}
