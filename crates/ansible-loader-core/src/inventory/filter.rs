//! Limit filter

use std::collections::HashSet;

use crate::types::GroupNode;

/// Remove every group named in `limits`.
///
/// Limits are an exclusion list: listed groups are dropped, everything else
/// (including the synthetic `all` group unless it is listed) passes through
/// in input order. Must run before side-car resolution.
pub fn filter_groups(groups: Vec<GroupNode>, limits: &[String]) -> Vec<GroupNode> {
    if limits.is_empty() {
        return groups;
    }
    let excluded: HashSet<&str> = limits.iter().map(String::as_str).collect();
    let before = groups.len();
    let kept: Vec<GroupNode> = groups
        .into_iter()
        .filter(|g| !excluded.contains(g.name.as_str()))
        .collect();
    tracing::debug!(excluded = before - kept.len(), kept = kept.len(), "applied limits");
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn groups(names: &[&str]) -> Vec<GroupNode> {
        names.iter().map(|n| GroupNode::new(*n, "group_vars")).collect()
    }

    fn names(groups: &[GroupNode]) -> Vec<&str> {
        groups.iter().map(|g| g.name.as_str()).collect()
    }

    #[test]
    fn test_limits_exclude() {
        let filtered = filter_groups(groups(&["web", "db", "all"]), &["db".to_string()]);
        assert_eq!(names(&filtered), vec!["web", "all"]);
    }

    #[test]
    fn test_no_limits_keeps_everything() {
        let filtered = filter_groups(groups(&["web", "db", "all"]), &[]);
        assert_eq!(names(&filtered), vec!["web", "db", "all"]);
    }

    #[test]
    fn test_unknown_limit_is_ignored() {
        let filtered = filter_groups(groups(&["web", "all"]), &["cache".to_string()]);
        assert_eq!(names(&filtered), vec!["web", "all"]);
    }

    #[test]
    fn test_all_can_be_excluded() {
        let filtered = filter_groups(groups(&["web", "all"]), &["all".to_string(), "web".to_string()]);
        assert!(filtered.is_empty());
    }
}
