//! Final resolution result

use serde::Serialize;

use super::inventory::GroupNode;
use super::vars::VarMap;

/// Everything one resolution call produces
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResolvedVariables {
    /// Post-filter groups with their resolved group and host vars
    pub groups: Vec<GroupNode>,
    /// Vault vars overlaid by var-file vars, types preserved
    pub global_vars: VarMap,
}

impl ResolvedVariables {
    /// Look up a group by name
    pub fn group(&self, name: &str) -> Option<&GroupNode> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// Look up a global variable
    pub fn global(&self, key: &str) -> Option<&serde_yaml::Value> {
        self.global_vars.get(key)
    }

    /// Serialize to a JSON value (the shape handed to script runtimes)
    pub fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}
