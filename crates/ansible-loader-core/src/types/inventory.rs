//! Group/host tree built from an inventory

use std::path::{Path, PathBuf};

use serde::Serialize;

use super::vars::StringVars;

/// Name of the synthetic group representing inventory-wide scope
pub const ALL_GROUP: &str = "all";

/// A host and its string-valued variables
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostNode {
    /// Host name as written in the inventory
    pub name: String,
    /// Configured `host_vars` directory; variables live under `source_dir/name`
    #[serde(skip)]
    pub source_dir: PathBuf,
    /// Inline inventory vars overlaid by side-car file vars
    pub vars: StringVars,
}

impl HostNode {
    pub fn new(name: impl Into<String>, source_dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            source_dir: source_dir.into(),
            vars: StringVars::new(),
        }
    }

    /// Set the host's variables
    pub fn with_vars(mut self, vars: StringVars) -> Self {
        self.vars = vars;
        self
    }

    /// Directory holding this host's variable files
    pub fn vars_dir(&self) -> PathBuf {
        self.source_dir.join(&self.name)
    }
}

/// A group, its hosts and its string-valued variables
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupNode {
    /// Group name as written in the inventory
    pub name: String,
    /// Configured `group_vars` directory; variables live under `source_dir/name`
    #[serde(skip)]
    pub source_dir: PathBuf,
    /// Hosts in inventory order
    pub hosts: Vec<HostNode>,
    /// Inline inventory vars overlaid by side-car file vars
    pub vars: StringVars,
}

impl GroupNode {
    pub fn new(name: impl Into<String>, source_dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            source_dir: source_dir.into(),
            hosts: Vec::new(),
            vars: StringVars::new(),
        }
    }

    /// The synthetic inventory-wide group. It never carries hosts.
    pub fn all(source_dir: impl AsRef<Path>) -> Self {
        Self::new(ALL_GROUP, source_dir.as_ref())
    }

    /// Set the group's variables
    pub fn with_vars(mut self, vars: StringVars) -> Self {
        self.vars = vars;
        self
    }

    /// Add a host
    pub fn with_host(mut self, host: HostNode) -> Self {
        self.hosts.push(host);
        self
    }

    /// Directory holding this group's variable files
    pub fn vars_dir(&self) -> PathBuf {
        self.source_dir.join(&self.name)
    }

    /// Whether this is the synthetic `all` group
    pub fn is_all(&self) -> bool {
        self.name == ALL_GROUP
    }

    /// Look up a host by name
    pub fn host(&self, name: &str) -> Option<&HostNode> {
        self.hosts.iter().find(|h| h.name == name)
    }
}
