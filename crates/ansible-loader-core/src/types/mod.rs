//! Core data model: variable maps, the group/host tree and the resolved result

mod vars;
mod inventory;
mod resolved;

pub use vars::{VarMap, StringVars, string_leaves, var_map_from_mapping, key_to_string};
pub use inventory::{GroupNode, HostNode, ALL_GROUP};
pub use resolved::ResolvedVariables;
