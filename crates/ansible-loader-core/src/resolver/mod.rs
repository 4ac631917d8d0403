//! Merge engine
//!
//! [`merge_ordered`] is the single precedence primitive; [`engine`] wires the
//! inventory, vault and var-file loaders into one [`ResolvedVariables`].
//!
//! [`ResolvedVariables`]: crate::types::ResolvedVariables

mod merge;
pub mod engine;

pub use merge::merge_ordered;
pub use engine::{
    assemble, merge_var_files, merge_vault, resolve, resolve_config, resolve_inventory_groups,
};
