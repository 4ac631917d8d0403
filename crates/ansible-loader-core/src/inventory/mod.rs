//! Inventory loading
//!
//! [`parser`] turns the inventory file into a group/host tree, [`filter`]
//! drops limited groups, and [`sidecar`] overlays `group_vars`/`host_vars`
//! files on whatever survives.

pub mod filter;
pub mod parser;
pub mod sidecar;

pub use filter::filter_groups;
pub use parser::{parse, parse_str};
pub use sidecar::{load_sidecar_vars, resolve_group_vars, resolve_host_vars, resolve_tree, sidecar_files};
