//! Ansible Loader Core
//!
//! Runtime-agnostic resolution of Ansible-style variables.
//! This crate provides the resolution engine that can be used from any
//! environment (Node.js via napi-rs, native CLI, tests, etc.)
//!
//! ## Sources
//!
//! An extension descriptor names up to four kinds of sources:
//! - an inventory file, plus `group_vars`/`host_vars` side-car directories
//! - vault files (whole-file encrypted, each with its own password)
//! - plain var files (which may contain inline vault scalars)
//! - limits: groups to exclude from the inventory
//!
//! ```rust,ignore
//! use ansible_loader_core::resolve;
//!
//! let resolved = resolve("extension.yaml")?;
//! for group in &resolved.groups {
//!     println!("{}: {} hosts", group.name, group.hosts.len());
//! }
//! let env = resolved.global("env");
//! ```

pub mod error;
pub mod types;
pub mod files;
pub mod config;
pub mod vault;
pub mod inventory;
pub mod resolver;
pub mod logging;

// Re-export commonly used types
pub use error::{LoaderError, LoaderResult, ErrorKind};

pub use types::{
    VarMap, StringVars, string_leaves,
    GroupNode, HostNode, ALL_GROUP,
    ResolvedVariables,
};

pub use config::{
    ExtensionConfig, InventoryRef, VaultRef, VarFileRef,
    EnvOverrides, load_with_overrides,
};

pub use vault::{decrypt_scalar, decrypt_text, encrypt, is_vault_value};

pub use resolver::{resolve, resolve_config, merge_ordered};
