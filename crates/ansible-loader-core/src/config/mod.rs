//! Extension descriptor loading and environment overrides
//!
//! - `ExtensionConfig`: the YAML descriptor naming inventory, vaults, var files and limits
//! - `EnvOverrides`: harness environment variables merged in before validation

mod extension;
mod env;

pub use extension::{ExtensionConfig, InventoryRef, VaultRef, VarFileRef};
pub(crate) use extension::null_as_default;
pub use env::{
    EnvOverrides, load_with_overrides, parse_vault_list,
    ENV_CONFIG_PATH, ENV_INVENTORY, ENV_VAULTS, ENV_LIMITS,
};
