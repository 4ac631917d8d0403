//! Resolution pipeline
//!
//! Precedence, lowest first:
//! 1. vault files, in descriptor order
//! 2. var files, in descriptor order
//!
//! Group and host variables stay on the tree and are never folded into the
//! global map.

use std::path::Path;

use crate::config::{ExtensionConfig, InventoryRef, VarFileRef, VaultRef};
use crate::error::LoaderResult;
use crate::files::{parse_var_map, read_text, require_file};
use crate::inventory::{filter_groups, parse, resolve_tree};
use crate::types::{GroupNode, ResolvedVariables, VarMap};
use crate::vault::{decrypt_file, decrypt_vars};

use super::merge::merge_ordered;

/// Decrypt every vault file in order and merge the results (later wins).
pub fn merge_vault(vaults: &[VaultRef]) -> LoaderResult<VarMap> {
    let maps = vaults
        .iter()
        .map(|vault| {
            let vars = decrypt_file(&vault.path, &vault.password)?;
            tracing::debug!(vault = %vault.path.display(), keys = vars.len(), "decrypted vault");
            Ok(vars)
        })
        .collect::<LoaderResult<Vec<_>>>()?;
    Ok(merge_ordered(maps))
}

/// Load every plain var file in order and merge the results (later wins).
///
/// Vault scalars inside a file are decrypted with that file's own password.
pub fn merge_var_files(files: &[VarFileRef]) -> LoaderResult<VarMap> {
    let maps = files
        .iter()
        .map(|file| {
            require_file(&file.path, "var file")?;
            let vars = parse_var_map(&read_text(&file.path)?, &file.path)?;
            let vars = decrypt_vars(vars, file.vault_password.as_deref())
                .map_err(|e| e.in_context(format!("var file {}", file.path.display())))?;
            tracing::debug!(var_file = %file.path.display(), keys = vars.len(), "loaded var file");
            Ok(vars)
        })
        .collect::<LoaderResult<Vec<_>>>()?;
    Ok(merge_ordered(maps))
}

/// Combine the global layers and the resolved tree.
pub fn assemble(vault_vars: VarMap, file_vars: VarMap, groups: Vec<GroupNode>) -> ResolvedVariables {
    ResolvedVariables {
        groups,
        global_vars: merge_ordered([vault_vars, file_vars]),
    }
}

/// Parse, filter and resolve the inventory tree. No inventory means no groups.
pub fn resolve_inventory_groups(inventory: Option<&InventoryRef>, limits: &[String]) -> LoaderResult<Vec<GroupNode>> {
    let Some(inventory) = inventory else {
        return Ok(Vec::new());
    };
    let groups = filter_groups(parse(inventory)?, limits);
    resolve_tree(groups, inventory.vault_password.as_deref())
}

/// Load the descriptor at `descriptor_path` and resolve everything it names.
pub fn resolve(descriptor_path: impl AsRef<Path>) -> LoaderResult<ResolvedVariables> {
    let config = ExtensionConfig::load(descriptor_path)?;
    resolve_config(&config)
}

/// Resolve an already loaded descriptor.
///
/// The descriptor is validated again so a vault without a password fails
/// before anything is decrypted.
pub fn resolve_config(config: &ExtensionConfig) -> LoaderResult<ResolvedVariables> {
    config.validate()?;

    let groups = resolve_inventory_groups(config.inventory.as_ref(), &config.limits)?;
    let vault_vars = merge_vault(&config.vaults)?;
    let file_vars = merge_var_files(&config.var_files)?;
    let resolved = assemble(vault_vars, file_vars, groups);

    tracing::info!(
        groups = resolved.groups.len(),
        hosts = resolved.groups.iter().map(|g| g.hosts.len()).sum::<usize>(),
        global_vars = resolved.global_vars.len(),
        "resolved variables"
    );
    Ok(resolved)
}
