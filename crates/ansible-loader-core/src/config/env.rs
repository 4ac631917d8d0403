//! Environment overrides supplied by the calling harness
//!
//! | variable | effect |
//! |---|---|
//! | `ANSIBLE_LOADER_CONFIG` | descriptor path when the caller passes none |
//! | `ANSIBLE_LOADER_INVENTORY` | replaces the inventory path |
//! | `ANSIBLE_LOADER_VAULTS` | `path:password[,path:password...]`, appended after descriptor vaults |
//! | `ANSIBLE_LOADER_LIMITS` | `group[,group...]`, replaces the descriptor limits |

use std::env;
use std::path::{Path, PathBuf};

use crate::error::{LoaderError, LoaderResult};
use crate::files::expand_home;

use super::extension::{ExtensionConfig, VaultRef};

pub const ENV_CONFIG_PATH: &str = "ANSIBLE_LOADER_CONFIG";
pub const ENV_INVENTORY: &str = "ANSIBLE_LOADER_INVENTORY";
pub const ENV_VAULTS: &str = "ANSIBLE_LOADER_VAULTS";
pub const ENV_LIMITS: &str = "ANSIBLE_LOADER_LIMITS";

/// Override values read from the environment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverrides {
    pub config_path: Option<PathBuf>,
    pub inventory: Option<PathBuf>,
    /// Raw `path:password` list; parsed when applied
    pub vaults: Option<String>,
    pub limits: Option<Vec<String>>,
}

impl EnvOverrides {
    /// Read overrides from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read overrides through an arbitrary lookup (e.g. a harness-provided map)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        Self {
            config_path: get(ENV_CONFIG_PATH).map(PathBuf::from),
            inventory: get(ENV_INVENTORY).map(PathBuf::from),
            vaults: get(ENV_VAULTS),
            limits: get(ENV_LIMITS).map(|raw| split_list(&raw)),
        }
    }

    /// Whether any override that changes the descriptor is present
    pub fn changes_descriptor(&self) -> bool {
        self.inventory.is_some() || self.vaults.is_some() || self.limits.is_some()
    }

    /// The descriptor path to load: an explicit non-empty path wins over
    /// `ANSIBLE_LOADER_CONFIG`.
    pub fn descriptor_path(&self, explicit: &str) -> Option<PathBuf> {
        let explicit = explicit.trim();
        if !explicit.is_empty() {
            return Some(PathBuf::from(explicit));
        }
        self.config_path.clone()
    }

    /// Merge the overrides into a descriptor. The result is not validated.
    pub fn apply(&self, config: &mut ExtensionConfig) -> LoaderResult<()> {
        if let Some(path) = &self.inventory {
            let mut inventory = config.inventory.take().unwrap_or_default();
            inventory.relocate(expand_home(path));
            config.inventory = Some(inventory);
        }

        if let Some(raw) = &self.vaults {
            config.vaults.extend(parse_vault_list(raw)?);
        }

        if let Some(limits) = &self.limits {
            config.limits = limits.clone();
        }

        if self.changes_descriptor() {
            tracing::debug!(
                inventory = self.inventory.is_some(),
                vaults = self.vaults.is_some(),
                limits = self.limits.is_some(),
                "applied environment overrides"
            );
        }
        Ok(())
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse `path:password[,path:password...]`, splitting each entry at its
/// first `:`.
pub fn parse_vault_list(raw: &str) -> LoaderResult<Vec<VaultRef>> {
    split_list(raw)
        .into_iter()
        .map(|entry| match entry.split_once(':') {
            Some((path, password)) if !path.trim().is_empty() && !password.is_empty() => {
                Ok(VaultRef::new(expand_home(Path::new(path.trim())), password))
            }
            _ => Err(LoaderError::validation(format!(
                "{} entries must look like path:password (got '{}')",
                ENV_VAULTS,
                entry.split(':').next().unwrap_or_default()
            ))),
        })
        .collect()
}

/// Read, override, then validate a descriptor.
///
/// With no descriptor path at all, overrides alone may describe the sources.
pub fn load_with_overrides(explicit_path: &str, overrides: &EnvOverrides) -> LoaderResult<ExtensionConfig> {
    let mut config = match overrides.descriptor_path(explicit_path) {
        Some(path) => ExtensionConfig::read(path)?,
        None if overrides.changes_descriptor() => ExtensionConfig::default(),
        None => {
            return Err(LoaderError::not_found(
                format!("config path is empty and {} is not set", ENV_CONFIG_PATH),
                "",
            ))
        }
    };
    overrides.apply(&mut config)?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InventoryRef;
    use crate::error::ErrorKind;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::tempdir;

    fn overrides(pairs: &[(&str, &str)]) -> EnvOverrides {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        EnvOverrides::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_from_lookup() {
        let o = overrides(&[
            (ENV_CONFIG_PATH, "cfg.yaml"),
            (ENV_INVENTORY, "inv/prod.yml"),
            (ENV_VAULTS, "v1.yml:pw1, v2.yml:pw:with:colons"),
            (ENV_LIMITS, "db, ,web"),
        ]);
        assert_eq!(o.config_path, Some(PathBuf::from("cfg.yaml")));
        assert_eq!(o.limits, Some(vec!["db".to_string(), "web".to_string()]));
        assert!(o.changes_descriptor());

        let vaults = parse_vault_list(o.vaults.as_deref().unwrap()).unwrap();
        assert_eq!(vaults[0], VaultRef::new("v1.yml", "pw1"));
        assert_eq!(vaults[1], VaultRef::new("v2.yml", "pw:with:colons"));
    }

    #[test]
    fn test_blank_values_ignored() {
        let o = overrides(&[(ENV_INVENTORY, "   "), (ENV_LIMITS, "")]);
        assert_eq!(o, EnvOverrides::default());
        assert!(!o.changes_descriptor());
    }

    #[test]
    fn test_malformed_vault_entry() {
        let err = parse_vault_list("vault.yml").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        let err = parse_vault_list("vault.yml:").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_descriptor_path_precedence() {
        let o = overrides(&[(ENV_CONFIG_PATH, "from-env.yaml")]);
        assert_eq!(o.descriptor_path("explicit.yaml"), Some(PathBuf::from("explicit.yaml")));
        assert_eq!(o.descriptor_path(""), Some(PathBuf::from("from-env.yaml")));
        assert_eq!(EnvOverrides::default().descriptor_path(" "), None);
    }

    #[test]
    fn test_apply_inventory_keeps_password_and_custom_dirs() {
        let mut config = ExtensionConfig::from(
            InventoryRef::new("old/inv.yml")
                .with_dirs("shared/gv", "old/host_vars")
                .with_vault_password("pw"),
        );
        overrides(&[(ENV_INVENTORY, "new/inv.yml")]).apply(&mut config).unwrap();

        let inventory = config.inventory.unwrap();
        assert_eq!(inventory.path, PathBuf::from("new/inv.yml"));
        assert_eq!(inventory.group_vars, PathBuf::from("shared/gv"));
        assert_eq!(inventory.host_vars, PathBuf::from("old/host_vars"));
        assert_eq!(inventory.vault_password.as_deref(), Some("pw"));
    }

    #[test]
    fn test_apply_inventory_moves_only_defaulted_dirs() {
        // group_vars is explicit even though it equals the sibling default
        let mut config = ExtensionConfig::from_yaml(
            "inventory:\n  path: old/inv.yml\n  group_vars: old/group_vars\n",
        )
        .unwrap();
        overrides(&[(ENV_INVENTORY, "new/inv.yml")]).apply(&mut config).unwrap();

        let inventory = config.inventory.unwrap();
        assert_eq!(inventory.group_vars, PathBuf::from("old/group_vars"));
        assert_eq!(inventory.host_vars, PathBuf::from("new/host_vars"));
    }

    #[test]
    fn test_apply_inventory_without_descriptor_inventory() {
        let mut config = ExtensionConfig::default();
        overrides(&[(ENV_INVENTORY, "site/hosts.yml")]).apply(&mut config).unwrap();

        let inventory = config.inventory.unwrap();
        assert_eq!(inventory.group_vars, PathBuf::from("site/group_vars"));
        assert_eq!(inventory.host_vars, PathBuf::from("site/host_vars"));
    }

    #[test]
    fn test_apply_appends_vaults_and_replaces_limits() {
        let mut config = ExtensionConfig::from_yaml(
            "inventory:\n  path: inv.yml\nlimits: [web]\nvaults:\n  - path: a.yml\n    password: pa\n",
        )
        .unwrap();
        overrides(&[(ENV_VAULTS, "b.yml:pb"), (ENV_LIMITS, "db")]).apply(&mut config).unwrap();

        assert_eq!(config.vaults, vec![VaultRef::new("a.yml", "pa"), VaultRef::new("b.yml", "pb")]);
        assert_eq!(config.limits, vec!["db"]);
    }

    #[test]
    fn test_load_with_overrides() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "var_files:\n  - path: vars.yml\n").unwrap();

        // limits without inventory only become valid once the override adds one
        let o = overrides(&[(ENV_LIMITS, "db")]);
        assert_eq!(
            load_with_overrides(path.to_str().unwrap(), &o).unwrap_err().kind(),
            ErrorKind::Validation
        );

        let o = overrides(&[(ENV_LIMITS, "db"), (ENV_INVENTORY, "inv.yml")]);
        let config = load_with_overrides(path.to_str().unwrap(), &o).unwrap();
        assert_eq!(config.limits, vec!["db"]);
        assert!(config.inventory.is_some());
    }

    #[test]
    fn test_load_without_any_descriptor() {
        let err = load_with_overrides("", &EnvOverrides::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let o = overrides(&[(ENV_VAULTS, "vault.yml:pw")]);
        let config = load_with_overrides("", &o).unwrap();
        assert_eq!(config.vaults.len(), 1);
    }
}
