//! Extension descriptor (YAML)
//!
//! ```yaml
//! limits: [db]
//! inventory:
//!   path: inventories/prod.yml
//!   group_vars: inventories/group_vars
//!   host_vars: inventories/host_vars
//!   vault_password: s3cret
//! vaults:
//!   - path: vaults/prod.yml
//!     password: s3cret
//! var_files:
//!   - path: vars/common.yml
//!     vault_password: s3cret
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{LoaderError, LoaderResult};
use crate::files::{expand_home, read_text, require_file};

pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// One inventory source and its side-car variable directories
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRef {
    /// Inventory YAML file
    #[serde(default, deserialize_with = "null_as_default")]
    pub path: PathBuf,
    /// Directory holding `<group>/**` variable files
    #[serde(default, deserialize_with = "null_as_default")]
    pub group_vars: PathBuf,
    /// Directory holding `<host>/**` variable files
    #[serde(default, deserialize_with = "null_as_default")]
    pub host_vars: PathBuf,
    /// Password for vault scalars in the inventory and side-car files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vault_password: Option<String>,
    #[serde(skip)]
    defaulted: DefaultedDirs,
}

/// Which side-car dirs were derived from the inventory location
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct DefaultedDirs {
    group_vars: bool,
    host_vars: bool,
}

impl InventoryRef {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Set the side-car directories
    pub fn with_dirs(mut self, group_vars: impl Into<PathBuf>, host_vars: impl Into<PathBuf>) -> Self {
        self.group_vars = group_vars.into();
        self.host_vars = host_vars.into();
        self.defaulted = DefaultedDirs::default();
        self
    }

    /// Set the vault password
    pub fn with_vault_password(mut self, password: impl Into<String>) -> Self {
        self.vault_password = Some(password.into());
        self
    }

    fn is_blank(&self) -> bool {
        self.path.as_os_str().is_empty()
            && self.group_vars.as_os_str().is_empty()
            && self.host_vars.as_os_str().is_empty()
            && self.vault_password.as_deref().map_or(true, str::is_empty)
    }

    /// Unset side-car directories default to `group_vars`/`host_vars` next to
    /// the inventory file.
    pub(crate) fn fill_default_dirs(&mut self) {
        let base = self.path.parent().map(Path::to_path_buf).unwrap_or_default();
        if self.group_vars.as_os_str().is_empty() {
            self.group_vars = base.join("group_vars");
            self.defaulted.group_vars = true;
        }
        if self.host_vars.as_os_str().is_empty() {
            self.host_vars = base.join("host_vars");
            self.defaulted.host_vars = true;
        }
    }

    /// Point at another inventory file. Defaulted side-car dirs follow it;
    /// dirs that were set explicitly stay put.
    pub(crate) fn relocate(&mut self, path: PathBuf) {
        self.path = path;
        if self.defaulted.group_vars {
            self.group_vars = PathBuf::new();
        }
        if self.defaulted.host_vars {
            self.host_vars = PathBuf::new();
        }
        self.fill_default_dirs();
    }
}

/// A whole-file vault and its password
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultRef {
    #[serde(default, deserialize_with = "null_as_default")]
    pub path: PathBuf,
    #[serde(default, deserialize_with = "null_as_default")]
    pub password: String,
}

impl VaultRef {
    pub fn new(path: impl Into<PathBuf>, password: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            password: password.into(),
        }
    }

    fn is_complete(&self) -> bool {
        !self.path.as_os_str().is_empty() && !self.password.is_empty()
    }
}

/// A free-standing variable file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VarFileRef {
    #[serde(default, deserialize_with = "null_as_default")]
    pub path: PathBuf,
    /// Password for vault scalars inside this file only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vault_password: Option<String>,
}

impl VarFileRef {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            vault_password: None,
        }
    }

    /// Set the vault password
    pub fn with_vault_password(mut self, password: impl Into<String>) -> Self {
        self.vault_password = Some(password.into());
        self
    }
}

/// The extension descriptor naming every variable source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionConfig {
    /// Group names excluded from resolution
    #[serde(default, deserialize_with = "null_as_default")]
    pub limits: Vec<String>,
    /// `None` when no inventory is configured
    #[serde(default)]
    pub inventory: Option<InventoryRef>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub vaults: Vec<VaultRef>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub var_files: Vec<VarFileRef>,
}

impl ExtensionConfig {
    /// Load, normalise and validate a descriptor file.
    pub fn load(path: impl AsRef<Path>) -> LoaderResult<Self> {
        let config = Self::read(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and normalise a descriptor without validating it, so that
    /// overrides can still be applied.
    pub fn read(path: impl AsRef<Path>) -> LoaderResult<Self> {
        let path = path.as_ref();
        require_file(path, "config file")?;
        let text = read_text(path)?;
        let config = Self::parse(&text, path)?;
        tracing::debug!(config = %path.display(), "read extension config");
        Ok(config)
    }

    /// Parse a descriptor from YAML text (normalised, not validated).
    pub fn from_yaml(text: &str) -> LoaderResult<Self> {
        Self::parse(text, Path::new("<inline>"))
    }

    fn parse(text: &str, source: &Path) -> LoaderResult<Self> {
        let value: serde_yaml::Value =
            serde_yaml::from_str(text).map_err(|e| LoaderError::parse(source, e.to_string()))?;
        if value.is_null() {
            return Ok(Self::default());
        }
        let config: ExtensionConfig =
            serde_yaml::from_value(value).map_err(|e| LoaderError::parse(source, e.to_string()))?;
        Ok(config.normalized())
    }

    /// Canonical form: blank inventory becomes `None`, empty passwords become
    /// `None`, `~/` is expanded and empty limit names are dropped.
    pub fn normalized(mut self) -> Self {
        self.inventory = self.inventory.filter(|inv| !inv.is_blank()).map(|mut inv| {
            inv.path = expand_home(&inv.path);
            inv.group_vars = expand_home(&inv.group_vars);
            inv.host_vars = expand_home(&inv.host_vars);
            inv.vault_password = non_empty(inv.vault_password);
            inv.fill_default_dirs();
            inv
        });
        for vault in &mut self.vaults {
            vault.path = expand_home(&vault.path);
        }
        for file in &mut self.var_files {
            file.path = expand_home(&file.path);
            file.vault_password = non_empty(file.vault_password.take());
        }
        self.limits = self
            .limits
            .into_iter()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();
        self
    }

    /// Check that the descriptor names a coherent set of sources.
    pub fn validate(&self) -> LoaderResult<()> {
        for vault in &self.vaults {
            if vault.path.as_os_str().is_empty() {
                return Err(LoaderError::validation("vault entry has no path"));
            }
            if vault.password.is_empty() {
                return Err(LoaderError::validation(format!(
                    "vault password required when vault path is set ({})",
                    vault.path.display()
                )));
            }
        }

        let has_inventory = self.inventory.is_some();
        let has_valid_vault = self.vaults.iter().any(VaultRef::is_complete);
        let has_var_files = !self.var_files.is_empty();

        if !has_inventory && !has_valid_vault && !has_var_files {
            return Err(LoaderError::validation(
                "at least one of inventory, vaults (with path and password), or var_files must be set",
            ));
        }

        if !self.limits.is_empty() && !has_inventory {
            return Err(LoaderError::validation("an inventory must be set if limits are specified"));
        }

        Ok(())
    }
}

impl From<InventoryRef> for ExtensionConfig {
    fn from(inventory: InventoryRef) -> Self {
        Self {
            inventory: Some(inventory),
            ..Self::default()
        }
    }
}
