//! Node.js bindings for the Ansible variable loader via napi-rs

#![deny(clippy::all)]

use napi::bindgen_prelude::*;
use napi_derive::napi;

use ansible_loader_core::config::{load_with_overrides, EnvOverrides};
use ansible_loader_core::resolver::resolve_config;
use ansible_loader_core::types::{
    GroupNode as CoreGroupNode,
    HostNode as CoreHostNode,
    ResolvedVariables as CoreResolvedVariables,
};
use ansible_loader_core::{logging, vault, LoaderError};

fn to_napi_error(err: LoaderError) -> Error {
    Error::from_reason(format!("[{}] {}", err.kind(), err))
}

// ============================================================================
// Result Types
// ============================================================================

// Vars go out as JSON objects so key order follows the document.
fn to_js_json<T: ?Sized + serde::Serialize>(value: &T) -> Result<serde_json::Value> {
    serde_json::to_value(value)
        .map_err(|e| Error::from_reason(format!("[parse] value is not JSON-representable: {}", e)))
}

#[napi(object)]
pub struct HostVars {
    pub name: String,
    #[napi(ts_type = "Record<string, string>")]
    pub vars: serde_json::Value,
}

impl TryFrom<CoreHostNode> for HostVars {
    type Error = Error;

    fn try_from(host: CoreHostNode) -> Result<Self> {
        Ok(Self { vars: to_js_json(&host.vars)?, name: host.name })
    }
}

#[napi(object)]
pub struct GroupVars {
    pub name: String,
    pub hosts: Vec<HostVars>,
    #[napi(ts_type = "Record<string, string>")]
    pub vars: serde_json::Value,
}

impl TryFrom<CoreGroupNode> for GroupVars {
    type Error = Error;

    fn try_from(group: CoreGroupNode) -> Result<Self> {
        Ok(Self {
            vars: to_js_json(&group.vars)?,
            hosts: group.hosts.into_iter().map(HostVars::try_from).collect::<Result<Vec<_>>>()?,
            name: group.name,
        })
    }
}

/// Everything one `getConfig` call resolves
#[napi(object)]
pub struct ResolvedConfig {
    /// Inventory groups left after limits, `all` last
    pub groups: Vec<GroupVars>,
    /// Vault vars overlaid by var-file vars, with their YAML types
    pub global_vars: serde_json::Value,
}

impl TryFrom<CoreResolvedVariables> for ResolvedConfig {
    type Error = Error;

    fn try_from(resolved: CoreResolvedVariables) -> Result<Self> {
        Ok(Self {
            global_vars: to_js_json(&resolved.global_vars)?,
            groups: resolved.groups.into_iter().map(GroupVars::try_from).collect::<Result<Vec<_>>>()?,
        })
    }
}

// ============================================================================
// Resolution
// ============================================================================

fn load_and_resolve(path: &str) -> Result<ResolvedConfig> {
    logging::init();
    let overrides = EnvOverrides::from_env();
    let config = load_with_overrides(path, &overrides).map_err(to_napi_error)?;
    let resolved = resolve_config(&config).map_err(to_napi_error)?;
    ResolvedConfig::try_from(resolved)
}

/// Resolve the extension descriptor at `path`.
///
/// An empty or missing path falls back to `ANSIBLE_LOADER_CONFIG`. Throws on
/// any error; the message starts with the error kind, e.g. `[decrypt]`.
#[napi]
pub fn get_config(path: Option<String>) -> Result<ResolvedConfig> {
    load_and_resolve(path.as_deref().unwrap_or_default())
}

/// Same as `getConfig`, run on a blocking worker thread
#[napi]
pub async fn get_config_async(path: Option<String>) -> Result<ResolvedConfig> {
    let path = path.unwrap_or_default();
    tokio::task::spawn_blocking(move || load_and_resolve(&path))
        .await
        .map_err(|e| Error::from_reason(e.to_string()))?
}

// ============================================================================
// Vault Helpers
// ============================================================================

/// Decrypt a vault scalar; strings without the vault header come back unchanged
#[napi]
pub fn decrypt_string(value: String, password: String) -> Result<String> {
    vault::decrypt_scalar(&value, &password).map_err(to_napi_error)
}

/// Encrypt `plaintext` into vault text (format 1.2 when `vaultId` is given)
#[napi]
pub fn encrypt_string(plaintext: String, password: String, vault_id: Option<String>) -> Result<String> {
    vault::encrypt(&plaintext, &password, vault_id.as_deref()).map_err(to_napi_error)
}

// ============================================================================
// Info
// ============================================================================

#[napi]
pub fn loader_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
