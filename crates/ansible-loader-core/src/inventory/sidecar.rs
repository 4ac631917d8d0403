//! Group/host variable resolution from side-car directories
//!
//! A node named `N` with side-car directory `D` reads `D/N` (a directory
//! walked recursively, or a single file) plus `D/N.yml` and `D/N.yaml`.
//! When none of them exist the node simply keeps its inline vars. Once a
//! path exists, every file under it must parse and decrypt, otherwise the
//! whole resolution fails.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{LoaderError, LoaderResult};
use crate::files::{parse_var_map, read_text};
use crate::resolver::merge_ordered;
use crate::types::{string_leaves, GroupNode, HostNode, StringVars, VarMap};
use crate::vault::decrypt_vars;

const VAR_FILE_EXTENSIONS: [&str; 2] = ["yml", "yaml"];

/// List the variable files for a node whose vars live at `base` (`D/N`), or
/// `None` when nothing exists.
///
/// Files come back in lexical path order: `D/N/**` (or the plain file `D/N`)
/// first, then `D/N.yml`, then `D/N.yaml`.
pub fn sidecar_files(base: &Path) -> LoaderResult<Option<Vec<PathBuf>>> {
    let mut candidates = vec![base.to_path_buf()];
    candidates.extend(VAR_FILE_EXTENSIONS.iter().map(|ext| {
        let mut path = base.as_os_str().to_os_string();
        path.push(".");
        path.push(ext);
        PathBuf::from(path)
    }));

    let mut files = Vec::new();
    let mut found = false;
    for candidate in candidates {
        if !candidate.exists() {
            continue;
        }
        found = true;
        if candidate.is_dir() {
            walk(&candidate, &mut files)?;
        } else {
            files.push(candidate);
        }
    }

    Ok(found.then_some(files))
}

fn walk(dir: &Path, files: &mut Vec<PathBuf>) -> LoaderResult<()> {
    let mut entries = fs::read_dir(dir)
        .map_err(|e| LoaderError::io(dir, e))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| LoaderError::io(dir, e))?;
    entries.sort();

    for path in entries {
        if path.is_dir() {
            walk(&path, files)?;
        } else {
            files.push(path);
        }
    }
    Ok(())
}

/// Parse, decrypt and merge the side-car files found at `base` (later files
/// win). `None` when nothing exists there.
pub fn load_sidecar_vars(base: &Path, password: Option<&str>) -> LoaderResult<Option<VarMap>> {
    let Some(files) = sidecar_files(base)? else {
        tracing::debug!(path = %base.display(), "no side-car variables, skipping");
        return Ok(None);
    };

    let maps = files
        .iter()
        .map(|path| {
            let vars = parse_var_map(&read_text(path)?, path)?;
            decrypt_vars(vars, password).map_err(|e| e.in_context(path.display().to_string()))
        })
        .collect::<LoaderResult<Vec<_>>>()?;

    tracing::debug!(path = %base.display(), files = files.len(), "loaded side-car variables");
    Ok(Some(merge_ordered(maps)))
}

/// Lay side-car vars over inline vars, then keep string leaves only. A
/// side-car key holding a non-string value masks the inline string.
fn overlay(mut vars: StringVars, sidecar: Option<VarMap>) -> StringVars {
    let Some(sidecar) = sidecar else {
        return vars;
    };
    let strings = string_leaves(&sidecar);
    for key in sidecar.keys().filter(|k| !strings.contains_key(*k)) {
        vars.shift_remove(key);
    }
    vars.extend(strings);
    vars
}

/// Resolve a group's side-car vars on top of its inline vars.
pub fn resolve_group_vars(mut group: GroupNode, password: Option<&str>) -> LoaderResult<GroupNode> {
    let sidecar = load_sidecar_vars(&group.vars_dir(), password)?;
    group.vars = overlay(std::mem::take(&mut group.vars), sidecar);
    Ok(group)
}

/// Resolve a host's side-car vars on top of its inline vars.
pub fn resolve_host_vars(mut host: HostNode, password: Option<&str>) -> LoaderResult<HostNode> {
    let sidecar = load_sidecar_vars(&host.vars_dir(), password)?;
    host.vars = overlay(std::mem::take(&mut host.vars), sidecar);
    Ok(host)
}

/// Resolve every group and every host in the tree.
pub fn resolve_tree(groups: Vec<GroupNode>, password: Option<&str>) -> LoaderResult<Vec<GroupNode>> {
    groups
        .into_iter()
        .map(|group| {
            let mut group = resolve_group_vars(group, password)?;
            group.hosts = std::mem::take(&mut group.hosts)
                .into_iter()
                .map(|host| resolve_host_vars(host, password))
                .collect::<LoaderResult<Vec<_>>>()?;
            Ok(group)
        })
        .collect()
}
