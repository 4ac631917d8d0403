//! File access helpers shared by the loaders
//!
//! Required sources go through [`require_file`], which turns absence into a
//! hard `NotFound`. Optional per-node directories are handled separately by
//! the side-car resolver, which treats absence as "no variables".

use std::fs;
use std::path::{Path, PathBuf};

use serde_yaml::Value;

use crate::error::{LoaderError, LoaderResult};
use crate::types::{var_map_from_mapping, VarMap};

/// Fail with `NotFound` unless `path` is set and exists.
pub fn require_file(path: &Path, what: &str) -> LoaderResult<()> {
    if path.as_os_str().is_empty() {
        return Err(LoaderError::not_found(format!("{} path is empty", what), path));
    }
    if !path.exists() {
        return Err(LoaderError::not_found(what, path));
    }
    Ok(())
}

/// Read the raw bytes of a file that is known to exist. Only a failed read
/// is an `Io` error.
pub fn read_bytes(path: &Path) -> LoaderResult<Vec<u8>> {
    fs::read(path).map_err(|e| LoaderError::io(path, e))
}

/// Read a YAML source file. Content that is not UTF-8 is a `Parse` error.
pub fn read_text(path: &Path) -> LoaderResult<String> {
    String::from_utf8(read_bytes(path)?)
        .map_err(|e| LoaderError::parse(path, format!("file is not valid UTF-8: {}", e.utf8_error())))
}

/// Parse YAML text as a variable map.
///
/// An empty document yields an empty map; any top-level value other than a
/// mapping is a parse error.
pub fn parse_var_map(text: &str, source: &Path) -> LoaderResult<VarMap> {
    let value: Value =
        serde_yaml::from_str(text).map_err(|e| LoaderError::parse(source, e.to_string()))?;
    match value {
        Value::Null => Ok(VarMap::new()),
        Value::Mapping(mapping) => Ok(var_map_from_mapping(mapping)),
        other => Err(LoaderError::parse(
            source,
            format!("expected a mapping of variables, found {}", value_kind(&other)),
        )),
    }
}

/// Expand a leading `~/` against the user's home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    path.to_path_buf()
}

pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use tempfile::tempdir;

    #[test]
    fn test_require_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("vars.yml");

        let err = require_file(&path, "var file").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = require_file(Path::new(""), "var file").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        fs::write(&path, "a: 1").unwrap();
        assert!(require_file(&path, "var file").is_ok());
    }

    #[test]
    fn test_read_text_rejects_binary_as_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("vars.yml");
        fs::write(&path, b"a: \xff\xfe\n").unwrap();

        let err = read_text(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert_eq!(read_bytes(&path).unwrap(), b"a: \xff\xfe\n");

        fs::write(&path, "a: 1\n").unwrap();
        assert_eq!(read_text(&path).unwrap(), "a: 1\n");
    }

    #[test]
    fn test_read_failure_is_io_error() {
        let dir = tempdir().unwrap();
        // a directory exists but cannot be read as a file
        let err = read_text(dir.path()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_parse_var_map() {
        let source = Path::new("vars.yml");
        assert!(parse_var_map("", source).unwrap().is_empty());
        assert!(parse_var_map("# only a comment\n", source).unwrap().is_empty());

        let vars = parse_var_map("a: 1\nb: two\n", source).unwrap();
        assert_eq!(vars.len(), 2);

        let err = parse_var_map("- a\n- b\n", source).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);

        let err = parse_var_map("a: [unclosed\n", source).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home(Path::new("vars/a.yml")), PathBuf::from("vars/a.yml"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home(Path::new("~/vault.yml")), home.join("vault.yml"));
        }
    }
}
