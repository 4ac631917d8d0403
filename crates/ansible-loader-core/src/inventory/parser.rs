//! Inventory YAML → group/host tree
//!
//! Only the `all.children.<group>` level is read:
//!
//! ```yaml
//! all:
//!   children:
//!     web:
//!       hosts:
//!         web1:
//!           http_port: "8080"
//!         web2:
//!       vars:
//!         tier: frontend
//! ```
//!
//! Groups and hosts keep their document order; the synthetic `all` group is
//! appended last.

use std::path::Path;

use serde::Deserialize;
use serde_yaml::{Mapping, Value};

use crate::config::{null_as_default, InventoryRef};
use crate::error::{LoaderError, LoaderResult};
use crate::files::{read_text, require_file, value_kind};
use crate::types::{key_to_string, string_leaves, var_map_from_mapping, GroupNode, HostNode, StringVars};
use crate::vault::decrypt_vars;

#[derive(Debug, Default, Deserialize)]
struct InventoryFile {
    #[serde(default, deserialize_with = "null_as_default")]
    all: AllScope,
}

#[derive(Debug, Default, Deserialize)]
struct AllScope {
    #[serde(default, deserialize_with = "null_as_default")]
    children: Mapping,
}

#[derive(Debug, Default, Deserialize)]
struct GroupDef {
    #[serde(default, deserialize_with = "null_as_default")]
    hosts: Mapping,
    #[serde(default, deserialize_with = "null_as_default")]
    vars: Mapping,
}

/// Parse the inventory file named by `inventory`.
pub fn parse(inventory: &InventoryRef) -> LoaderResult<Vec<GroupNode>> {
    require_file(&inventory.path, "inventory")?;
    let text = read_text(&inventory.path)?;
    parse_str(&text, inventory)
}

/// Parse inventory text; `inventory` supplies the side-car dirs and password.
pub fn parse_str(text: &str, inventory: &InventoryRef) -> LoaderResult<Vec<GroupNode>> {
    let source = inventory.path.as_path();
    let parse_err = |message: String| LoaderError::parse(source, message);

    let document: Value = serde_yaml::from_str(text).map_err(|e| parse_err(e.to_string()))?;
    let file: InventoryFile = if document.is_null() {
        InventoryFile::default()
    } else {
        serde_yaml::from_value(document).map_err(|e| parse_err(e.to_string()))?
    };

    let password = inventory.vault_password.as_deref();
    let mut groups = Vec::with_capacity(file.all.children.len() + 1);

    for (group_key, group_value) in file.all.children {
        let group_name = key_to_string(&group_key)
            .ok_or_else(|| parse_err("group names must be scalars".to_string()))?;
        let def: GroupDef = match group_value {
            Value::Null => GroupDef::default(),
            value @ Value::Mapping(_) => serde_yaml::from_value(value)
                .map_err(|e| parse_err(format!("group '{}': {}", group_name, e)))?,
            other => {
                return Err(parse_err(format!(
                    "group '{}' must be a mapping, found {}",
                    group_name,
                    value_kind(&other)
                )))
            }
        };

        let mut group = GroupNode::new(&group_name, &inventory.group_vars)
            .with_vars(inline_vars(def.vars, password, source)?);

        for (host_key, host_value) in def.hosts {
            let host_name = key_to_string(&host_key)
                .ok_or_else(|| parse_err(format!("host names in group '{}' must be scalars", group_name)))?;
            let host_vars = match host_value {
                Value::Null => StringVars::new(),
                Value::Mapping(mapping) => inline_vars(mapping, password, source)?,
                other => {
                    return Err(parse_err(format!(
                        "host '{}' must be a mapping of variables, found {}",
                        host_name,
                        value_kind(&other)
                    )))
                }
            };
            group.hosts.push(HostNode::new(host_name, &inventory.host_vars).with_vars(host_vars));
        }

        groups.push(group);
    }

    groups.push(GroupNode::all(&inventory.group_vars));
    tracing::debug!(
        inventory = %source.display(),
        groups = groups.len(),
        "parsed inventory"
    );
    Ok(groups)
}

fn inline_vars(mapping: Mapping, password: Option<&str>, source: &Path) -> LoaderResult<StringVars> {
    let context = format!("inventory {}", source.display());
    let vars = decrypt_vars(var_map_from_mapping(mapping), password).map_err(|e| e.in_context(context))?;
    Ok(string_leaves(&vars))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::vault::encrypt;
    use std::path::PathBuf;

    fn inventory() -> InventoryRef {
        InventoryRef::new("inv/prod.yml").with_dirs("inv/group_vars", "inv/host_vars")
    }

    #[test]
    fn test_parse_groups_and_hosts() {
        let yaml = r#"
all:
  children:
    web:
      hosts:
        web1:
          http_port: "8080"
          max_conn: 200
        web2:
      vars:
        tier: frontend
    db:
      hosts:
        db1: {}
"#;
        let groups = parse_str(yaml, &inventory()).unwrap();
        let names: Vec<_> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["web", "db", "all"]);

        let web = &groups[0];
        assert_eq!(web.source_dir, PathBuf::from("inv/group_vars"));
        assert_eq!(web.vars.get("tier").map(String::as_str), Some("frontend"));
        assert_eq!(web.hosts.len(), 2);

        let web1 = web.host("web1").unwrap();
        assert_eq!(web1.source_dir, PathBuf::from("inv/host_vars"));
        assert_eq!(web1.vars.get("http_port").map(String::as_str), Some("8080"));
        // non-string inline values are dropped
        assert!(!web1.vars.contains_key("max_conn"));
        assert!(web.host("web2").unwrap().vars.is_empty());

        let all = groups.last().unwrap();
        assert!(all.is_all());
        assert!(all.hosts.is_empty());
    }

    #[test]
    fn test_empty_and_childless_inventories() {
        for yaml in ["", "all:\n", "all:\n  children:\n", "all:\n  hosts:\n    lonely:\n"] {
            let groups = parse_str(yaml, &inventory()).unwrap();
            assert_eq!(groups.len(), 1, "inventory {:?}", yaml);
            assert!(groups[0].is_all());
        }
    }

    #[test]
    fn test_empty_group() {
        let groups = parse_str("all:\n  children:\n    empty:\n", &inventory()).unwrap();
        assert_eq!(groups[0].name, "empty");
        assert!(groups[0].hosts.is_empty());
    }

    #[test]
    fn test_malformed_structure() {
        for yaml in [
            "all: [a, b]\n",
            "all:\n  children: 5\n",
            "all:\n  children:\n    web: 5\n",
            "all:\n  children:\n    web:\n      hosts:\n        web1: oops\n",
            "all:\n  children:\n    web:\n      hosts: [web1]\n",
            "all: {children: [unclosed\n",
        ] {
            let err = parse_str(yaml, &inventory()).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Parse, "inventory {:?}", yaml);
        }
    }

    #[test]
    fn test_inline_vault_values() {
        let secret = encrypt("s3cret-db-pass", "pw", None).unwrap();
        let indented: String = secret.lines().map(|l| format!("            {}\n", l)).collect();
        let yaml = format!(
            "all:\n  children:\n    db:\n      hosts:\n        db1:\n          db_pass: !vault |\n{}",
            indented
        );

        let groups = parse_str(&yaml, &inventory().with_vault_password("pw")).unwrap();
        let db1 = groups[0].host("db1").unwrap();
        assert_eq!(db1.vars.get("db_pass").map(String::as_str), Some("s3cret-db-pass"));

        let err = parse_str(&yaml, &inventory().with_vault_password("wrong")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decrypt);
    }

    #[test]
    fn test_missing_inventory_file() {
        let err = parse(&InventoryRef::new("does/not/exist.yml")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = parse(&InventoryRef::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_order_is_stable() {
        let yaml = "all:\n  children:\n    zeta:\n    alpha:\n    mid:\n";
        let first = parse_str(yaml, &inventory()).unwrap();
        let second = parse_str(yaml, &inventory()).unwrap();
        assert_eq!(first, second);
        assert_eq!(first[0].name, "zeta");
    }
}
