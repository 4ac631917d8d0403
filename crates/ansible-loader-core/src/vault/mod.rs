//! Vault decryption (and encryption) for whole files and inline scalars
//!
//! Strings are decrypted selectively: anything starting with
//! [`VAULT_MARKER`], or tagged `!vault` in YAML, is treated as an encrypted
//! scalar; every other string passes through unchanged.

mod cipher;
mod envelope;

use std::path::Path;

use serde_yaml::value::{Tag, TaggedValue};
use serde_yaml::{Mapping, Value};

use crate::error::{LoaderError, LoaderResult};
use crate::files::{parse_var_map, read_bytes, require_file};
use crate::types::VarMap;

pub use envelope::{VaultEnvelope, VAULT_MARKER};

const VAULT_TAG: &str = "vault";

/// Whether a string is a vault envelope
pub fn is_vault_value(value: &str) -> bool {
    value.trim_start().starts_with(VAULT_MARKER)
}

fn require_password(password: &str) -> LoaderResult<()> {
    if password.is_empty() {
        return Err(LoaderError::decrypt("vault", "no vault password configured"));
    }
    Ok(())
}

fn decrypt_bytes(text: &str, password: &str) -> LoaderResult<Vec<u8>> {
    require_password(password)?;
    let envelope = VaultEnvelope::parse(text)?;
    cipher::open(&envelope.salt, &envelope.hmac, &envelope.ciphertext, password)
}

fn plaintext_to_string(plaintext: Vec<u8>, source: &Path) -> LoaderResult<String> {
    String::from_utf8(plaintext).map_err(|e| {
        LoaderError::parse(source, format!("decrypted plaintext is not valid UTF-8: {}", e.utf8_error()))
    })
}

/// Decrypt envelope text to its plaintext.
///
/// Plaintext that is not UTF-8 is a `Parse` error: the envelope opened but
/// its content is malformed.
pub fn decrypt_text(text: &str, password: &str) -> LoaderResult<String> {
    plaintext_to_string(decrypt_bytes(text, password)?, Path::new("<vault scalar>"))
}

/// Decrypt a scalar if it carries the vault marker; return it unchanged otherwise.
pub fn decrypt_scalar(value: &str, password: &str) -> LoaderResult<String> {
    if !is_vault_value(value) {
        return Ok(value.to_string());
    }
    decrypt_text(value, password).map_err(|e| e.in_context("inline scalar"))
}

/// Encrypt plaintext into envelope text (format 1.2 when a vault id is given).
pub fn encrypt(plaintext: &str, password: &str, vault_id: Option<&str>) -> LoaderResult<String> {
    require_password(password)?;
    let sealed = cipher::seal(plaintext.as_bytes(), password)?;
    let vault_id = vault_id.filter(|id| !id.is_empty()).map(str::to_string);
    let envelope = VaultEnvelope {
        version: if vault_id.is_some() { "1.2" } else { "1.1" }.to_string(),
        vault_id,
        salt: sealed.salt,
        hmac: sealed.hmac,
        ciphertext: sealed.ciphertext,
    };
    Ok(envelope.to_text())
}

/// Decrypt a whole vault file and parse its plaintext as variables.
pub fn decrypt_file(path: &Path, password: &str) -> LoaderResult<VarMap> {
    require_file(path, "vault file")?;
    let context = format!("vault file {}", path.display());
    let text = String::from_utf8(read_bytes(path)?)
        .map_err(|_| LoaderError::decrypt(context.as_str(), "vault file is not a text envelope"))?;
    let plaintext = decrypt_bytes(&text, password).map_err(|e| e.in_context(context))?;
    parse_var_map(&plaintext_to_string(plaintext, path)?, path)
}

/// Decrypt every vault scalar found anywhere in `value`.
///
/// Mappings and sequences are walked recursively. A vault scalar met while
/// `password` is `None` is a decryption error.
pub fn decrypt_value_tree(value: Value, password: Option<&str>) -> LoaderResult<Value> {
    match value {
        Value::String(s) if is_vault_value(&s) => decrypt_scalar(&s, password.unwrap_or_default()).map(Value::String),
        Value::Tagged(tagged) => {
            let TaggedValue { tag, value } = *tagged;
            if !is_vault_tag(&tag) {
                let value = decrypt_value_tree(value, password)?;
                return Ok(Value::Tagged(Box::new(TaggedValue { tag, value })));
            }
            match value {
                Value::String(s) => decrypt_text(&s, password.unwrap_or_default())
                    .map(Value::String)
                    .map_err(|e| e.in_context("!vault scalar")),
                _ => Err(LoaderError::decrypt("!vault scalar", "tagged value is not a string")),
            }
        }
        Value::Sequence(items) => items
            .into_iter()
            .map(|item| decrypt_value_tree(item, password))
            .collect::<LoaderResult<Vec<_>>>()
            .map(Value::Sequence),
        Value::Mapping(mapping) => mapping
            .into_iter()
            .map(|(k, v)| Ok((k, decrypt_value_tree(v, password)?)))
            .collect::<LoaderResult<Mapping>>()
            .map(Value::Mapping),
        other => Ok(other),
    }
}

/// Decrypt every vault scalar in a variable map.
pub fn decrypt_vars(vars: VarMap, password: Option<&str>) -> LoaderResult<VarMap> {
    vars.into_iter()
        .map(|(k, v)| Ok((k, decrypt_value_tree(v, password)?)))
        .collect()
}

fn is_vault_tag(tag: &Tag) -> bool {
    tag.to_string().trim_start_matches('!') == VAULT_TAG
}
