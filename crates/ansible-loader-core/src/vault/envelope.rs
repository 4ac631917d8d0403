//! Textual vault envelope
//!
//! ```text
//! $ANSIBLE_VAULT;1.1;AES256
//! 33363965326261303234626463623963633531343539616138316433353830356566396130353436
//! ...
//! ```
//!
//! The body is the hex encoding of `hex(salt) "\n" hex(hmac) "\n" hex(ciphertext)`,
//! wrapped at 80 columns. Format 1.2 appends a vault id to the header.

use crate::error::{LoaderError, LoaderResult};

/// Token every vault envelope starts with
pub const VAULT_MARKER: &str = "$ANSIBLE_VAULT";

const CIPHER_AES256: &str = "AES256";
const LINE_WIDTH: usize = 80;

fn bad(message: impl Into<String>) -> LoaderError {
    LoaderError::decrypt("vault", message)
}

/// A parsed envelope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultEnvelope {
    /// Format version, `1.1` or `1.2`
    pub version: String,
    /// Vault id (format 1.2 only)
    pub vault_id: Option<String>,
    pub salt: Vec<u8>,
    pub hmac: Vec<u8>,
    pub ciphertext: Vec<u8>,
}

impl VaultEnvelope {
    /// Parse envelope text (a whole vault file or an inline scalar).
    pub fn parse(text: &str) -> LoaderResult<Self> {
        let mut lines = text.trim().lines().map(str::trim).filter(|l| !l.is_empty());
        let header = lines.next().ok_or_else(|| bad("empty vault data"))?;

        let fields: Vec<&str> = header.split(';').map(str::trim).collect();
        if fields.first() != Some(&VAULT_MARKER) {
            return Err(bad("missing $ANSIBLE_VAULT header"));
        }
        let version = fields.get(1).copied().unwrap_or_default();
        let cipher = fields.get(2).copied().unwrap_or_default();
        let vault_id = match version {
            "1.1" => None,
            "1.2" => fields.get(3).filter(|id| !id.is_empty()).map(|id| id.to_string()),
            other => return Err(bad(format!("unsupported vault format version '{}'", other))),
        };
        if cipher != CIPHER_AES256 {
            return Err(bad(format!("unsupported vault cipher '{}'", cipher)));
        }

        let body: String = lines.collect();
        let inner = hex::decode(&body).map_err(|e| bad(format!("invalid hex body: {}", e)))?;
        let inner = String::from_utf8(inner).map_err(|_| bad("vault body is not text"))?;

        let mut parts = inner.splitn(3, '\n');
        let mut next_part = |name: &str| -> LoaderResult<Vec<u8>> {
            let part = parts.next().ok_or_else(|| bad(format!("vault body is missing the {}", name)))?;
            hex::decode(part.trim()).map_err(|e| bad(format!("invalid hex in {}: {}", name, e)))
        };
        let salt = next_part("salt")?;
        let hmac = next_part("hmac")?;
        let ciphertext = next_part("ciphertext")?;
        if ciphertext.is_empty() {
            return Err(bad("vault ciphertext is empty"));
        }

        Ok(Self {
            version: version.to_string(),
            vault_id,
            salt,
            hmac,
            ciphertext,
        })
    }

    /// Render the envelope text, newline terminated.
    pub fn to_text(&self) -> String {
        let mut header = format!("{};{};{}", VAULT_MARKER, self.version, CIPHER_AES256);
        if let Some(id) = &self.vault_id {
            header.push(';');
            header.push_str(id);
        }

        let inner = format!(
            "{}\n{}\n{}",
            hex::encode(&self.salt),
            hex::encode(&self.hmac),
            hex::encode(&self.ciphertext)
        );
        let body = hex::encode(inner.as_bytes());

        let mut out = header;
        out.push('\n');
        for chunk in body.as_bytes().chunks(LINE_WIDTH) {
            // hex output is ASCII
            out.push_str(std::str::from_utf8(chunk).unwrap_or_default());
            out.push('\n');
        }
        out
    }
}
