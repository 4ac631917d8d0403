//! AES256 vault cipher: PBKDF2-SHA256 key derivation, HMAC-SHA256 then
//! AES-256-CTR over PKCS#7-padded plaintext.

use aes::Aes256;
use ctr::cipher::{KeyIvInit, StreamCipher};
use hmac::{Hmac, Mac};
use pbkdf2::pbkdf2_hmac;
use rand_core::{OsRng, RngCore};
use sha2::Sha256;

use crate::error::{LoaderError, LoaderResult};

type Aes256Ctr = ctr::Ctr128BE<Aes256>;
type HmacSha256 = Hmac<Sha256>;

pub(crate) const SALT_LEN: usize = 32;
const KEY_LEN: usize = 32;
const IV_LEN: usize = 16;
const KDF_ITERS: u32 = 10_000;
const BLOCK_LEN: usize = 16;

struct DerivedKeys {
    cipher_key: [u8; KEY_LEN],
    hmac_key: [u8; KEY_LEN],
    iv: [u8; IV_LEN],
}

fn derive_keys(password: &str, salt: &[u8]) -> DerivedKeys {
    let mut material = [0u8; 2 * KEY_LEN + IV_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, KDF_ITERS, &mut material);

    let mut keys = DerivedKeys {
        cipher_key: [0u8; KEY_LEN],
        hmac_key: [0u8; KEY_LEN],
        iv: [0u8; IV_LEN],
    };
    keys.cipher_key.copy_from_slice(&material[..KEY_LEN]);
    keys.hmac_key.copy_from_slice(&material[KEY_LEN..2 * KEY_LEN]);
    keys.iv.copy_from_slice(&material[2 * KEY_LEN..]);
    keys
}

fn apply_keystream(keys: &DerivedKeys, buf: &mut [u8]) -> LoaderResult<()> {
    let mut cipher = Aes256Ctr::new_from_slices(&keys.cipher_key, &keys.iv)
        .map_err(|e| LoaderError::decrypt("vault", format!("cipher init: {}", e)))?;
    cipher.apply_keystream(buf);
    Ok(())
}

fn mac(keys: &DerivedKeys) -> LoaderResult<HmacSha256> {
    <HmacSha256 as Mac>::new_from_slice(&keys.hmac_key)
        .map_err(|e| LoaderError::decrypt("vault", format!("hmac init: {}", e)))
}

fn pad(plaintext: &[u8]) -> Vec<u8> {
    let fill = BLOCK_LEN - plaintext.len() % BLOCK_LEN;
    let mut padded = Vec::with_capacity(plaintext.len() + fill);
    padded.extend_from_slice(plaintext);
    padded.resize(plaintext.len() + fill, fill as u8);
    padded
}

fn unpad(mut padded: Vec<u8>) -> LoaderResult<Vec<u8>> {
    let invalid = || LoaderError::decrypt("vault", "invalid padding");
    let fill = *padded.last().ok_or_else(invalid)? as usize;
    if fill == 0 || fill > BLOCK_LEN || fill > padded.len() {
        return Err(invalid());
    }
    let body_len = padded.len() - fill;
    if padded[body_len..].iter().any(|&b| b as usize != fill) {
        return Err(invalid());
    }
    padded.truncate(body_len);
    Ok(padded)
}

/// Sealed output of [`seal`]
pub(crate) struct Sealed {
    pub salt: Vec<u8>,
    pub hmac: Vec<u8>,
    pub ciphertext: Vec<u8>,
}

/// Encrypt `plaintext` under a fresh random salt.
pub(crate) fn seal(plaintext: &[u8], password: &str) -> LoaderResult<Sealed> {
    let mut salt = vec![0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    seal_with_salt(plaintext, password, salt)
}

fn seal_with_salt(plaintext: &[u8], password: &str, salt: Vec<u8>) -> LoaderResult<Sealed> {
    let keys = derive_keys(password, &salt);
    let mut ciphertext = pad(plaintext);
    apply_keystream(&keys, &mut ciphertext)?;

    let mut mac = mac(&keys)?;
    mac.update(&ciphertext);
    let hmac = mac.finalize().into_bytes().to_vec();

    Ok(Sealed { salt, hmac, ciphertext })
}

/// Verify the HMAC and decrypt. The HMAC is checked before any decryption.
pub(crate) fn open(salt: &[u8], expected_hmac: &[u8], ciphertext: &[u8], password: &str) -> LoaderResult<Vec<u8>> {
    let keys = derive_keys(password, salt);

    let mut mac = mac(&keys)?;
    mac.update(ciphertext);
    mac.verify_slice(expected_hmac)
        .map_err(|_| LoaderError::decrypt("vault", "HMAC mismatch (wrong password or tampered data)"))?;

    let mut plaintext = ciphertext.to_vec();
    apply_keystream(&keys, &mut plaintext)?;
    unpad(plaintext)
}
