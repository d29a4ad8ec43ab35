//! Passphrase-keyed AES-256-GCM envelope.
//!
//! Every sealed blob carries what is needed to re-derive its key, followed
//! by the authenticated ciphertext.
//!
//! Layout of the returned byte buffer:
//!   [ 16-byte salt | 12-byte nonce | 16-byte auth tag | ciphertext ]
//!
//! The field widths are part of the file format.  A wrong passphrase is
//! detected only through tag verification; nothing inside the plaintext
//! is trusted for that purpose.

use aes_gcm::aead::{AeadCore, AeadInPlace, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Nonce, Tag};
use zeroize::Zeroize;

use super::kdf::{Argon2Params, SALT_LEN};
use super::keys::SessionKey;
use crate::errors::{PwdSyncError, Result};

/// Size of the AES-256-GCM nonce in bytes.
pub const NONCE_LEN: usize = 12;

/// Size of the AES-256-GCM authentication tag in bytes.
pub const TAG_LEN: usize = 16;

/// Fixed-width prefix in front of the ciphertext.
pub const HEADER_LEN: usize = SALT_LEN + NONCE_LEN + TAG_LEN;

/// Encrypt `plaintext` under `passphrase` with the default Argon2 params.
///
/// A fresh salt and nonce are generated on every call.
pub fn encrypt(plaintext: &[u8], passphrase: &[u8]) -> Result<Vec<u8>> {
    encrypt_with_params(plaintext, passphrase, &Argon2Params::default())
}

/// Encrypt `plaintext` under `passphrase` with explicit Argon2 params.
pub fn encrypt_with_params(
    plaintext: &[u8],
    passphrase: &[u8],
    params: &Argon2Params,
) -> Result<Vec<u8>> {
    let key = SessionKey::derive(passphrase, params)?;
    seal(&key, plaintext)
}

/// Encrypt `plaintext` with an already derived key.
///
/// The key's salt is written into the header so the blob can later be
/// opened from the passphrase alone.  The nonce is always fresh.
pub fn seal(key: &SessionKey, plaintext: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| PwdSyncError::EncryptionFailed(format!("invalid key length: {e}")))?;

    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let mut buffer = plaintext.to_vec();
    let tag = cipher
        .encrypt_in_place_detached(&nonce, b"", &mut buffer)
        .map_err(|e| PwdSyncError::EncryptionFailed(format!("encryption error: {e}")))?;

    let mut output = Vec::with_capacity(HEADER_LEN + buffer.len());
    output.extend_from_slice(key.salt());
    output.extend_from_slice(&nonce);
    output.extend_from_slice(&tag);
    output.extend_from_slice(&buffer);
    buffer.zeroize();
    Ok(output)
}

/// Decrypt a blob produced by `encrypt` using the default Argon2 params.
pub fn decrypt(blob: &[u8], passphrase: &[u8]) -> Result<Vec<u8>> {
    let (plaintext, _key) = unseal(blob, passphrase, &Argon2Params::default())?;
    Ok(plaintext)
}

/// Decrypt a blob and hand back the key it was sealed with.
///
/// Fails with `WrongCredential` if the tag does not verify, which covers
/// both a wrong passphrase and any modification of the blob.
pub fn unseal(
    blob: &[u8],
    passphrase: &[u8],
    params: &Argon2Params,
) -> Result<(Vec<u8>, SessionKey)> {
    if blob.len() < HEADER_LEN {
        return Err(PwdSyncError::WrongCredential);
    }

    let (salt_bytes, rest) = blob.split_at(SALT_LEN);
    let (nonce_bytes, rest) = rest.split_at(NONCE_LEN);
    let (tag_bytes, ciphertext) = rest.split_at(TAG_LEN);

    let mut salt = [0u8; SALT_LEN];
    salt.copy_from_slice(salt_bytes);
    let key = SessionKey::derive_with_salt(passphrase, salt, params)?;

    let cipher =
        Aes256Gcm::new_from_slice(key.as_bytes()).map_err(|_| PwdSyncError::WrongCredential)?;

    let mut buffer = ciphertext.to_vec();
    cipher
        .decrypt_in_place_detached(
            Nonce::from_slice(nonce_bytes),
            b"",
            &mut buffer,
            Tag::from_slice(tag_bytes),
        )
        .map_err(|_| PwdSyncError::WrongCredential)?;

    Ok((buffer, key))
}
