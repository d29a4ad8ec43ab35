//! The session key a vault holds between open and save.
//!
//! A `SessionKey` is the Argon2id output together with the salt and
//! parameters it was derived from.  Holding the salt lets a vault re-seal
//! its data without keeping the passphrase around.

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use super::kdf::{derive_key_with_params, generate_salt, Argon2Params, KEY_LEN, SALT_LEN};
use crate::errors::Result;

/// A derived 32-byte key that zeroes its memory when dropped.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SessionKey {
    key: [u8; KEY_LEN],

    #[zeroize(skip)]
    salt: [u8; SALT_LEN],

    #[zeroize(skip)]
    params: Argon2Params,
}

impl SessionKey {
    /// Derive a key for `passphrase` under a freshly generated salt.
    pub fn derive(passphrase: &[u8], params: &Argon2Params) -> Result<Self> {
        Self::derive_with_salt(passphrase, generate_salt(), params)
    }

    /// Derive a key for `passphrase` under a known salt (e.g. one read
    /// back from a password file).
    pub fn derive_with_salt(
        passphrase: &[u8],
        salt: [u8; SALT_LEN],
        params: &Argon2Params,
    ) -> Result<Self> {
        let key = derive_key_with_params(passphrase, &salt, params)?;
        Ok(Self {
            key,
            salt,
            params: *params,
        })
    }

    /// Access the raw key bytes (e.g. to build a cipher).
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.key
    }

    /// The salt this key was derived with.
    pub fn salt(&self) -> &[u8; SALT_LEN] {
        &self.salt
    }

    /// The Argon2id parameters this key was derived with.
    pub fn params(&self) -> &Argon2Params {
        &self.params
    }
}

impl fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionKey")
            .field("key", &"<redacted>")
            .field("salt", &self.salt)
            .field("params", &self.params)
            .finish()
    }
}
