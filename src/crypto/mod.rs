//! Cryptographic primitives for PwdSync.
//!
//! This module provides:
//! - Argon2id password-based key derivation (`kdf`)
//! - The zeroize-on-drop session key held by an open vault (`keys`)
//! - The AES-256-GCM envelope around the whole password file (`encryption`)

pub mod encryption;
pub mod kdf;
pub mod keys;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{encrypt, decrypt, derive_key, ...};
pub use encryption::{decrypt, encrypt, encrypt_with_params, seal, unseal};
pub use kdf::{derive_key, derive_key_with_params, generate_salt, Argon2Params};
pub use keys::SessionKey;
