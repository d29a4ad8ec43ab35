use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur in PwdSync.
#[derive(Debug, Error)]
pub enum PwdSyncError {
    // --- Crypto errors ---
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Wrong password or corrupted password file")]
    WrongCredential,

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    #[error("No password bound to this vault; open or create it first")]
    NoPassphrase,

    // --- Store errors ---
    #[error("'{0}' is both a category and a password entry")]
    StructuralConflict(String),

    #[error("Password entry '{0}' not found")]
    RecordNotFound(String),

    #[error("Invalid field '{0}': expected one of: username, password, password2, comment")]
    InvalidField(String),

    #[error("Password entry '{0}' already exists")]
    DuplicateRecord(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    // --- Password file errors ---
    #[error("Password file not found at {0}")]
    VaultNotFound(PathBuf),

    #[error("Password file already exists at {0}")]
    VaultAlreadyExists(PathBuf),

    #[error("Invalid password file format: {0}")]
    InvalidVaultFormat(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- CLI errors ---
    #[error("Clipboard error: {0}")]
    ClipboardError(String),

    #[error("Command failed: {0}")]
    CommandFailed(String),
}

/// Convenience type alias for PwdSync results.
pub type Result<T> = std::result::Result<T, PwdSyncError>;
