//! Password file format and atomic file I/O.
//!
//! A password file is a single line of standard base64:
//!
//! ```text
//! base64( [salt: 16][nonce: 12][tag: 16][ciphertext] )
//! ```
//!
//! The ciphertext decrypts to a JSON payload:
//!
//! ```text
//! { "history": [ <operation>, ... ], "passwords": { "entries": { ... } } }
//! ```
//!
//! - **history**: the full operation log, each entry tagged by `event`.
//! - **passwords**: snapshot of the materialized category tree, each node
//!   tagged by `kind`.

use std::fs;
use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};

use super::log::OperationLog;
use super::operation::Operation;
use super::tree::{validate_segment, CategoryTree};
use crate::errors::{PwdSyncError, Result};

/// Decrypted contents of a password file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    pub history: OperationLog,
    pub passwords: CategoryTree,
}

/// Borrowed view used when saving, so nothing is cloned.
#[derive(Serialize)]
struct PayloadRef<'a> {
    history: &'a OperationLog,
    passwords: &'a CategoryTree,
}

/// Serialize the history and tree snapshot to JSON bytes.
pub fn encode_payload(history: &OperationLog, passwords: &CategoryTree) -> Result<Vec<u8>> {
    serde_json::to_vec(&PayloadRef { history, passwords })
        .map_err(|e| PwdSyncError::SerializationError(format!("payload: {e}")))
}

/// Parse decrypted JSON bytes back into a `Payload`.
///
/// Rejects a malformed tree snapshot, and any add whose entry name
/// differs from the name it is recorded under.
pub fn decode_payload(bytes: &[u8]) -> Result<Payload> {
    let payload: Payload = serde_json::from_slice(bytes)
        .map_err(|e| PwdSyncError::InvalidVaultFormat(format!("payload JSON: {e}")))?;

    payload.passwords.check_well_formed()?;
    for op in payload.history.iter() {
        validate_segment(op.record_name())
            .map_err(|e| PwdSyncError::InvalidVaultFormat(format!("history: {e}")))?;
        if let Operation::Add(add) = op {
            if add.credential().name != op.record_name() {
                return Err(PwdSyncError::InvalidVaultFormat(format!(
                    "history: add of '{}' carries entry '{}'",
                    op.record_name(),
                    add.credential().name
                )));
            }
        }
    }
    Ok(payload)
}

/// Encode a sealed blob as file text.
pub fn armor(blob: &[u8]) -> String {
    BASE64.encode(blob)
}

/// Decode file text back into a sealed blob.  Surrounding whitespace
/// (e.g. a trailing newline added by an editor) is ignored.
pub fn dearmor(text: &str) -> Result<Vec<u8>> {
    BASE64
        .decode(text.trim())
        .map_err(|e| PwdSyncError::InvalidVaultFormat(format!("not valid base64: {e}")))
}

/// Read a password file as text.
pub fn read_file(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(PwdSyncError::VaultNotFound(path.to_path_buf()));
    }
    Ok(fs::read_to_string(path)?)
}

/// Write a password file to disk **atomically**.
///
/// The text goes to a temp file in the same directory which is then
/// renamed over the target, so readers never see a half-written file.
/// On Unix the file is restricted to owner read/write.
pub fn write_file(path: &Path, text: &str) -> Result<()> {
    let parent = path.parent().unwrap_or(Path::new("."));
    if !parent.as_os_str().is_empty() && !parent.exists() {
        fs::create_dir_all(parent)?;
    }

    let tmp_path = parent.join(format!(
        ".{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy()
    ));

    fs::write(&tmp_path, text)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&tmp_path, fs::Permissions::from_mode(0o600))?;
    }

    fs::rename(&tmp_path, path)?;
    Ok(())
}
