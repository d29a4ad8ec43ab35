//! Clipboard sink with delayed clear.
//!
//! A copied secret is remembered only by its SHA-256 digest.  After the
//! timeout the clipboard is cleared, but only if it still holds that
//! secret, so anything the user copied in the meantime survives.

use std::thread;
use std::time::Duration;

use arboard::Clipboard;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::errors::{PwdSyncError, Result};

/// Copy `secret`, wait `timeout`, then clear it if it is still there.
pub fn copy_then_clear(secret: &str, timeout: Duration) -> Result<()> {
    let mut clipboard =
        Clipboard::new().map_err(|e| PwdSyncError::ClipboardError(e.to_string()))?;
    clipboard
        .set_text(secret.to_string())
        .map_err(|e| PwdSyncError::ClipboardError(e.to_string()))?;

    let digest = Sha256::digest(secret.as_bytes());
    thread::sleep(timeout);

    // An unreadable clipboard (e.g. now holding an image) is not ours.
    let current = clipboard.get_text().unwrap_or_default();
    if holds_secret(&current, &digest) {
        clipboard
            .set_text(String::new())
            .map_err(|e| PwdSyncError::ClipboardError(e.to_string()))?;
        tracing::debug!("cleared clipboard");
    }
    Ok(())
}

/// Constant-time check that `text` hashes to `digest`.
pub fn holds_secret(text: &str, digest: &[u8]) -> bool {
    Sha256::digest(text.as_bytes())
        .as_slice()
        .ct_eq(digest)
        .into()
}
