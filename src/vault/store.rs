//! High-level vault operations used by CLI commands.
//!
//! `Vault` owns the materialized `CategoryTree`, the `OperationLog` that
//! produced it, and the session key used to seal it.  Every mutation is
//! recorded as an operation and applied incrementally.  `merge`, and a
//! commit that lands before the newest recorded operation, rebuild the
//! tree by replay.

use std::path::Path;

use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::crypto::encryption::{seal, unseal};
use crate::crypto::kdf::Argon2Params;
use crate::crypto::keys::SessionKey;
use crate::errors::{PwdSyncError, Result};

use super::credential::{Credential, CredentialField};
use super::format;
use super::log::OperationLog;
use super::operation::{self, AddOperation, EditOperation, Operation};
use super::tree::{join_path, CategoryTree, Node};

/// The main vault handle.  Create one with `Vault::create` or
/// `Vault::open`, then use its methods to manage password entries.
///
/// `Vault::default()` is an empty vault with no key bound; it can be
/// mutated and merged but not saved.
#[derive(Debug, Default)]
pub struct Vault {
    /// Derived key plus salt and params (zeroized on drop).
    key: Option<SessionKey>,

    /// Current state, a cache of `history`.
    tree: CategoryTree,

    /// Every operation ever applied to this vault or merged into it.
    history: OperationLog,
}

/// Summary of a `Vault::merge`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeReport {
    /// Operations in this vault's log before the merge.
    pub before: usize,
    /// Operations in the merged log.
    pub after: usize,
    /// Operations that could not be applied during replay.
    pub skipped: usize,
}

impl MergeReport {
    /// Operations that came only from the other vault.
    pub fn imported(&self) -> usize {
        self.after.saturating_sub(self.before)
    }
}

impl Vault {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Create an empty vault protected by `passphrase`.
    ///
    /// A fresh salt is generated and the key derived right away, so the
    /// passphrase itself is never retained.
    pub fn create(passphrase: &[u8]) -> Result<Self> {
        Self::create_with_params(passphrase, None)
    }

    /// Like `create`, with explicit Argon2 params (`None` for defaults).
    pub fn create_with_params(
        passphrase: &[u8],
        argon2_params: Option<&Argon2Params>,
    ) -> Result<Self> {
        let params = argon2_params.copied().unwrap_or_default();
        let key = SessionKey::derive(passphrase, &params)?;
        Ok(Self {
            key: Some(key),
            ..Self::default()
        })
    }

    /// Open a password file with the default Argon2 params.
    pub fn open(path: &Path, passphrase: &[u8]) -> Result<Self> {
        Self::open_with_params(path, passphrase, None)
    }

    /// Read and decrypt the password file at `path`.
    ///
    /// Fails with `WrongCredential` if the passphrase is wrong or the file
    /// was modified.  The file is never written by this call.
    pub fn open_with_params(
        path: &Path,
        passphrase: &[u8],
        argon2_params: Option<&Argon2Params>,
    ) -> Result<Self> {
        let text = format::read_file(path)?;
        let vault = Self::from_blob(&text, passphrase, argon2_params)?;
        debug!(
            path = %path.display(),
            operations = vault.history.len(),
            "opened password file"
        );
        Ok(vault)
    }

    /// Decrypt a password file's text.
    ///
    /// The stored tree snapshot becomes the live tree as-is; the history
    /// is kept for future merges but not replayed.
    pub fn from_blob(
        text: &str,
        passphrase: &[u8],
        argon2_params: Option<&Argon2Params>,
    ) -> Result<Self> {
        let params = argon2_params.copied().unwrap_or_default();
        let blob = format::dearmor(text)?;
        let (plaintext, key) = unseal(&blob, passphrase, &params)?;
        let plaintext = Zeroizing::new(plaintext);
        let payload = format::decode_payload(&plaintext)?;

        Ok(Self {
            key: Some(key),
            tree: payload.passwords,
            history: payload.history,
        })
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Serialize and seal the vault into password file text.
    pub fn to_blob(&self) -> Result<String> {
        let key = self.key.as_ref().ok_or(PwdSyncError::NoPassphrase)?;
        let plaintext = Zeroizing::new(format::encode_payload(&self.history, &self.tree)?);
        let blob = seal(key, &plaintext)?;
        Ok(format::armor(&blob))
    }

    /// Write the sealed vault to `path` atomically.
    pub fn save(&self, path: &Path) -> Result<()> {
        let text = self.to_blob()?;
        format::write_file(path, &text)?;
        debug!(
            path = %path.display(),
            operations = self.history.len(),
            "saved password file"
        );
        Ok(())
    }

    /// Whether a key is bound, i.e. whether `save` can succeed.
    pub fn has_key(&self) -> bool {
        self.key.is_some()
    }

    /// Drop the session key.  Later saves fail with `NoPassphrase`.
    pub fn forget_key(&mut self) {
        self.key = None;
    }

    /// Re-key the vault under a new passphrase and a fresh salt.
    ///
    /// Takes effect on the next save.  Keeps the current Argon2 params
    /// unless new ones are given.
    pub fn change_passphrase(
        &mut self,
        new_passphrase: &[u8],
        argon2_params: Option<&Argon2Params>,
    ) -> Result<()> {
        let params = argon2_params
            .copied()
            .or_else(|| self.key.as_ref().map(|k| *k.params()))
            .unwrap_or_default();
        self.key = Some(SessionKey::derive(new_passphrase, &params)?);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Apply `op` to the live tree and record it in the history.
    ///
    /// An operation already present in the history is not applied again.
    /// If applying fails, neither the tree nor the history changes.  The
    /// live tree always equals a replay of the history: an operation that
    /// sorts before the newest recorded one is checked against the state
    /// of the operations ordered before it, and the tree is then rebuilt.
    pub fn commit(&mut self, op: Operation) -> Result<()> {
        if self.history.contains(&op) {
            return Ok(());
        }

        if self.history.last().is_some_and(|last| &op < last) {
            let earlier: OperationLog = self.history.iter().filter(|o| *o < &op).cloned().collect();
            let mut tree = earlier.replay().tree;
            op.apply(&mut tree)?;

            let single: OperationLog = std::iter::once(op).collect();
            let merged = self.history.merge(&single);
            let replay = merged.replay();
            debug!(
                operations = merged.len(),
                skipped = replay.skipped.len(),
                "committed out-of-order operation"
            );
            self.history = merged;
            self.tree = replay.tree;
            return Ok(());
        }

        op.apply(&mut self.tree)?;
        debug!(operation = %op, "committed operation");
        self.history.push(op);
        Ok(())
    }

    /// Event time for a new local operation: the current time, or one
    /// past the newest recorded operation if the clock has not moved on.
    ///
    /// Keeps local operations in the order they were made, so replaying
    /// the history reproduces the live tree.
    fn next_event_time(&self) -> i64 {
        let now = operation::now();
        match self.history.latest_time() {
            Some(latest) if latest >= now => latest + 1,
            _ => now,
        }
    }

    /// Add `credential` to the category at `category_path`.
    ///
    /// An existing entry with the same name is overwritten.
    pub fn add<S: AsRef<str>>(&mut self, category_path: &[S], credential: Credential) -> Result<()> {
        let op = AddOperation::new(self.next_event_time(), category_path, credential)?;
        self.commit(op.into())
    }

    /// Like `add`, but fails with `DuplicateRecord` instead of
    /// overwriting an existing entry.
    pub fn add_unique<S: AsRef<str>>(
        &mut self,
        category_path: &[S],
        credential: Credential,
    ) -> Result<()> {
        let mut path: Vec<&str> = category_path.iter().map(AsRef::as_ref).collect();
        path.push(&credential.name);
        if self.tree.get_leaf(&path).is_some() {
            return Err(PwdSyncError::DuplicateRecord(join_path(&path)));
        }
        self.add(category_path, credential)
    }

    /// Set `field` of the entry `record_name` in `category_path` to `value`.
    ///
    /// `field` is one of `username`, `password`, `password2`, `comment`;
    /// anything else fails with `InvalidField`.
    pub fn edit<S: AsRef<str>>(
        &mut self,
        category_path: &[S],
        record_name: &str,
        field: &str,
        value: &str,
    ) -> Result<()> {
        let field: CredentialField = field.parse()?;
        let op = EditOperation::new(self.next_event_time(), category_path, record_name, field, value)?;
        self.commit(op.into())
    }

    /// Merge `other`'s history into this vault and rebuild the tree.
    ///
    /// The tree is replayed from empty over the sorted union of both logs,
    /// so the result is the same whichever side the merge starts from.
    pub fn merge(&mut self, other: &Vault) -> MergeReport {
        let before = self.history.len();
        let merged = self.history.merge(&other.history);
        let replay = merged.replay();

        let report = MergeReport {
            before,
            after: merged.len(),
            skipped: replay.skipped.len(),
        };
        info!(
            before = report.before,
            after = report.after,
            skipped = report.skipped,
            "merged operation logs"
        );

        self.history = merged;
        self.tree = replay.tree;
        report
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// The entry at `path` (categories followed by the entry name).
    pub fn get<S: AsRef<str>>(&self, path: &[S]) -> Option<&Credential> {
        self.tree.get_leaf(path)
    }

    /// Key-ordered view of the category at `path`.
    pub fn list<S: AsRef<str>>(&self, path: &[S]) -> Vec<(&str, &Node)> {
        self.tree.list(path)
    }

    pub fn tree(&self) -> &CategoryTree {
        &self.tree
    }

    pub fn history(&self) -> &OperationLog {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_vault_cannot_save() {
        let mut vault = Vault::default();
        vault
            .add(&["work"], Credential::new("mail", "bob", "s3cret"))
            .unwrap();
        assert!(matches!(vault.to_blob(), Err(PwdSyncError::NoPassphrase)));
    }

    #[test]
    fn failed_commit_changes_nothing() {
        let mut vault = Vault::default();
        vault
            .add(&["work"], Credential::new("mail", "bob", "s3cret"))
            .unwrap();

        let err = vault
            .add(&["work", "mail"], Credential::new("inner", "x", "y"))
            .unwrap_err();
        assert!(matches!(err, PwdSyncError::StructuralConflict(_)));
        assert_eq!(vault.history().len(), 1);
        assert_eq!(vault.tree().credential_count(), 1);
    }

    #[test]
    fn recommitting_a_recorded_operation_is_a_noop() {
        let mut vault = Vault::default();
        let add: Operation = AddOperation::new(1, &["w"], Credential::new("m", "bob", "p"))
            .unwrap()
            .into();
        let edit: Operation = EditOperation::new(2, &["w"], "m", CredentialField::Username, "eve")
            .unwrap()
            .into();

        vault.commit(add.clone()).unwrap();
        vault.commit(edit).unwrap();
        vault.commit(add).unwrap();

        assert_eq!(vault.history().len(), 2);
        assert_eq!(vault.get(&["w", "m"]).unwrap().username, "eve");
    }

    #[test]
    fn add_unique_refuses_existing_entry() {
        let mut vault = Vault::default();
        vault
            .add_unique(&["work"], Credential::new("mail", "bob", "a"))
            .unwrap();
        let err = vault
            .add_unique(&["work"], Credential::new("mail", "eve", "b"))
            .unwrap_err();
        assert!(matches!(err, PwdSyncError::DuplicateRecord(p) if p == "work/mail"));
        assert_eq!(vault.get(&["work", "mail"]).unwrap().username, "bob");
    }

    #[test]
    fn edit_validates_field_before_lookup() {
        let mut vault = Vault::default();
        let err = vault.edit(&["work"], "mail", "url", "x").unwrap_err();
        assert!(matches!(err, PwdSyncError::InvalidField(_)));

        let err = vault.edit(&["work"], "mail", "username", "x").unwrap_err();
        assert!(matches!(err, PwdSyncError::RecordNotFound(_)));
        assert!(vault.history().is_empty());
    }

    #[test]
    fn merge_report_counts_imported_operations() {
        let mut left = Vault::default();
        left.add(&["a"], Credential::new("x", "u", "p")).unwrap();
        let mut right = Vault::default();
        right.add(&["b"], Credential::new("y", "u", "p")).unwrap();
        right.add(&["b"], Credential::new("z", "u", "p")).unwrap();

        let report = left.merge(&right);
        assert_eq!(report.before, 1);
        assert_eq!(report.after, 3);
        assert_eq!(report.imported(), 2);
        assert_eq!(report.skipped, 0);
    }
}
