//! Immutable, timestamped mutations of the category tree.
//!
//! An `Operation` is either an `Add` (write a whole entry) or an `Edit`
//! (change one field of an existing entry).  Operations are totally
//! ordered by `(event_time, content digest)`, so the order of any set of
//! operations depends only on what they contain and never on the order
//! they were collected in.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::credential::{Credential, CredentialField};
use super::tree::{join_path, validate_segment, CategoryTree};
use crate::errors::{PwdSyncError, Result};

/// A single recorded mutation.
///
/// Serialized with an explicit `event` discriminator (`ADD` / `EDIT`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum Operation {
    #[serde(rename = "ADD")]
    Add(AddOperation),
    #[serde(rename = "EDIT")]
    Edit(EditOperation),
}

/// Write a complete entry into a category, creating the category if needed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AddOperation {
    #[serde(rename = "time")]
    event_time: i64,

    #[serde(rename = "categories", with = "path_string")]
    category_path: Vec<String>,

    #[serde(rename = "name")]
    record_name: String,

    #[serde(rename = "pwd")]
    credential: Credential,
}

/// Change a single field of an existing entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EditOperation {
    #[serde(rename = "time")]
    event_time: i64,

    #[serde(rename = "categories", with = "path_string")]
    category_path: Vec<String>,

    #[serde(rename = "name")]
    record_name: String,

    #[serde(rename = "key")]
    field: CredentialField,

    #[serde(rename = "value")]
    new_value: String,
}

/// Current UTC time in whole seconds, the resolution of `event_time`.
pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

fn owned_path<S: AsRef<str>>(path: &[S]) -> Result<Vec<String>> {
    path.iter()
        .map(|segment| {
            validate_segment(segment.as_ref())?;
            Ok(segment.as_ref().to_string())
        })
        .collect()
}

impl AddOperation {
    /// Build an add of `credential` into `category_path` at `event_time`.
    pub fn new<S: AsRef<str>>(
        event_time: i64,
        category_path: &[S],
        credential: Credential,
    ) -> Result<Self> {
        validate_segment(&credential.name)?;
        Ok(Self {
            event_time,
            category_path: owned_path(category_path)?,
            record_name: credential.name.clone(),
            credential,
        })
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// Write the carried entry.  Replaying the same add twice is harmless.
    pub fn apply(&self, tree: &mut CategoryTree) -> Result<()> {
        tree.set_leaf(
            &self.category_path,
            &self.record_name,
            self.credential.clone(),
        )
    }
}

impl EditOperation {
    /// Build an edit of `field` on the entry `record_name` in `category_path`.
    pub fn new<S: AsRef<str>>(
        event_time: i64,
        category_path: &[S],
        record_name: &str,
        field: CredentialField,
        new_value: impl Into<String>,
    ) -> Result<Self> {
        validate_segment(record_name)?;
        Ok(Self {
            event_time,
            category_path: owned_path(category_path)?,
            record_name: record_name.to_string(),
            field,
            new_value: new_value.into(),
        })
    }

    pub fn field(&self) -> CredentialField {
        self.field
    }

    pub fn new_value(&self) -> &str {
        &self.new_value
    }

    /// Assign the new value to the target entry.
    pub fn apply(&self, tree: &mut CategoryTree) -> Result<()> {
        let mut path = self.category_path.clone();
        path.push(self.record_name.clone());
        let credential = tree
            .get_leaf_mut(&path)
            .ok_or_else(|| PwdSyncError::RecordNotFound(join_path(&path)))?;
        credential.set_field(self.field, &self.new_value);
        Ok(())
    }
}

impl Operation {
    pub fn event_time(&self) -> i64 {
        match self {
            Operation::Add(op) => op.event_time,
            Operation::Edit(op) => op.event_time,
        }
    }

    pub fn category_path(&self) -> &[String] {
        match self {
            Operation::Add(op) => &op.category_path,
            Operation::Edit(op) => &op.category_path,
        }
    }

    pub fn record_name(&self) -> &str {
        match self {
            Operation::Add(op) => &op.record_name,
            Operation::Edit(op) => &op.record_name,
        }
    }

    /// `ADD` or `EDIT`, as written on disk.
    pub fn kind(&self) -> &'static str {
        match self {
            Operation::Add(_) => "ADD",
            Operation::Edit(_) => "EDIT",
        }
    }

    /// Full `/`-joined path of the entry this operation targets.
    pub fn target(&self) -> String {
        let mut path = self.category_path().to_vec();
        path.push(self.record_name().to_string());
        join_path(&path)
    }

    pub fn apply(&self, tree: &mut CategoryTree) -> Result<()> {
        match self {
            Operation::Add(op) => op.apply(tree),
            Operation::Edit(op) => op.apply(tree),
        }
    }

    /// Unambiguous byte encoding of the operation's content.
    ///
    /// Every variable-length field is length-prefixed, so two operations
    /// share an encoding only if they are equal.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(128);
        buf.extend_from_slice(self.kind().as_bytes());
        buf.extend_from_slice(&self.event_time().to_be_bytes());
        buf.extend_from_slice(&(self.category_path().len() as u64).to_be_bytes());
        for segment in self.category_path() {
            put(&mut buf, segment);
        }
        put(&mut buf, self.record_name());

        match self {
            Operation::Add(op) => {
                let c = &op.credential;
                put(&mut buf, &c.name);
                put(&mut buf, &c.username);
                put(&mut buf, &c.secret);
                put_optional(&mut buf, c.secret2.as_deref());
                put_optional(&mut buf, c.comment.as_deref());
            }
            Operation::Edit(op) => {
                put(&mut buf, op.field.as_str());
                put(&mut buf, &op.new_value);
            }
        }
        buf
    }

    /// SHA-256 of `canonical_bytes`, the tie-break for equal timestamps.
    pub fn digest(&self) -> [u8; 32] {
        Sha256::digest(self.canonical_bytes()).into()
    }
}

fn put(buf: &mut Vec<u8>, value: &str) {
    buf.extend_from_slice(&(value.len() as u64).to_be_bytes());
    buf.extend_from_slice(value.as_bytes());
}

fn put_optional(buf: &mut Vec<u8>, value: Option<&str>) {
    match value {
        Some(v) => {
            buf.push(1);
            put(buf, v);
        }
        None => buf.push(0),
    }
}

impl Ord for Operation {
    fn cmp(&self, other: &Self) -> Ordering {
        self.event_time()
            .cmp(&other.event_time())
            .then_with(|| self.digest().cmp(&other.digest()))
            .then_with(|| self.canonical_bytes().cmp(&other.canonical_bytes()))
    }
}

impl PartialOrd for Operation {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<AddOperation> for Operation {
    fn from(op: AddOperation) -> Self {
        Operation::Add(op)
    }
}

impl From<EditOperation> for Operation {
    fn from(op: EditOperation) -> Self {
        Operation::Edit(op)
    }
}

/// Secrets are never echoed by `Display`; it is used for history output.
impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<{} at {}: {}>",
            self.kind(),
            self.event_time(),
            self.target()
        )?;
        if let Operation::Edit(op) = self {
            if op.field.is_secret() {
                write!(f, " - {}: ********", op.field)?;
            } else {
                write!(f, " - {}: {}", op.field, op.new_value)?;
            }
        }
        Ok(())
    }
}

/// Serde helpers storing a category path as one `/`-joined string.
mod path_string {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::vault::tree::{join_path, parse_path};

    pub fn serialize<S>(path: &[String], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&join_path(path))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_path(&s).map_err(serde::de::Error::custom)
    }
}
