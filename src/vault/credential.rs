//! The `Credential` leaf record and its editable fields.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{PwdSyncError, Result};

/// A single password entry stored at a leaf of the category tree.
///
/// Serialized with the historical field names (`password`, `password2`)
/// so files stay readable by older tooling.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Credential {
    /// Identity of the entry inside its category (e.g. "mail").
    pub name: String,

    pub username: String,

    #[serde(rename = "password")]
    pub secret: String,

    #[serde(
        rename = "password2",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub secret2: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl Credential {
    /// Create a credential with only the required fields set.
    pub fn new(
        name: impl Into<String>,
        username: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            username: username.into(),
            secret: secret.into(),
            secret2: None,
            comment: None,
        }
    }

    /// Builder-style setter for the second secret.
    pub fn with_secret2(mut self, secret2: impl Into<String>) -> Self {
        self.secret2 = Some(secret2.into());
        self
    }

    /// Builder-style setter for the comment.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Read the current value of an editable field.
    pub fn field(&self, field: CredentialField) -> Option<&str> {
        match field {
            CredentialField::Username => Some(&self.username),
            CredentialField::Secret => Some(&self.secret),
            CredentialField::Secret2 => self.secret2.as_deref(),
            CredentialField::Comment => self.comment.as_deref(),
        }
    }

    /// Assign `value` to `field`.
    ///
    /// An empty value clears the optional fields.
    pub fn set_field(&mut self, field: CredentialField, value: &str) {
        let optional = || (!value.is_empty()).then(|| value.to_string());
        match field {
            CredentialField::Username => self.username = value.to_string(),
            CredentialField::Secret => self.secret = value.to_string(),
            CredentialField::Secret2 => self.secret2 = optional(),
            CredentialField::Comment => self.comment = optional(),
        }
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t\t{}", self.name, self.username)
    }
}

/// The fields of a `Credential` that an edit may change.
///
/// `name` is deliberately absent: it is the entry's key in its category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CredentialField {
    #[serde(rename = "username")]
    Username,
    #[serde(rename = "password")]
    Secret,
    #[serde(rename = "password2")]
    Secret2,
    #[serde(rename = "comment")]
    Comment,
}

impl CredentialField {
    /// All editable fields, in display order.
    pub const ALL: [CredentialField; 4] = [
        CredentialField::Username,
        CredentialField::Secret,
        CredentialField::Secret2,
        CredentialField::Comment,
    ];

    /// The name used on disk and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            CredentialField::Username => "username",
            CredentialField::Secret => "password",
            CredentialField::Secret2 => "password2",
            CredentialField::Comment => "comment",
        }
    }

    /// Whether values of this field should be masked in output.
    pub fn is_secret(self) -> bool {
        matches!(self, CredentialField::Secret | CredentialField::Secret2)
    }
}

impl FromStr for CredentialField {
    type Err = PwdSyncError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "username" | "user" => Ok(CredentialField::Username),
            "password" | "secret" => Ok(CredentialField::Secret),
            "password2" | "secret2" => Ok(CredentialField::Secret2),
            "comment" => Ok(CredentialField::Comment),
            _ => Err(PwdSyncError::InvalidField(s.to_string())),
        }
    }
}

impl fmt::Display for CredentialField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
