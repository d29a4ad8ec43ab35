//! Vault module: the encrypted, event-sourced password store.
//!
//! This module provides:
//! - `Credential` entries and their editable fields (`credential`)
//! - The hierarchical `CategoryTree` (`tree`)
//! - `Operation`s and the mergeable `OperationLog` (`operation`, `log`)
//! - The password file payload and atomic file I/O (`format`)
//! - The high-level `Vault` tying it all together (`store`)

pub mod credential;
pub mod format;
pub mod log;
pub mod operation;
pub mod store;
pub mod tree;

// Re-export the most commonly used items.
pub use credential::{Credential, CredentialField};
pub use log::{OperationLog, Replay};
pub use operation::{AddOperation, EditOperation, Operation};
pub use store::{MergeReport, Vault};
pub use tree::{join_path, parse_path, CategoryTree, Node};
