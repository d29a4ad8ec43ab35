//! Hierarchical category tree holding the materialized password entries.
//!
//! Every key maps either to a nested `CategoryTree` or to a `Credential`
//! leaf, never both.  Descending through a leaf or overwriting a category
//! with a leaf is a `StructuralConflict`, and a failed write leaves the
//! tree exactly as it was.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::credential::Credential;
use crate::errors::{PwdSyncError, Result};

/// Separator used when a category path is written as a single string.
pub const PATH_SEPARATOR: char = '/';

/// A value in the tree: a nested category or a password entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Node {
    Category(CategoryTree),
    Credential(Credential),
}

impl Node {
    pub fn as_credential(&self) -> Option<&Credential> {
        match self {
            Node::Credential(c) => Some(c),
            Node::Category(_) => None,
        }
    }

    pub fn as_category(&self) -> Option<&CategoryTree> {
        match self {
            Node::Category(t) => Some(t),
            Node::Credential(_) => None,
        }
    }
}

/// A recursive, key-sorted mapping from path segments to nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTree {
    #[serde(default)]
    entries: BTreeMap<String, Node>,
}

impl CategoryTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of direct children.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Direct children in key order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Return the leaf at `path`, where the last segment is the entry name.
    ///
    /// Absent if any segment is missing or the terminal node is a category.
    pub fn get_leaf<S: AsRef<str>>(&self, path: &[S]) -> Option<&Credential> {
        let (name, container) = path.split_last()?;
        self.subtree(container)?
            .entries
            .get(name.as_ref())
            .and_then(Node::as_credential)
    }

    /// Mutable variant of `get_leaf`.
    pub fn get_leaf_mut<S: AsRef<str>>(&mut self, path: &[S]) -> Option<&mut Credential> {
        let (name, container) = path.split_last()?;
        let mut current = self;
        for segment in container {
            current = match current.entries.get_mut(segment.as_ref())? {
                Node::Category(tree) => tree,
                Node::Credential(_) => return None,
            };
        }
        match current.entries.get_mut(name.as_ref())? {
            Node::Credential(c) => Some(c),
            Node::Category(_) => None,
        }
    }

    /// Return the category at `path` without creating anything.
    ///
    /// The empty path is the root itself.
    pub fn subtree<S: AsRef<str>>(&self, path: &[S]) -> Option<&CategoryTree> {
        let mut current = self;
        for segment in path {
            current = current.entries.get(segment.as_ref())?.as_category()?;
        }
        Some(current)
    }

    /// Walk `path`, creating empty categories for missing segments.
    ///
    /// Fails with `StructuralConflict` if a segment already holds an entry.
    /// Only segments past the first missing one are created, so a failure
    /// never leaves partial categories behind.
    pub fn get_or_create_subtree<S: AsRef<str>>(
        &mut self,
        path: &[S],
    ) -> Result<&mut CategoryTree> {
        for segment in path {
            validate_segment(segment.as_ref())?;
        }

        let mut current = self;
        for (depth, segment) in path.iter().enumerate() {
            let node = current
                .entries
                .entry(segment.as_ref().to_string())
                .or_insert_with(|| Node::Category(CategoryTree::new()));
            current = match node {
                Node::Category(tree) => tree,
                Node::Credential(_) => {
                    return Err(PwdSyncError::StructuralConflict(join_path(
                        &path[..=depth],
                    )))
                }
            };
        }
        Ok(current)
    }

    /// Write `credential` under `name` in the category at `container`.
    ///
    /// An existing entry of the same name is overwritten; an existing
    /// category of that name is a `StructuralConflict`.
    pub fn set_leaf<S: AsRef<str>>(
        &mut self,
        container: &[S],
        name: &str,
        credential: Credential,
    ) -> Result<()> {
        validate_segment(name)?;
        let tree = self.get_or_create_subtree(container)?;
        if let Some(Node::Category(_)) = tree.entries.get(name) {
            let mut full: Vec<&str> = container.iter().map(AsRef::as_ref).collect();
            full.push(name);
            return Err(PwdSyncError::StructuralConflict(join_path(&full)));
        }
        tree.entries
            .insert(name.to_string(), Node::Credential(credential));
        Ok(())
    }

    /// Key-ordered view of the category at `path`.
    ///
    /// A missing path (or one ending at an entry) lists nothing.
    pub fn list<S: AsRef<str>>(&self, path: &[S]) -> Vec<(&str, &Node)> {
        self.subtree(path)
            .map(|tree| tree.entries().collect())
            .unwrap_or_default()
    }

    /// Every entry in the tree with its category path, depth-first in key order.
    pub fn credentials(&self) -> Vec<(Vec<String>, &Credential)> {
        let mut out = Vec::new();
        self.collect_credentials(&mut Vec::new(), &mut out);
        out
    }

    fn collect_credentials<'a>(
        &'a self,
        prefix: &mut Vec<String>,
        out: &mut Vec<(Vec<String>, &'a Credential)>,
    ) {
        for (key, node) in &self.entries {
            match node {
                Node::Credential(c) => out.push((prefix.clone(), c)),
                Node::Category(tree) => {
                    prefix.push(key.clone());
                    tree.collect_credentials(prefix, out);
                    prefix.pop();
                }
            }
        }
    }

    /// Total number of entries at any depth.
    pub fn credential_count(&self) -> usize {
        self.entries
            .values()
            .map(|node| match node {
                Node::Credential(_) => 1,
                Node::Category(tree) => tree.credential_count(),
            })
            .sum()
    }

    /// Case-insensitive substring search over entry name, username and
    /// category path.
    pub fn search(&self, query: &str) -> Vec<(Vec<String>, &Credential)> {
        let needle = query.to_lowercase();
        self.credentials()
            .into_iter()
            .filter(|(categories, c)| {
                c.name.to_lowercase().contains(&needle)
                    || c.username.to_lowercase().contains(&needle)
                    || join_path(categories).to_lowercase().contains(&needle)
            })
            .collect()
    }
}

impl CategoryTree {
    /// Check a tree read from disk: every key must be a valid path
    /// segment and every entry must sit under its own name.
    pub fn check_well_formed(&self) -> Result<()> {
        for (key, node) in &self.entries {
            validate_segment(key)
                .map_err(|e| PwdSyncError::InvalidVaultFormat(format!("password tree: {e}")))?;
            match node {
                Node::Credential(c) if c.name != *key => {
                    return Err(PwdSyncError::InvalidVaultFormat(format!(
                        "entry stored under '{key}' is named '{}'",
                        c.name
                    )));
                }
                Node::Credential(_) => {}
                Node::Category(sub) => sub.check_well_formed()?,
            }
        }
        Ok(())
    }
}

/// Join path segments with `/`.
pub fn join_path<S: AsRef<str>>(segments: &[S]) -> String {
    segments
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("/")
}

/// Split a `/`-separated path into validated segments.
///
/// Leading and trailing separators are ignored; the empty string is the
/// root path.
pub fn parse_path(path: &str) -> Result<Vec<String>> {
    let trimmed = path.trim_matches(PATH_SEPARATOR);
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    trimmed
        .split(PATH_SEPARATOR)
        .map(|segment| {
            validate_segment(segment)?;
            Ok(segment.to_string())
        })
        .collect()
}

/// A segment must be non-empty and must not contain the separator.
pub fn validate_segment(segment: &str) -> Result<()> {
    if segment.is_empty() {
        return Err(PwdSyncError::InvalidPath(
            "path segments cannot be empty".into(),
        ));
    }
    if segment.contains(PATH_SEPARATOR) {
        return Err(PwdSyncError::InvalidPath(format!(
            "'{segment}' contains the path separator '/'"
        )));
    }
    Ok(())
}
