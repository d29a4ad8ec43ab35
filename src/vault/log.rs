//! The operation log: full history of a vault and its convergent merge.
//!
//! Merging two logs takes the set union of their operations and sorts it
//! by the total order on `Operation`.  Union is commutative, associative
//! and idempotent, and the order is a function of content alone, so any
//! number of replicas merged pairwise in any order end up with the same
//! log and therefore the same replayed tree.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::{debug, warn};

use super::operation::Operation;
use super::tree::CategoryTree;

/// Ordered sequence of operations, append-only during normal use.
///
/// Serialized as a plain sequence of operations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationLog {
    entries: Vec<Operation>,

    /// Content digests of `entries`, for constant-time duplicate checks.
    digests: HashSet<[u8; 32]>,

    /// Largest `event_time` in `entries`.
    latest_time: Option<i64>,
}

/// Outcome of replaying a log into a fresh tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Replay {
    pub tree: CategoryTree,
    /// Operations that could not be applied and were skipped.
    pub skipped: Vec<Operation>,
}

impl OperationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Operation> + ExactSizeIterator {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&Operation> {
        self.entries.last()
    }

    /// Largest event time recorded, if any.
    pub fn latest_time(&self) -> Option<i64> {
        self.latest_time
    }

    pub fn contains(&self, op: &Operation) -> bool {
        self.digests.contains(&op.digest())
    }

    /// Append `op`.  Returns `false` if an identical operation was
    /// already recorded, in which case the log is unchanged.
    pub fn push(&mut self, op: Operation) -> bool {
        if !self.digests.insert(op.digest()) {
            return false;
        }
        self.latest_time = self.latest_time.max(Some(op.event_time()));
        self.entries.push(op);
        true
    }

    /// Sorted, deduplicated union of `self` and `other`.
    pub fn merge(&self, other: &OperationLog) -> OperationLog {
        let union: BTreeSet<&Operation> = self.entries.iter().chain(other.entries.iter()).collect();
        union.into_iter().cloned().collect()
    }

    /// Rebuild a tree from empty by applying every operation in log order.
    ///
    /// An operation that fails against the state built so far (an edit of
    /// an entry that does not exist yet, or a category/entry clash between
    /// replicas) is skipped.  Which operations are skipped depends only on
    /// the log's content and order.
    pub fn replay(&self) -> Replay {
        let mut replay = Replay::default();
        for op in &self.entries {
            if let Err(e) = op.apply(&mut replay.tree) {
                warn!(operation = %op, error = %e, "skipping operation during replay");
                replay.skipped.push(op.clone());
            }
        }
        debug!(
            applied = self.entries.len() - replay.skipped.len(),
            skipped = replay.skipped.len(),
            "replayed operation log"
        );
        replay
    }
}

impl FromIterator<Operation> for OperationLog {
    fn from_iter<I: IntoIterator<Item = Operation>>(iter: I) -> Self {
        let mut log = OperationLog::new();
        for op in iter {
            log.push(op);
        }
        log
    }
}

impl Serialize for OperationLog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.entries.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for OperationLog {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<Operation>::deserialize(deserializer).map(|ops| ops.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a OperationLog {
    type Item = &'a Operation;
    type IntoIter = std::slice::Iter<'a, Operation>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
