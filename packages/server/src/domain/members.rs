//! The live member set.
//!
//! `Members` itself is not synchronized; the registry wraps it in a single
//! lock so that add, remove and a whole broadcast pass are mutually exclusive.

use std::sync::Arc;

use super::{ConnectionId, ConnectionRecord, ConnectionSnapshot};

/// Insertion-order-irrelevant set of connection records, unique by id
#[derive(Debug, Default)]
pub struct Members {
    records: Vec<Arc<ConnectionRecord>>,
}

impl Members {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record. Returns `false` (and leaves the set untouched) when a
    /// record with the same connection id is already present.
    pub fn insert(&mut self, record: Arc<ConnectionRecord>) -> bool {
        if self.contains(record.id()) {
            return false;
        }
        self.records.push(record);
        true
    }

    /// Remove the record with this id. Removing an absent id is a no-op.
    pub fn remove(&mut self, id: ConnectionId) -> Option<Arc<ConnectionRecord>> {
        let index = self.records.iter().position(|r| r.id() == id)?;
        Some(self.records.swap_remove(index))
    }

    pub fn contains(&self, id: ConnectionId) -> bool {
        self.records.iter().any(|r| r.id() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<ConnectionRecord>> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn snapshot(&self) -> Vec<ConnectionSnapshot> {
        self.records.iter().map(|r| r.snapshot()).collect()
    }

    /// Remove and return every record
    pub fn drain(&mut self) -> Vec<Arc<ConnectionRecord>> {
        std::mem::take(&mut self.records)
    }
}
