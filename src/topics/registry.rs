//! # Subscription storage and matching.
//!
//! [`Registry`] owns every live subscription record and answers "which
//! records match topic T?" deterministically.
//!
//! ## Rules
//! - Records are stored in **registration order** and matched in that order,
//!   so dispatch fan-out is stable and `sub_events` snapshots are
//!   reproducible across runs.
//! - Records are immutable after creation; the only mutations are insertion
//!   and removal.
//! - Removal by id or by group is **idempotent**: removing an absent record
//!   is a no-op, never an error.
//!
//! The registry is a pure data structure: no locking, no I/O. The emitter
//! wraps it in a lock and snapshots match results before running user code.

use std::sync::Arc;

use crate::emitter::HandlerRef;
use crate::topics::pattern::Pattern;

/// One stored subscription: a pattern plus its ordered handler chain.
pub struct Record<T> {
    /// Unique id, handed back by `register`.
    pub id: u64,
    /// Group id shared by chained subscriptions; they unsubscribe together.
    pub group: u64,
    /// Parsed, normalized pattern.
    pub pattern: Pattern,
    /// Ordered handler chain, fixed at creation.
    pub handlers: Arc<[HandlerRef<T>]>,
}

/// A match result: the canonical pattern plus a shared handle to its chain.
pub struct Matched<T> {
    /// Canonical pattern string, reported in `sub_events`.
    pub pattern: Arc<str>,
    /// The record's handler chain.
    pub handlers: Arc<[HandlerRef<T>]>,
}

/// Ordered set of subscription records.
pub struct Registry<T> {
    records: Vec<Record<T>>,
    next_id: u64,
    next_group: u64,
}

impl<T> Registry<T> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            next_id: 0,
            next_group: 0,
        }
    }

    /// Mints a fresh group id for a new subscription chain.
    pub fn next_group(&mut self) -> u64 {
        let group = self.next_group;
        self.next_group += 1;
        group
    }

    /// Stores a record and returns its new unique id.
    ///
    /// An all-empty pattern is legal and degenerates to a zero-segment match
    /// point (it matches only topics that normalize to zero segments).
    pub fn register(&mut self, pattern: Pattern, handlers: Arc<[HandlerRef<T>]>, group: u64) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.records.push(Record {
            id,
            group,
            pattern,
            handlers,
        });
        id
    }

    /// Removes the record with the given id, if present.
    pub fn unregister(&mut self, id: u64) {
        self.records.retain(|r| r.id != id);
    }

    /// Removes every record belonging to the given group, if any.
    pub fn unregister_group(&mut self, group: u64) {
        self.records.retain(|r| r.group != group);
    }

    /// Removes all records.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Number of live records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when no records are stored.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns matching records in registration order.
    ///
    /// The returned handles are snapshots: later registry mutations do not
    /// affect them.
    pub fn matches(&self, topic: &[&str]) -> Vec<Matched<T>> {
        self.records
            .iter()
            .filter(|r| r.pattern.matches(topic))
            .map(|r| Matched {
                pattern: r.pattern.canonical().clone(),
                handlers: r.handlers.clone(),
            })
            .collect()
    }
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}
