// In: src/placement/mod.rs

//! Packaging hash buckets into groups and placing them into an object store.
//!
//! Placing every bucket as its own object would create `num_buckets` objects per
//! task. Groups trade that fan-out for fewer, larger objects: bucket `b` lands in
//! group `b % num_groups`, and each non-empty group becomes exactly one object.

pub mod assembler;
pub mod memory;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::BucketError;
use crate::types::DeltaFileEnvelope;

pub use assembler::{hash_bucket_to_group, GroupAssembler, ModuloGroupAssembler};
pub use memory::InMemoryObjectStore;

/// Per-bucket envelope lists for one task, indexed by hash bucket.
pub type HashBucketEnvelopes = Vec<Option<Vec<DeltaFileEnvelope>>>;

/// An opaque handle to an object placed in the object store.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectRef(String);

impl ObjectRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The buckets of one hash bucket group, in a `num_buckets`-slot array so that
/// consumers address buckets by their global index.
#[derive(Debug, Clone, PartialEq)]
pub struct HashBucketGroup {
    group_index: usize,
    buckets: HashBucketEnvelopes,
}

impl HashBucketGroup {
    pub fn new(group_index: usize, num_buckets: usize) -> Self {
        Self {
            group_index,
            buckets: vec![None; num_buckets],
        }
    }

    pub fn group_index(&self) -> usize {
        self.group_index
    }

    pub fn num_buckets(&self) -> usize {
        self.buckets.len()
    }

    pub fn bucket(&self, hash_bucket: usize) -> Option<&[DeltaFileEnvelope]> {
        self.buckets.get(hash_bucket)?.as_deref()
    }

    pub(crate) fn set_bucket(&mut self, hash_bucket: usize, envelopes: Vec<DeltaFileEnvelope>) {
        self.buckets[hash_bucket] = Some(envelopes);
    }

    /// Iterates `(hash_bucket, envelopes)` for populated buckets, ascending.
    pub fn non_empty_buckets(&self) -> impl Iterator<Item = (usize, &[DeltaFileEnvelope])> {
        self.buckets
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| slot.as_deref().map(|envelopes| (idx, envelopes)))
    }
}

/// Where each hash bucket group of one task was placed.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct GroupPlacementIndex {
    slots: Vec<Option<ObjectRef>>,
}

impl GroupPlacementIndex {
    pub fn new(num_groups: usize) -> Self {
        Self {
            slots: vec![None; num_groups],
        }
    }

    pub fn num_groups(&self) -> usize {
        self.slots.len()
    }

    pub fn get(&self, group_index: usize) -> Option<&ObjectRef> {
        self.slots.get(group_index)?.as_ref()
    }

    pub(crate) fn set(&mut self, group_index: usize, obj_ref: ObjectRef) {
        self.slots[group_index] = Some(obj_ref);
    }

    /// Iterates `(group_index, object_ref)` for placed groups, ascending.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &ObjectRef)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| slot.as_ref().map(|obj_ref| (idx, obj_ref)))
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }
}

/// The write/read path of the distributed object store.
pub trait ObjectStore: Send + Sync {
    fn put(&self, group: HashBucketGroup) -> Result<ObjectRef, BucketError>;

    fn get(&self, obj_ref: &ObjectRef) -> Result<Arc<HashBucketGroup>, BucketError>;
}

impl<S: ObjectStore + ?Sized> ObjectStore for Arc<S> {
    fn put(&self, group: HashBucketGroup) -> Result<ObjectRef, BucketError> {
        (**self).put(group)
    }

    fn get(&self, obj_ref: &ObjectRef) -> Result<Arc<HashBucketGroup>, BucketError> {
        (**self).get(obj_ref)
    }
}
