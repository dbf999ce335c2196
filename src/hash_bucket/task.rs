// In: src/hash_bucket/task.rs

//! The schedulable hash-bucket task.
//!
//! A task is stateless: it borrows its collaborators, reads the manifests it is
//! given, and either places every group or fails. Re-running it with the same
//! inputs produces the same bucket partition, so the orchestrator can retry a
//! failed task wholesale.

use std::time::Instant;

use crate::config::HashBucketConfig;
use crate::error::BucketError;
use crate::hash_bucket::aggregator::group_file_records_by_pk_hash_bucket;
use crate::placement::{GroupAssembler, GroupPlacementIndex, ObjectRef};
use crate::primary_key::{BucketIndexAssigner, DigestModuloAssigner};
use crate::storage::DeltaStorage;
use crate::types::AnnotatedDeltaManifest;

/// **CONTRACT:** The two outputs of one task.
///
/// The placement index is small and is what the merge planner needs; the
/// object reference list can be large and is only needed to keep the placed
/// objects alive. Each can be taken without the other via [`Self::into_parts`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashBucketResult {
    pub hash_bucket_group_to_placement: GroupPlacementIndex,
    pub object_refs: Vec<ObjectRef>,
}

impl HashBucketResult {
    pub fn into_parts(self) -> (GroupPlacementIndex, Vec<ObjectRef>) {
        (self.hash_bucket_group_to_placement, self.object_refs)
    }
}

/// A hash-bucket task bound to its collaborators.
pub struct HashBucketTask<'a> {
    storage: &'a dyn DeltaStorage,
    assembler: &'a dyn GroupAssembler,
    assigner: &'a dyn BucketIndexAssigner,
}

impl<'a> HashBucketTask<'a> {
    /// A task using the default digest-modulo bucket assignment.
    pub fn new(storage: &'a dyn DeltaStorage, assembler: &'a dyn GroupAssembler) -> Self {
        Self {
            storage,
            assembler,
            assigner: &DigestModuloAssigner,
        }
    }

    pub fn with_bucket_assigner(mut self, assigner: &'a dyn BucketIndexAssigner) -> Self {
        self.assigner = assigner;
        self
    }

    /// Buckets the rows of `annotated_delta_manifests` and places the groups.
    pub fn run(
        &self,
        annotated_delta_manifests: &[AnnotatedDeltaManifest],
        config: &HashBucketConfig,
    ) -> Result<HashBucketResult, BucketError> {
        config.validate()?;

        log::info!(
            "Starting hash bucket task: manifests={} num_buckets={} num_groups={}",
            annotated_delta_manifests.len(),
            config.num_buckets,
            config.num_groups
        );
        let start = Instant::now();

        let sort_key_names = config.sort_key_names();
        let delta_file_envelope_groups = group_file_records_by_pk_hash_bucket(
            annotated_delta_manifests,
            config.num_buckets,
            &config.column_names,
            &config.primary_keys,
            &sort_key_names,
            self.storage,
            self.assigner,
        )?;

        if delta_file_envelope_groups.is_none() {
            log::info!("Hash bucket task received no delta manifests");
        }

        let (hash_bucket_group_to_placement, object_refs) = self.assembler.place(
            delta_file_envelope_groups,
            config.num_buckets,
            config.num_groups,
        )?;

        log_metric!(
            "event" = "hash_bucket_task",
            "placed_groups" = object_refs.len(),
            "elapsed" = format!("{:.2?}", start.elapsed())
        );
        log::info!(
            "Finished hash bucket task: placed {} of {} groups in {:.2?}",
            object_refs.len(),
            config.num_groups,
            start.elapsed()
        );
        Ok(HashBucketResult {
            hash_bucket_group_to_placement,
            object_refs,
        })
    }
}

/// Runs one hash-bucket task with the default bucket assignment.
pub fn hash_bucket(
    annotated_delta_manifests: &[AnnotatedDeltaManifest],
    config: &HashBucketConfig,
    storage: &dyn DeltaStorage,
    assembler: &dyn GroupAssembler,
) -> Result<HashBucketResult, BucketError> {
    HashBucketTask::new(storage, assembler).run(annotated_delta_manifests, config)
}
