// In: src/hash_bucket/aggregator.rs

//! The cross-envelope aggregator.
//!
//! Runs the partitioner on every envelope and collects, per hash bucket, the
//! derived envelopes in input order. Nothing here sorts or merges envelopes:
//! the merge stage relies on stream position, file index and delta type, which
//! are copied verbatim.

use crate::config::{projection_columns, validate_bucket_args};
use crate::error::BucketError;
use crate::hash_bucket::partitioner::group_by_pk_hash_bucket;
use crate::hash_bucket::reader::read_delta_file_envelopes;
use crate::placement::HashBucketEnvelopes;
use crate::primary_key::BucketIndexAssigner;
use crate::storage::DeltaStorage;
use crate::types::{AnnotatedDeltaManifest, DeltaFileEnvelope};

/// Buckets every envelope's rows and merges the results across envelopes.
///
/// The returned vector has `num_buckets` slots; slot `b` lists, in input
/// order, one derived envelope per input envelope that had rows in `b`.
pub fn group_envelopes_by_pk_hash_bucket(
    delta_file_envelopes: Vec<DeltaFileEnvelope>,
    num_buckets: usize,
    primary_keys: &[String],
    assigner: &dyn BucketIndexAssigner,
) -> Result<HashBucketEnvelopes, BucketError> {
    validate_bucket_args(num_buckets, primary_keys)?;
    let mut hb_to_delta_file_envelopes: HashBucketEnvelopes = vec![None; num_buckets];
    for dfe in delta_file_envelopes {
        let (stream_position, file_index, delta_type) =
            (dfe.stream_position(), dfe.file_index(), dfe.delta_type());
        let hash_bucket_to_table =
            group_by_pk_hash_bucket(dfe.into_table(), num_buckets, primary_keys, assigner)?;
        for (hash_bucket, table) in hash_bucket_to_table.into_iter().enumerate() {
            if let Some(table) = table {
                hb_to_delta_file_envelopes[hash_bucket]
                    .get_or_insert_with(Vec::new)
                    .push(DeltaFileEnvelope::of(stream_position, file_index, delta_type, table));
            }
        }
    }
    Ok(hb_to_delta_file_envelopes)
}

/// Reads the annotated manifests and groups their rows by hash bucket.
///
/// Returns `Ok(None)` when there are no manifests.
pub fn group_file_records_by_pk_hash_bucket(
    annotated_delta_manifests: &[AnnotatedDeltaManifest],
    num_hash_buckets: usize,
    column_names: &[String],
    primary_keys: &[String],
    sort_key_names: &[String],
    storage: &dyn DeltaStorage,
    assigner: &dyn BucketIndexAssigner,
) -> Result<Option<HashBucketEnvelopes>, BucketError> {
    validate_bucket_args(num_hash_buckets, primary_keys)?;
    let columns_to_read = projection_columns(primary_keys, sort_key_names);

    // read input objects into a list of delta file envelopes
    let delta_file_envelopes = match read_delta_file_envelopes(
        annotated_delta_manifests,
        column_names,
        &columns_to_read,
        storage,
    )? {
        Some(envelopes) => envelopes,
        None => return Ok(None),
    };

    // group the data by primary key hash value
    group_envelopes_by_pk_hash_bucket(delta_file_envelopes, num_hash_buckets, primary_keys, assigner)
        .map(Some)
}
