// In: src/hash_bucket/mod.rs

// ====================================================================================
// ARCHITECTURAL OVERVIEW: The Hash-Bucket Pipeline
// ====================================================================================
//
// One task turns a set of annotated delta manifests into placed hash bucket
// groups. Data only flows forward:
//
//   1. [Reader (reader.rs)]            AnnotatedDeltaManifest[] + DeltaStorage
//         `-> Vec<DeltaFileEnvelope>   (projected to primary keys + sort keys)
//
//   2. [Partitioner (partitioner.rs)]  one envelope's table
//         `-> Vec<Option<RecordBatch>> (digest column added, pk columns dropped,
//                                       original row position appended)
//
//   3. [Aggregator (aggregator.rs)]    runs (2) per envelope
//         `-> Vec<Option<Vec<DeltaFileEnvelope>>>, provenance copied, input order kept
//
//   4. [Task (task.rs)]                runs (1)+(3), then GroupAssembler::place
//         `-> HashBucketResult { group placement index, object refs }
//
// "No manifests" travels as `None` from (1) through (4), where it becomes an
// empty placement index rather than an error.
//
// ====================================================================================

pub mod aggregator;
pub mod partitioner;
pub mod reader;
pub mod task;

pub use aggregator::{group_envelopes_by_pk_hash_bucket, group_file_records_by_pk_hash_bucket};
pub use partitioner::group_by_pk_hash_bucket;
pub use reader::read_delta_file_envelopes;
pub use task::{hash_bucket, HashBucketResult, HashBucketTask};
