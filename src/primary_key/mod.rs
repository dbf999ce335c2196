//! Everything that turns primary-key values into routing decisions.
//!
//! - `digest`: the per-row SHA-1 of the primary-key tuple.
//! - `system_columns`: the hidden columns this stage appends to tables.
//! - `bucket_index`: the seam that maps digests to hash buckets.

pub mod bucket_index;
pub mod digest;
pub mod system_columns;

pub use bucket_index::{pk_digest_to_hash_bucket, BucketIndexAssigner, DigestModuloAssigner};
pub use digest::{pk_digests, PkDigest, PkDigestIter, PK_BYTES_DELIMITER, PK_DIGEST_LEN};
