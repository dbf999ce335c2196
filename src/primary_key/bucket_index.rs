// In: src/primary_key/bucket_index.rs

//! The bucket-index grouping seam.
//!
//! An assigner reads the digest column of a table and returns, for every hash
//! bucket, the row positions routed to it. The mapping must be a pure function
//! of the digest and `num_buckets` so that every task of a job agrees on it.

use arrow::array::Array;
use arrow::record_batch::RecordBatch;

use super::system_columns::pk_hash_column;
use crate::error::BucketError;

/// Groups row positions by hash bucket.
pub trait BucketIndexAssigner: Send + Sync {
    /// Returns a vector of exactly `num_buckets` row-position lists. Positions
    /// within each list are ascending.
    fn assign(&self, table: &RecordBatch, num_buckets: usize) -> Result<Vec<Vec<u32>>, BucketError>;
}

/// The default assigner: the digest, read as a big-endian unsigned integer,
/// modulo `num_buckets`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DigestModuloAssigner;

impl BucketIndexAssigner for DigestModuloAssigner {
    fn assign(&self, table: &RecordBatch, num_buckets: usize) -> Result<Vec<Vec<u32>>, BucketError> {
        if num_buckets == 0 {
            return Err(BucketError::InvalidArgument(
                "num_buckets must be positive".to_string(),
            ));
        }
        let hashes = pk_hash_column(table)?;
        let mut bucket_to_indices: Vec<Vec<u32>> = vec![Vec::new(); num_buckets];
        for row_idx in 0..hashes.len() {
            let bucket = pk_digest_to_hash_bucket(hashes.value(row_idx), num_buckets);
            bucket_to_indices[bucket].push(row_idx as u32);
        }
        Ok(bucket_to_indices)
    }
}

/// Reduces a digest of any length modulo `num_buckets` without overflow.
pub fn pk_digest_to_hash_bucket(digest: &[u8], num_buckets: usize) -> usize {
    let modulus = num_buckets as u128;
    let remainder = digest
        .iter()
        .fold(0u128, |acc, &byte| (acc * 256 + u128::from(byte)) % modulus);
    remainder as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primary_key::system_columns::append_pk_hash_column;
    use crate::primary_key::PK_DIGEST_LEN;
    use arrow::array::Int32Array;
    use arrow::datatypes::{DataType, Field, Schema};
    use std::sync::Arc;

    #[test]
    fn test_digest_to_bucket_matches_big_endian_modulo() {
        assert_eq!(pk_digest_to_hash_bucket(&[0x01, 0x00], 7), 256 % 7);
        assert_eq!(pk_digest_to_hash_bucket(&[0xff; 8], 1000), (u64::MAX % 1000) as usize);
        assert_eq!(pk_digest_to_hash_bucket(&[0xff; PK_DIGEST_LEN], 1), 0);
    }

    #[test]
    fn test_digest_to_bucket_handles_full_width_digest() {
        // 2^160 - 1 mod 3 == 0 since 2^160 == (2^2)^80 == 1 mod 3.
        assert_eq!(pk_digest_to_hash_bucket(&[0xff; PK_DIGEST_LEN], 3), 0);
        // 2^160 - 1 mod 5: 2^4 == 1 mod 5, 160 % 4 == 0, so 2^160 == 1.
        assert_eq!(pk_digest_to_hash_bucket(&[0xff; PK_DIGEST_LEN], 5), 0);
    }

    #[test]
    fn test_assign_groups_rows_in_ascending_order() {
        let schema = Schema::new(vec![Field::new("v", DataType::Int32, false)]);
        let table = RecordBatch::try_new(
            Arc::new(schema),
            vec![Arc::new(Int32Array::from(vec![0, 1, 2, 3]))],
        )
        .unwrap();
        let mut d0 = [0u8; PK_DIGEST_LEN];
        d0[PK_DIGEST_LEN - 1] = 2;
        let mut d1 = [0u8; PK_DIGEST_LEN];
        d1[PK_DIGEST_LEN - 1] = 1;
        let digests = vec![Ok(d0), Ok(d1), Ok(d0), Ok(d1)];
        let with_hash = append_pk_hash_column(&table, digests).unwrap();

        let buckets = DigestModuloAssigner.assign(&with_hash, 3).unwrap();
        assert_eq!(buckets, vec![vec![], vec![1, 3], vec![0, 2]]);
    }

    #[test]
    fn test_assign_without_digest_column_is_invalid_schema() {
        let schema = Schema::new(vec![Field::new("v", DataType::Int32, false)]);
        let table = RecordBatch::try_new(
            Arc::new(schema),
            vec![Arc::new(Int32Array::from(vec![0]))],
        )
        .unwrap();
        let result = DigestModuloAssigner.assign(&table, 2);
        assert!(matches!(result, Err(BucketError::InvalidSchema(_))));
    }
}
