// In: src/hash_bucket/partitioner.rs

//! The row-level bucket partitioner.
//!
//! Splits one table into at most `num_buckets` sub-tables by primary-key
//! digest. The primary-key columns are dropped once digested; every sub-table
//! keeps the digest column and gains the original row position of each row.

use arrow::array::UInt32Array;
use arrow::compute::take;
use arrow::record_batch::RecordBatch;

use crate::config::validate_bucket_args;
use crate::error::BucketError;
use crate::primary_key::system_columns::{append_pk_hash_column, append_record_idx_column, drop_columns};
use crate::primary_key::{pk_digests, BucketIndexAssigner};

/// Groups the rows of `table` by primary-key hash bucket.
///
/// Returns exactly `num_buckets` slots; slot `b` is `None` when no row of
/// `table` maps to bucket `b`. Rows inside a sub-table keep the order the
/// assigner produced.
///
/// # Errors
/// - `InvalidArgument` for `num_buckets == 0` or an empty key list.
/// - `InvalidSchema` if a primary-key column is missing.
/// - `MissingPrimaryKeyValue` if a primary-key column holds a null.
pub fn group_by_pk_hash_bucket(
    table: RecordBatch,
    num_buckets: usize,
    primary_keys: &[String],
    assigner: &dyn BucketIndexAssigner,
) -> Result<Vec<Option<RecordBatch>>, BucketError> {
    validate_bucket_args(num_buckets, primary_keys)?;

    // generate the primary key digest column
    let table = {
        let digests = pk_digests(&table, primary_keys)?;
        append_pk_hash_column(&table, digests)?
    };

    // drop primary key columns to free up memory
    let table = drop_columns(&table, primary_keys)?;

    let hash_bucket_to_indices = assigner.assign(&table, num_buckets)?;
    if hash_bucket_to_indices.len() != num_buckets {
        return Err(BucketError::InternalError(format!(
            "Bucket assigner returned {} buckets, expected {}",
            hash_bucket_to_indices.len(),
            num_buckets
        )));
    }

    let mut hash_bucket_to_table: Vec<Option<RecordBatch>> = Vec::with_capacity(num_buckets);
    let mut populated = 0usize;
    for indices in &hash_bucket_to_indices {
        if indices.is_empty() {
            hash_bucket_to_table.push(None);
            continue;
        }
        let bucket_table = take_rows(&table, indices)?;
        hash_bucket_to_table.push(Some(append_record_idx_column(&bucket_table, indices)?));
        populated += 1;
    }

    log_metric!(
        "event" = "partition_table",
        "rows" = table.num_rows(),
        "num_buckets" = num_buckets,
        "populated_buckets" = populated
    );
    Ok(hash_bucket_to_table)
}

fn take_rows(table: &RecordBatch, indices: &[u32]) -> Result<RecordBatch, BucketError> {
    let num_rows = table.num_rows();
    if let Some(&bad) = indices.iter().find(|&&idx| idx as usize >= num_rows) {
        return Err(BucketError::InternalError(format!(
            "Bucket assigner returned row {} for a table of {} rows",
            bad, num_rows
        )));
    }
    let indices_array = UInt32Array::from(indices.to_vec());
    let mut new_columns = Vec::with_capacity(table.num_columns());
    for col in table.columns() {
        new_columns.push(take(col.as_ref(), &indices_array, None)?);
    }
    Ok(RecordBatch::try_new(table.schema(), new_columns)?)
}
