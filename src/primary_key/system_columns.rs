//! Hidden columns appended by the hash-bucket stage.
//!
//! Both columns are non-null. The record index refers to the row position in
//! the table the envelope reader decoded, before any bucketing.

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, FixedSizeBinaryArray, FixedSizeBinaryBuilder, Int64Array};
use arrow::record_batch::RecordBatch;
use arrow_schema::{DataType, Field, FieldRef, Schema};

use super::digest::{column_names, PkDigest, PK_DIGEST_LEN};
use crate::error::BucketError;

pub const PK_HASH_COLUMN_NAME: &str = "_sys_pk_hash";
pub const ORDERED_RECORD_IDX_COLUMN_NAME: &str = "_sys_ordered_record_idx";

pub fn pk_hash_field() -> Field {
    Field::new(
        PK_HASH_COLUMN_NAME,
        DataType::FixedSizeBinary(PK_DIGEST_LEN as i32),
        false,
    )
}

pub fn ordered_record_idx_field() -> Field {
    Field::new(ORDERED_RECORD_IDX_COLUMN_NAME, DataType::Int64, false)
}

/// Appends the digest column, consuming exactly one digest per row.
pub fn append_pk_hash_column<I>(table: &RecordBatch, digests: I) -> Result<RecordBatch, BucketError>
where
    I: IntoIterator<Item = Result<PkDigest, BucketError>>,
{
    let mut builder = FixedSizeBinaryBuilder::with_capacity(table.num_rows(), PK_DIGEST_LEN as i32);
    let mut count = 0usize;
    for digest in digests {
        builder.append_value(digest?)?;
        count += 1;
    }
    if count != table.num_rows() {
        return Err(BucketError::InternalError(format!(
            "Produced {} digests for a table of {} rows",
            count,
            table.num_rows()
        )));
    }
    append_column(table, pk_hash_field(), Arc::new(builder.finish()))
}

/// Appends the original row position of every row of `table`.
pub fn append_record_idx_column(
    table: &RecordBatch,
    record_indices: &[u32],
) -> Result<RecordBatch, BucketError> {
    if record_indices.len() != table.num_rows() {
        return Err(BucketError::InternalError(format!(
            "Got {} record indices for a table of {} rows",
            record_indices.len(),
            table.num_rows()
        )));
    }
    let column = Int64Array::from_iter_values(record_indices.iter().map(|&i| i64::from(i)));
    append_column(table, ordered_record_idx_field(), Arc::new(column))
}

pub fn pk_hash_column(table: &RecordBatch) -> Result<&FixedSizeBinaryArray, BucketError> {
    typed_column::<FixedSizeBinaryArray>(table, PK_HASH_COLUMN_NAME)
}

pub fn record_idx_column(table: &RecordBatch) -> Result<&Int64Array, BucketError> {
    typed_column::<Int64Array>(table, ORDERED_RECORD_IDX_COLUMN_NAME)
}

/// Removes the named columns, keeping every other column in order.
pub fn drop_columns(table: &RecordBatch, names: &[String]) -> Result<RecordBatch, BucketError> {
    let schema = table.schema();
    let keep: Vec<usize> = schema
        .fields()
        .iter()
        .enumerate()
        .filter(|(_, field)| !names.iter().any(|name| name == field.name()))
        .map(|(idx, _)| idx)
        .collect();
    Ok(table.project(&keep)?)
}

fn append_column(
    table: &RecordBatch,
    field: Field,
    column: ArrayRef,
) -> Result<RecordBatch, BucketError> {
    let schema = table.schema();
    if schema.column_with_name(field.name()).is_some() {
        return Err(BucketError::InvalidSchema(format!(
            "Column '{}' is reserved but already present in {:?}",
            field.name(),
            column_names(table)
        )));
    }
    let mut fields: Vec<FieldRef> = schema.fields().iter().cloned().collect();
    fields.push(Arc::new(field));
    let mut columns = table.columns().to_vec();
    columns.push(column);
    let new_schema = Schema::new_with_metadata(fields, schema.metadata().clone());
    Ok(RecordBatch::try_new(Arc::new(new_schema), columns)?)
}

fn typed_column<'a, T: Array + 'static>(
    table: &'a RecordBatch,
    name: &str,
) -> Result<&'a T, BucketError> {
    let column = table.column_by_name(name).ok_or_else(|| {
        BucketError::InvalidSchema(format!(
            "System column '{}' not found in {:?}",
            name,
            column_names(table)
        ))
    })?;
    column.as_any().downcast_ref::<T>().ok_or_else(|| {
        BucketError::InvalidSchema(format!(
            "System column '{}' has unexpected type {}",
            name,
            column.data_type()
        ))
    })
}
