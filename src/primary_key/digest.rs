// In: src/primary_key/digest.rs

//! The primary-key digest: a stable, fixed-size shard key for every row.
//!
//! For each row the text of every primary-key value is UTF-8 encoded, the parts
//! are joined with [`PK_BYTES_DELIMITER`] in caller order, and the joined bytes
//! are hashed with SHA-1.
//!
//! Value text follows the Python rendering existing bucket layouts were built
//! with for the types where it differs from Arrow's display form: booleans are
//! `True`/`False` and floats use the shortest round-trip repr (`0.5`, `1.0`,
//! `1e+20`, `1e-05`, `nan`, `inf`). Every other type uses Arrow's display text.
//!
//! The delimiter is not escaped. Two key tuples whose text forms only differ in
//! where the delimiter falls (e.g. `("aL6kl7u5f", "b")` and `("a", "L6kl7u5fb")`)
//! produce the same digest.

use std::fmt::{LowerExp, Write};

use arrow::array::{Array, AsArray, BooleanArray, Float32Array, Float64Array};
use arrow::datatypes::{DataType, Float32Type, Float64Type};
use arrow::record_batch::RecordBatch;
use arrow::util::display::{ArrayFormatter, FormatOptions};
use sha1::{Digest, Sha1};

use crate::error::BucketError;

/// Separates the encoded primary-key values of one row before hashing.
pub const PK_BYTES_DELIMITER: &[u8] = b"L6kl7u5f";

/// Size in bytes of a SHA-1 digest.
pub const PK_DIGEST_LEN: usize = 20;

pub type PkDigest = [u8; PK_DIGEST_LEN];

/// Writes the hashed text of one primary-key column's values.
enum KeyText<'a> {
    Boolean(&'a BooleanArray),
    Float32(&'a Float32Array),
    Float64(&'a Float64Array),
    Display(ArrayFormatter<'a>),
}

impl<'a> KeyText<'a> {
    fn try_new(column: &'a dyn Array, options: &FormatOptions<'a>) -> Result<Self, BucketError> {
        Ok(match column.data_type() {
            DataType::Boolean => KeyText::Boolean(column.as_boolean()),
            DataType::Float32 => KeyText::Float32(column.as_primitive::<Float32Type>()),
            DataType::Float64 => KeyText::Float64(column.as_primitive::<Float64Type>()),
            _ => KeyText::Display(ArrayFormatter::try_new(column, options)?),
        })
    }

    fn write(&self, row: usize, out: &mut String) -> Result<(), BucketError> {
        match self {
            KeyText::Boolean(array) => {
                out.push_str(if array.value(row) { "True" } else { "False" });
                Ok(())
            }
            KeyText::Float32(array) => {
                let value = array.value(row);
                write_python_float(out, value, f64::from(value))
            }
            KeyText::Float64(array) => {
                let value = array.value(row);
                write_python_float(out, value, value)
            }
            KeyText::Display(formatter) => Ok(formatter.value(row).write(out)?),
        }
    }
}

/// Renders a float the way Python's `repr` does: shortest round-trip digits,
/// positional for decimal exponents in `[-4, 16)`, scientific otherwise.
///
/// `value` supplies the digits (so `f32` keeps its own shortest form) and
/// `wide` the special-value checks.
fn write_python_float<T: LowerExp>(out: &mut String, value: T, wide: f64) -> Result<(), BucketError> {
    if wide.is_nan() {
        out.push_str("nan");
        return Ok(());
    }
    if wide.is_infinite() {
        out.push_str(if wide < 0.0 { "-inf" } else { "inf" });
        return Ok(());
    }

    // `{:e}` yields the shortest round-trip digits, e.g. "-1.2345e-5" or "0e0".
    let scientific = format!("{:e}", value);
    let (mantissa, exponent) = scientific.split_once('e').ok_or_else(|| {
        BucketError::InternalError(format!("Unexpected float rendering '{}'", scientific))
    })?;
    let exponent: i32 = exponent.parse().map_err(|_| {
        BucketError::InternalError(format!("Unexpected float exponent in '{}'", scientific))
    })?;
    let (negative, mantissa) = match mantissa.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, mantissa),
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();

    if negative {
        out.push('-');
    }
    if (-4..16).contains(&exponent) {
        if exponent >= 0 {
            let int_len = exponent as usize + 1;
            if digits.len() > int_len {
                out.push_str(&digits[..int_len]);
                out.push('.');
                out.push_str(&digits[int_len..]);
            } else {
                out.push_str(&digits);
                out.extend(std::iter::repeat('0').take(int_len - digits.len()));
                out.push_str(".0");
            }
        } else {
            out.push_str("0.");
            out.extend(std::iter::repeat('0').take((-exponent - 1) as usize));
            out.push_str(&digits);
        }
    } else {
        out.push_str(&digits[..1]);
        if digits.len() > 1 {
            out.push('.');
            out.push_str(&digits[1..]);
        }
        let sign = if exponent < 0 { '-' } else { '+' };
        write!(out, "e{}{:02}", sign, exponent.abs())
            .map_err(|e| BucketError::InternalError(e.to_string()))?;
    }
    Ok(())
}

/// Lazily yields one digest per row of a table, in row order.
pub struct PkDigestIter<'a> {
    key_texts: Vec<KeyText<'a>>,
    row: usize,
    num_rows: usize,
    value_buf: String,
}

impl<'a> Iterator for PkDigestIter<'a> {
    type Item = Result<PkDigest, BucketError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.row >= self.num_rows {
            return None;
        }
        let row = self.row;
        self.row += 1;
        Some(self.digest_row(row))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.num_rows - self.row;
        (remaining, Some(remaining))
    }
}

impl<'a> ExactSizeIterator for PkDigestIter<'a> {}

impl<'a> PkDigestIter<'a> {
    fn digest_row(&mut self, row: usize) -> Result<PkDigest, BucketError> {
        let mut hasher = Sha1::new();
        for (i, key_text) in self.key_texts.iter().enumerate() {
            if i > 0 {
                hasher.update(PK_BYTES_DELIMITER);
            }
            self.value_buf.clear();
            key_text.write(row, &mut self.value_buf)?;
            hasher.update(self.value_buf.as_bytes());
        }
        let mut digest = [0u8; PK_DIGEST_LEN];
        digest.copy_from_slice(&hasher.finalize());
        Ok(digest)
    }
}

/// Builds a digest iterator over `table` for the ordered `primary_keys`.
///
/// # Errors
/// - `InvalidArgument` if `primary_keys` is empty.
/// - `InvalidSchema` if a primary-key column is absent from `table`.
/// - `MissingPrimaryKeyValue` if any primary-key column holds a null. This is
///   checked for every key column before the first digest is produced.
pub fn pk_digests<'a>(
    table: &'a RecordBatch,
    primary_keys: &[String],
) -> Result<PkDigestIter<'a>, BucketError> {
    if primary_keys.is_empty() {
        return Err(BucketError::InvalidArgument(
            "at least one primary key column is required".to_string(),
        ));
    }

    let mut key_columns: Vec<&'a dyn Array> = Vec::with_capacity(primary_keys.len());
    for pk_name in primary_keys {
        let column = table.column_by_name(pk_name).ok_or_else(|| {
            BucketError::InvalidSchema(format!(
                "Primary key column '{}' not found in table columns {:?}",
                pk_name,
                column_names(table)
            ))
        })?;
        ensure_no_nulls(pk_name, column.as_ref())?;
        key_columns.push(column.as_ref());
    }

    let options = FormatOptions::default();
    let key_texts = key_columns
        .into_iter()
        .map(|column| KeyText::try_new(column, &options))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(PkDigestIter {
        key_texts,
        row: 0,
        num_rows: table.num_rows(),
        value_buf: String::new(),
    })
}

fn ensure_no_nulls(pk_name: &str, column: &dyn Array) -> Result<(), BucketError> {
    // `logical_nulls` also catches null-typed columns and nulls hidden in
    // dictionary values.
    if let Some(nulls) = column.logical_nulls() {
        if nulls.null_count() > 0 {
            let row = (0..column.len()).find(|&i| nulls.is_null(i)).unwrap_or(0);
            return Err(BucketError::MissingPrimaryKeyValue {
                column: pk_name.to_string(),
                row,
            });
        }
    }
    Ok(())
}

pub(crate) fn column_names(table: &RecordBatch) -> Vec<String> {
    table
        .schema()
        .fields()
        .iter()
        .map(|field| field.name().clone())
        .collect()
}
