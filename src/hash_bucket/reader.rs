// In: src/hash_bucket/reader.rs

//! The envelope reader: annotated manifests in, provenance-tagged tables out.

use arrow::record_batch::RecordBatch;

use crate::error::BucketError;
use crate::primary_key::digest::column_names;
use crate::storage::{DeltaStorage, FileReaderOptions};
use crate::types::{AnnotatedDeltaManifest, DeltaFileEnvelope};

/// Decodes every annotated manifest, restricted to `columns_to_read`, and wraps
/// each table with the provenance of its annotation.
///
/// Returns `Ok(None)` when `annotated_delta_manifests` is empty, so callers can
/// tell "nothing to do" apart from "read files that held no rows".
///
/// # Errors
/// - `IntegrityError` if the storage returns a different number of tables
///   than the manifest has annotations.
/// - `InvalidSchema` if a decoded table lacks a projected column.
/// - Storage errors are propagated unchanged.
pub fn read_delta_file_envelopes(
    annotated_delta_manifests: &[AnnotatedDeltaManifest],
    column_names_hint: &[String],
    columns_to_read: &[String],
    storage: &dyn DeltaStorage,
) -> Result<Option<Vec<DeltaFileEnvelope>>, BucketError> {
    if annotated_delta_manifests.is_empty() {
        return Ok(None);
    }

    let reader_options = FileReaderOptions::for_projection(column_names_hint, columns_to_read);

    // Download everything first so a late failure never leaves half-built output.
    let mut tables_and_manifests: Vec<(Vec<RecordBatch>, &AnnotatedDeltaManifest)> =
        Vec::with_capacity(annotated_delta_manifests.len());
    for manifest in annotated_delta_manifests {
        manifest.check_alignment()?;
        let tables = storage.download_delta_manifest(manifest, &reader_options)?;
        let annotations = manifest.annotations();
        if tables.len() != annotations.len() {
            return Err(BucketError::IntegrityError(format!(
                "Length of downloaded delta manifest tables ({}) doesn't match the \
                 length of delta manifest annotations ({})",
                tables.len(),
                annotations.len()
            )));
        }
        for table in &tables {
            ensure_projected_columns(table, columns_to_read)?;
        }
        tables_and_manifests.push((tables, manifest));
    }

    let mut delta_file_envelopes = Vec::new();
    for (tables, manifest) in tables_and_manifests {
        for (table, annotation) in tables.into_iter().zip(manifest.annotations()) {
            log::debug!(
                "Read delta file: stream_position={} file_index={} delta_type={} rows={}",
                annotation.stream_position,
                annotation.file_index,
                annotation.delta_type,
                table.num_rows()
            );
            delta_file_envelopes.push(DeltaFileEnvelope::from_annotation(annotation, table));
        }
    }
    Ok(Some(delta_file_envelopes))
}

fn ensure_projected_columns(table: &RecordBatch, columns_to_read: &[String]) -> Result<(), BucketError> {
    let schema = table.schema();
    for name in columns_to_read {
        if schema.column_with_name(name).is_none() {
            return Err(BucketError::InvalidSchema(format!(
                "Decoded table is missing requested column '{}' (has {:?})",
                name,
                column_names(table)
            )));
        }
    }
    Ok(())
}
