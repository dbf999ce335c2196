// In: src/storage/mod.rs

// ====================================================================================
// ARCHITECTURAL OVERVIEW: The Storage Seam
// ====================================================================================
//
// The hash-bucket stage never opens delta files itself. It hands each annotated
// manifest to an injected `DeltaStorage` together with `FileReaderOptions` that
// say, per encoding, which columns to decode:
//
//   CSV (headerless)      -> name every column from `column_names`, keep `include_columns`
//   Parquet/Feather/JSON  -> decode only `columns`
//
// The storage returns one table per manifest entry, in entry order. The reader
// relies on that positional alignment to attach annotations.
//
// ====================================================================================

pub mod local;
pub mod memory;

use std::collections::BTreeMap;

use arrow::record_batch::RecordBatch;

use crate::error::BucketError;
use crate::primary_key::digest::column_names;
use crate::types::{AnnotatedDeltaManifest, ContentType};

pub use local::LocalFileStorage;
pub use memory::InMemoryStorage;

/// Decodes the data files of one annotated delta manifest.
pub trait DeltaStorage: Send + Sync {
    /// Returns exactly one table per manifest entry, in entry order.
    fn download_delta_manifest(
        &self,
        manifest: &AnnotatedDeltaManifest,
        reader_options: &FileReaderOptions,
    ) -> Result<Vec<RecordBatch>, BucketError>;
}

/// Encoding-specific decode options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReaderOptions {
    /// Files without a header: `column_names` names every column in file
    /// order and only `include_columns` are kept.
    Delimited {
        column_names: Vec<String>,
        include_columns: Vec<String>,
    },
    /// Self-describing files: decode only `columns`.
    Columnar { columns: Vec<String> },
}

impl ReaderOptions {
    /// The columns a decoded table must end up with, in output order.
    pub fn projected_columns(&self) -> &[String] {
        match self {
            ReaderOptions::Delimited {
                include_columns, ..
            } => include_columns,
            ReaderOptions::Columnar { columns } => columns,
        }
    }
}

/// Reader options keyed by content type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileReaderOptions {
    by_content_type: BTreeMap<ContentType, ReaderOptions>,
}

impl FileReaderOptions {
    /// Options that restrict every supported encoding to `columns_to_read`.
    pub fn for_projection(column_names: &[String], columns_to_read: &[String]) -> Self {
        let mut by_content_type = BTreeMap::new();
        for content_type in ContentType::ALL {
            let options = if content_type.is_headerless_text() {
                ReaderOptions::Delimited {
                    column_names: column_names.to_vec(),
                    include_columns: columns_to_read.to_vec(),
                }
            } else {
                ReaderOptions::Columnar {
                    columns: columns_to_read.to_vec(),
                }
            };
            by_content_type.insert(content_type, options);
        }
        Self { by_content_type }
    }

    pub fn insert(&mut self, content_type: ContentType, options: ReaderOptions) {
        self.by_content_type.insert(content_type, options);
    }

    pub fn get(&self, content_type: ContentType) -> Option<&ReaderOptions> {
        self.by_content_type.get(&content_type)
    }

    pub fn require(&self, content_type: ContentType) -> Result<&ReaderOptions, BucketError> {
        self.get(content_type)
            .ok_or_else(|| BucketError::UnsupportedContentType(content_type.to_string()))
    }
}

/// Restricts `table` to `columns`, in that order.
pub fn project_by_name(table: &RecordBatch, columns: &[String]) -> Result<RecordBatch, BucketError> {
    let schema = table.schema();
    let mut indices = Vec::with_capacity(columns.len());
    for name in columns {
        let idx = schema.index_of(name).map_err(|_| {
            BucketError::InvalidSchema(format!(
                "Column '{}' not found in decoded table columns {:?}",
                name,
                column_names(table)
            ))
        })?;
        indices.push(idx);
    }
    Ok(table.project(&indices)?)
}
