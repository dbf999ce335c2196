//! An in-memory `DeltaStorage`, keyed by manifest entry URI.

use std::sync::{PoisonError, RwLock};

use arrow::record_batch::RecordBatch;
use hashbrown::HashMap;

use super::{project_by_name, DeltaStorage, FileReaderOptions};
use crate::error::BucketError;
use crate::types::AnnotatedDeltaManifest;

/// Serves pre-decoded tables and applies the requested projection.
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    tables: RwLock<HashMap<String, RecordBatch>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) the decoded contents of `uri`.
    pub fn insert(&self, uri: impl Into<String>, table: RecordBatch) -> Result<(), BucketError> {
        let mut tables = self
            .tables
            .write()
            .map_err(|_| BucketError::InternalError("in-memory storage lock poisoned".into()))?;
        tables.insert(uri.into(), table);
        Ok(())
    }

    /// Number of stored tables. A poisoned lock still reports the real count.
    pub fn len(&self) -> usize {
        self.tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DeltaStorage for InMemoryStorage {
    fn download_delta_manifest(
        &self,
        manifest: &AnnotatedDeltaManifest,
        reader_options: &FileReaderOptions,
    ) -> Result<Vec<RecordBatch>, BucketError> {
        let tables = self
            .tables
            .read()
            .map_err(|_| BucketError::InternalError("in-memory storage lock poisoned".into()))?;
        let mut decoded = Vec::with_capacity(manifest.entries().len());
        for entry in manifest.entries() {
            let table = tables.get(&entry.uri).ok_or_else(|| {
                BucketError::storage(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("no object stored at '{}'", entry.uri),
                ))
            })?;
            let options = reader_options.require(entry.content_type)?;
            decoded.push(project_by_name(table, options.projected_columns())?);
        }
        Ok(decoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ContentType, DeltaType, ManifestEntry};
    use arrow::array::{Int64Array, StringArray};
    use arrow::datatypes::{DataType, Field, Schema};
    use std::sync::Arc;

    fn table() -> RecordBatch {
        let schema = Schema::new(vec![
            Field::new("id", DataType::Int64, false),
            Field::new("payload", DataType::Utf8, true),
        ]);
        RecordBatch::try_new(
            Arc::new(schema),
            vec![
                Arc::new(Int64Array::from(vec![1, 2])),
                Arc::new(StringArray::from(vec!["x", "y"])),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_download_projects_requested_columns() {
        let storage = InMemoryStorage::new();
        storage.insert("mem://a", table()).unwrap();
        let manifest = AnnotatedDeltaManifest::for_delta(
            vec![ManifestEntry::new("mem://a", ContentType::Parquet)],
            1,
            DeltaType::Insert,
        );
        let options = FileReaderOptions::for_projection(&[], &["id".to_string()]);
        let tables = storage.download_delta_manifest(&manifest, &options).unwrap();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].num_columns(), 1);
        assert_eq!(tables[0].num_rows(), 2);
    }

    #[test]
    fn test_len_survives_poisoned_lock() {
        let storage = Arc::new(InMemoryStorage::new());
        storage.insert("mem://a", table()).unwrap();

        let poisoner = Arc::clone(&storage);
        let joined = std::thread::spawn(move || {
            let _guard = poisoner.tables.write().unwrap();
            panic!("poison the table map");
        })
        .join();
        assert!(joined.is_err());

        assert_eq!(storage.len(), 1);
        assert!(matches!(
            storage.insert("mem://b", table()),
            Err(BucketError::InternalError(_))
        ));
    }

    #[test]
    fn test_download_unknown_uri_is_storage_error() {
        let storage = InMemoryStorage::new();
        let manifest = AnnotatedDeltaManifest::for_delta(
            vec![ManifestEntry::new("mem://missing", ContentType::Parquet)],
            1,
            DeltaType::Insert,
        );
        let options = FileReaderOptions::for_projection(&[], &["id".to_string()]);
        let result = storage.download_delta_manifest(&manifest, &options);
        assert!(matches!(result, Err(BucketError::Storage(_))));
    }
}
