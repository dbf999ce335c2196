// In: src/storage/local.rs

//! A `DeltaStorage` over the local filesystem.
//!
//! Supports headerless CSV (schema inferred, columns named from the job's
//! column list) and Arrow IPC files (`application/feather`). Parquet and JSON
//! deltas are rejected with `UnsupportedContentType`.

use std::fs::File;
use std::io::Seek;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::compute::concat_batches;
use arrow::csv::reader::Format;
use arrow::csv::ReaderBuilder;
use arrow::ipc::reader::FileReader;
use arrow::record_batch::RecordBatch;
use arrow_schema::{Field, Schema, SchemaRef};

use super::{project_by_name, DeltaStorage, FileReaderOptions, ReaderOptions};
use crate::error::BucketError;
use crate::types::{AnnotatedDeltaManifest, ContentType, ManifestEntry};

/// Upper bound on records scanned to infer CSV column types.
const CSV_INFER_MAX_RECORDS: usize = 1_000;

const FILE_URI_SCHEME: &str = "file://";

#[derive(Debug, Clone, Default)]
pub struct LocalFileStorage {
    root: Option<PathBuf>,
}

impl LocalFileStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves relative entry URIs against `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn resolve(&self, uri: &str) -> PathBuf {
        let path = Path::new(uri.strip_prefix(FILE_URI_SCHEME).unwrap_or(uri));
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }

    fn read_entry(
        &self,
        entry: &ManifestEntry,
        reader_options: &FileReaderOptions,
    ) -> Result<RecordBatch, BucketError> {
        let path = self.resolve(&entry.uri);
        let options = reader_options.require(entry.content_type)?;
        log::debug!("Decoding {} as {}", path.display(), entry.content_type);
        match (entry.content_type, options) {
            (
                ContentType::Csv,
                ReaderOptions::Delimited {
                    column_names,
                    include_columns,
                },
            ) => read_csv(&path, column_names, include_columns),
            (ContentType::Feather, options) => read_arrow_ipc(&path, options.projected_columns()),
            (content_type, _) => Err(BucketError::UnsupportedContentType(format!(
                "{} (uri '{}')",
                content_type, entry.uri
            ))),
        }
    }
}

impl DeltaStorage for LocalFileStorage {
    fn download_delta_manifest(
        &self,
        manifest: &AnnotatedDeltaManifest,
        reader_options: &FileReaderOptions,
    ) -> Result<Vec<RecordBatch>, BucketError> {
        manifest
            .entries()
            .iter()
            .map(|entry| self.read_entry(entry, reader_options))
            .collect()
    }
}

fn read_csv(
    path: &Path,
    column_names: &[String],
    include_columns: &[String],
) -> Result<RecordBatch, BucketError> {
    let mut file = File::open(path)?;
    let format = Format::default().with_header(false);

    let schema: Schema = if file.metadata()?.len() == 0 {
        Schema::new(
            column_names
                .iter()
                .map(|name| Field::new(name, arrow_schema::DataType::Utf8, true))
                .collect::<Vec<_>>(),
        )
    } else {
        let (inferred, _) = format.infer_schema(&mut file, Some(CSV_INFER_MAX_RECORDS))?;
        file.rewind()?;
        if inferred.fields().len() != column_names.len() {
            return Err(BucketError::InvalidSchema(format!(
                "CSV file {} has {} columns but {} column names were supplied",
                path.display(),
                inferred.fields().len(),
                column_names.len()
            )));
        }
        let fields: Vec<Field> = inferred
            .fields()
            .iter()
            .zip(column_names)
            .map(|(field, name)| Field::new(name, field.data_type().clone(), true))
            .collect();
        Schema::new(fields)
    };

    let mut projection = Vec::with_capacity(include_columns.len());
    for name in include_columns {
        let idx = column_names.iter().position(|c| c == name).ok_or_else(|| {
            BucketError::InvalidSchema(format!(
                "Column '{}' is not one of the CSV column names {:?}",
                name, column_names
            ))
        })?;
        projection.push(idx);
    }

    let schema: SchemaRef = Arc::new(schema);
    let projected_schema: SchemaRef = Arc::new(schema.project(&projection)?);
    if file.metadata()?.len() == 0 {
        return Ok(RecordBatch::new_empty(projected_schema));
    }

    let reader = ReaderBuilder::new(schema)
        .with_format(format)
        .with_projection(projection)
        .build(file)?;
    let batches = reader.collect::<Result<Vec<_>, _>>()?;
    Ok(concat_batches(&projected_schema, &batches)?)
}

fn read_arrow_ipc(path: &Path, columns: &[String]) -> Result<RecordBatch, BucketError> {
    let reader = FileReader::try_new(File::open(path)?, None)?;
    let schema = reader.schema();
    let batches = reader.collect::<Result<Vec<_>, _>>()?;
    let table = if batches.is_empty() {
        RecordBatch::new_empty(schema)
    } else {
        concat_batches(&schema, &batches)?
    };
    project_by_name(&table, columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DeltaType;
    use arrow::array::{Array, Int64Array, StringArray};
    use arrow::ipc::writer::FileWriter;
    use arrow_schema::DataType;
    use std::io::Write;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_read_headerless_csv_with_projection() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("delta-0.csv");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "1,alice,100").unwrap();
        writeln!(file, "2,bob,200").unwrap();
        drop(file);

        let storage = LocalFileStorage::with_root(dir.path());
        let manifest = AnnotatedDeltaManifest::for_delta(
            vec![ManifestEntry::new("delta-0.csv", ContentType::Csv)],
            3,
            DeltaType::Insert,
        );
        let options = FileReaderOptions::for_projection(
            &names(&["id", "name", "ts"]),
            &names(&["id", "ts"]),
        );
        let tables = storage.download_delta_manifest(&manifest, &options).unwrap();
        let table = &tables[0];
        assert_eq!(table.num_rows(), 2);
        assert_eq!(table.schema().field(0).name(), "id");
        assert_eq!(table.schema().field(1).name(), "ts");
        let ts = table.column(1).as_any().downcast_ref::<Int64Array>().unwrap();
        assert_eq!(ts.value(1), 200);
    }

    #[test]
    fn test_read_arrow_ipc_with_projection() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("delta-0.arrow");
        let schema = Arc::new(Schema::new(vec![
            Field::new("id", DataType::Int64, false),
            Field::new("payload", DataType::Utf8, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int64Array::from(vec![10, 11, 12])),
                Arc::new(StringArray::from(vec![Some("a"), None, Some("c")])),
            ],
        )
        .unwrap();
        let mut writer = FileWriter::try_new(File::create(&path).unwrap(), &schema).unwrap();
        writer.write(&batch).unwrap();
        writer.finish().unwrap();

        let storage = LocalFileStorage::new();
        let uri = format!("file://{}", path.display());
        let manifest = AnnotatedDeltaManifest::for_delta(
            vec![ManifestEntry::new(uri, ContentType::Feather)],
            5,
            DeltaType::Update,
        );
        let options = FileReaderOptions::for_projection(&[], &names(&["id"]));
        let tables = storage.download_delta_manifest(&manifest, &options).unwrap();
        assert_eq!(tables[0].num_columns(), 1);
        assert_eq!(tables[0].column(0).len(), 3);
    }

    #[test]
    fn test_parquet_is_unsupported() {
        let storage = LocalFileStorage::new();
        let manifest = AnnotatedDeltaManifest::for_delta(
            vec![ManifestEntry::new("/tmp/none.parquet", ContentType::Parquet)],
            1,
            DeltaType::Insert,
        );
        let options = FileReaderOptions::for_projection(&[], &names(&["id"]));
        let result = storage.download_delta_manifest(&manifest, &options);
        assert!(matches!(result, Err(BucketError::UnsupportedContentType(_))));
    }

    #[test]
    fn test_csv_column_count_mismatch_is_invalid_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("narrow.csv");
        std::fs::write(&path, "1,2\n").unwrap();
        let result = read_csv(&path, &names(&["a", "b", "c"]), &names(&["a"]));
        assert!(matches!(result, Err(BucketError::InvalidSchema(_))));
    }

    #[test]
    fn test_empty_csv_yields_empty_projected_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        std::fs::write(&path, "").unwrap();
        let table = read_csv(&path, &names(&["a", "b"]), &names(&["b"])).unwrap();
        assert_eq!(table.num_rows(), 0);
        assert_eq!(table.schema().field(0).name(), "b");
    }
}
