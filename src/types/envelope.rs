//! The in-flight pairing of a table with its delta provenance.

use arrow::record_batch::RecordBatch;

use crate::types::{DeltaAnnotation, DeltaType};

/// A table fragment plus the provenance needed to order it during merge.
///
/// Envelopes are never mutated. The aggregator consumes each decoded envelope
/// and creates one new envelope per populated bucket, copying the provenance
/// onto the smaller bucket table.
#[derive(Debug, Clone, PartialEq)]
pub struct DeltaFileEnvelope {
    stream_position: i64,
    file_index: u32,
    delta_type: DeltaType,
    table: RecordBatch,
}

impl DeltaFileEnvelope {
    pub fn of(
        stream_position: i64,
        file_index: u32,
        delta_type: DeltaType,
        table: RecordBatch,
    ) -> Self {
        Self {
            stream_position,
            file_index,
            delta_type,
            table,
        }
    }

    pub fn from_annotation(annotation: &DeltaAnnotation, table: RecordBatch) -> Self {
        Self::of(
            annotation.stream_position,
            annotation.file_index,
            annotation.delta_type,
            table,
        )
    }

    pub fn stream_position(&self) -> i64 {
        self.stream_position
    }

    pub fn file_index(&self) -> u32 {
        self.file_index
    }

    pub fn delta_type(&self) -> DeltaType {
        self.delta_type
    }

    pub fn table(&self) -> &RecordBatch {
        &self.table
    }

    pub fn into_table(self) -> RecordBatch {
        self.table
    }

    pub fn num_rows(&self) -> usize {
        self.table.num_rows()
    }
}
