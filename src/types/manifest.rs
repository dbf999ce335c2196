// In: src/types/manifest.rs

//! Planning-side inputs: manifest entries and their per-file annotations.
//!
//! An `AnnotatedDeltaManifest` describes one source delta. Its entries and
//! annotations are positionally aligned: annotation `i` describes entry `i`.
//! The planner owns these values; this stage only reads them.

use serde::{Deserialize, Serialize};

use crate::error::BucketError;
use crate::types::{ContentType, DeltaType};

/// One physical data file belonging to a delta.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub uri: String,
    pub content_type: ContentType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_count: Option<u64>,
}

impl ManifestEntry {
    pub fn new(uri: impl Into<String>, content_type: ContentType) -> Self {
        Self {
            uri: uri.into(),
            content_type,
            record_count: None,
        }
    }
}

/// The provenance of one delta file.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeltaAnnotation {
    /// Commit order of the delta. Larger positions were written later.
    pub stream_position: i64,
    /// Disambiguates files committed at the same stream position.
    pub file_index: u32,
    pub delta_type: DeltaType,
}

impl DeltaAnnotation {
    pub fn of(stream_position: i64, file_index: u32, delta_type: DeltaType) -> Self {
        Self {
            stream_position,
            file_index,
            delta_type,
        }
    }
}

/// The manifest of one source delta together with one annotation per entry.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedDeltaManifest {
    entries: Vec<ManifestEntry>,
    annotations: Vec<DeltaAnnotation>,
}

impl AnnotatedDeltaManifest {
    /// Pairs `entries` with `annotations`, rejecting misaligned input.
    pub fn new(
        entries: Vec<ManifestEntry>,
        annotations: Vec<DeltaAnnotation>,
    ) -> Result<Self, BucketError> {
        let manifest = Self {
            entries,
            annotations,
        };
        manifest.check_alignment()?;
        Ok(manifest)
    }

    /// Annotates every entry of a single-commit delta with the same stream
    /// position and delta type, numbering files by their entry position.
    pub fn for_delta(
        entries: Vec<ManifestEntry>,
        stream_position: i64,
        delta_type: DeltaType,
    ) -> Self {
        let annotations = (0..entries.len())
            .map(|i| DeltaAnnotation::of(stream_position, i as u32, delta_type))
            .collect();
        Self {
            entries,
            annotations,
        }
    }

    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    pub fn annotations(&self) -> &[DeltaAnnotation] {
        &self.annotations
    }

    /// Values deserialized from the planner bypass `new`, so readers re-check.
    pub fn check_alignment(&self) -> Result<(), BucketError> {
        if self.entries.len() != self.annotations.len() {
            return Err(BucketError::IntegrityError(format!(
                "Delta manifest has {} entries but {} annotations",
                self.entries.len(),
                self.annotations.len()
            )));
        }
        Ok(())
    }
}
