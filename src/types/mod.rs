//! This module defines the core, strongly-typed data representations used
//! throughout the hash-bucket stage.
//!
//! It covers the planning-side inputs (annotated delta manifests, sort keys)
//! and the in-flight `DeltaFileEnvelope` that pairs a table with the provenance
//! the downstream merge needs to order conflicting rows.

pub mod content_type;
pub mod delta_type;
pub mod envelope;
pub mod manifest;
pub mod sort_key;

// Re-export the main type(s) for easier access.
pub use content_type::ContentType;
pub use delta_type::DeltaType;
pub use envelope::DeltaFileEnvelope;
pub use manifest::{AnnotatedDeltaManifest, DeltaAnnotation, ManifestEntry};
pub use sort_key::{SortKey, SortOrder};
