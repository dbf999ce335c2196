//! This file is the root of the `delta_bucket` Rust crate.
//!
//! Its responsibilities are strictly limited to:
//! 1.  Declaring all the top-level modules of the library (`hash_bucket`,
//!     `storage`, `placement`, etc.) so the Rust compiler knows they exist.
//! 2.  Re-exporting the handful of types an orchestrator needs to schedule a
//!     hash-bucket task, so callers rarely have to reach into submodules.

//==================================================================================
// 0. Constants
//==================================================================================
/// The crate version, automatically set from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
//==================================================================================
// 1. Module Declarations
//==================================================================================
#[macro_use]
pub mod observability; // Make macros available throughout the crate

pub mod config;
pub mod error;
pub mod hash_bucket;
pub mod placement;
pub mod primary_key;
pub mod storage;
pub mod types;

#[doc(hidden)]
pub use log as __log;

//==================================================================================
// 2. Public Surface
//==================================================================================
pub use config::{HashBucketConfig, LoggingConfig};
pub use error::BucketError;
pub use hash_bucket::{hash_bucket, HashBucketResult, HashBucketTask};
pub use observability::init_logging;
pub use placement::{
    GroupAssembler, GroupPlacementIndex, HashBucketGroup, InMemoryObjectStore,
    ModuloGroupAssembler, ObjectRef, ObjectStore,
};
pub use primary_key::{BucketIndexAssigner, DigestModuloAssigner};
pub use storage::{DeltaStorage, FileReaderOptions, InMemoryStorage, LocalFileStorage};
pub use types::{
    AnnotatedDeltaManifest, ContentType, DeltaAnnotation, DeltaFileEnvelope, DeltaType,
    ManifestEntry, SortKey, SortOrder,
};
