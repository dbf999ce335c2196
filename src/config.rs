// In: src/config.rs

//! The single source of truth for hash-bucket task configuration.
//!
//! A `HashBucketConfig` is created once per compaction job (typically from the
//! planner's JSON) and shared read-only by every task of that job. Every task
//! of one job must see the same `num_buckets` and the same primary-key order,
//! otherwise rows for one key would be routed to different merge tasks.

use std::path::{Path, PathBuf};

use log::LevelFilter;
use serde::{Deserialize, Serialize};

use crate::error::BucketError;
use crate::types::sort_key::{sort_key_names, SortKey};

//==================================================================================
// I. Logging Configuration
//==================================================================================

/// Defines settings for the `env_logger` installed by `observability::init_logging`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// One of `off`, `error`, `warn`, `info`, `debug`, `trace`.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// If set, log lines are appended to this file instead of stderr.
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl LoggingConfig {
    pub fn level_filter(&self) -> Result<LevelFilter, BucketError> {
        self.level
            .parse::<LevelFilter>()
            .map_err(|_| BucketError::InvalidArgument(format!("Unknown log level '{}'", self.level)))
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            log_file: None,
        }
    }
}

//==================================================================================
// II. The Unified HashBucketConfig
//==================================================================================

/// Job-wide parameters of the hash-bucket stage.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct HashBucketConfig {
    /// The full, ordered column list of the source table. Headerless encodings
    /// (CSV) need it to name their columns on decode.
    #[serde(default)]
    pub column_names: Vec<String>,

    /// Primary-key columns. Order is significant for the digest.
    pub primary_keys: Vec<String>,

    /// Sort keys the merge stage will use. Only their names matter here.
    #[serde(default)]
    pub sort_keys: Vec<SortKey>,

    #[serde(default = "default_one")]
    pub num_buckets: usize,

    #[serde(default = "default_one")]
    pub num_groups: usize,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl HashBucketConfig {
    pub fn new(primary_keys: Vec<String>, num_buckets: usize, num_groups: usize) -> Self {
        Self {
            column_names: Vec::new(),
            primary_keys,
            sort_keys: Vec::new(),
            num_buckets,
            num_groups,
            logging: LoggingConfig::default(),
        }
    }

    pub fn with_column_names(mut self, column_names: Vec<String>) -> Self {
        self.column_names = column_names;
        self
    }

    pub fn with_sort_keys(mut self, sort_keys: Vec<SortKey>) -> Self {
        self.sort_keys = sort_keys;
        self
    }

    /// Parses and validates a JSON configuration document.
    pub fn from_json_str(json: &str) -> Result<Self, BucketError> {
        let config: HashBucketConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, BucketError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Rejects configurations no task could run with. Called before any I/O.
    pub fn validate(&self) -> Result<(), BucketError> {
        validate_bucket_args(self.num_buckets, &self.primary_keys)?;
        if self.num_groups == 0 {
            return Err(BucketError::InvalidArgument(
                "num_groups must be positive".to_string(),
            ));
        }
        if self.num_groups > self.num_buckets {
            return Err(BucketError::InvalidArgument(format!(
                "num_groups ({}) must not exceed num_buckets ({})",
                self.num_groups, self.num_buckets
            )));
        }
        self.logging.level_filter()?;
        Ok(())
    }

    pub fn sort_key_names(&self) -> Vec<String> {
        sort_key_names(&self.sort_keys)
    }

    /// The columns every decoded table is restricted to: primary keys, then
    /// sort keys, without duplicates.
    pub fn columns_to_read(&self) -> Vec<String> {
        projection_columns(&self.primary_keys, &self.sort_key_names())
    }
}

/// The argument checks shared by the partitioner and the task entry point.
pub(crate) fn validate_bucket_args(
    num_buckets: usize,
    primary_keys: &[String],
) -> Result<(), BucketError> {
    if num_buckets == 0 {
        return Err(BucketError::InvalidArgument(
            "num_buckets must be positive".to_string(),
        ));
    }
    if primary_keys.is_empty() {
        return Err(BucketError::InvalidArgument(
            "at least one primary key column is required".to_string(),
        ));
    }
    Ok(())
}

/// Primary keys followed by sort keys, without duplicates.
pub(crate) fn projection_columns(primary_keys: &[String], sort_key_names: &[String]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::with_capacity(primary_keys.len() + sort_key_names.len());
    for name in primary_keys.iter().chain(sort_key_names) {
        if !columns.contains(name) {
            columns.push(name.clone());
        }
    }
    columns
}

fn default_one() -> usize {
    1
}

fn default_log_level() -> String {
    "info".to_string()
}
