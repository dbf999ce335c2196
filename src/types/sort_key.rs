//! Sort-key definitions as produced by the planner.

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// A named sort column and its direction.
///
/// Bucketing only needs the name (for column projection). The direction is
/// carried for the merge stage and never interpreted here.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub key_name: String,
    #[serde(default)]
    pub sort_order: SortOrder,
}

impl SortKey {
    pub fn of(key_name: impl Into<String>, sort_order: SortOrder) -> Self {
        Self {
            key_name: key_name.into(),
            sort_order,
        }
    }

    pub fn key_name(&self) -> &str {
        &self.key_name
    }
}

/// Extracts the column names of `sort_keys`, preserving their order.
pub fn sort_key_names(sort_keys: &[SortKey]) -> Vec<String> {
    sort_keys.iter().map(|key| key.key_name.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_key_names_ignore_direction() {
        let keys = vec![
            SortKey::of("updated_at", SortOrder::Descending),
            SortKey::of("seq", SortOrder::Ascending),
        ];
        assert_eq!(sort_key_names(&keys), vec!["updated_at", "seq"]);
    }

    #[test]
    fn test_sort_order_defaults_when_absent() {
        let key: SortKey = serde_json::from_str(r#"{"key_name": "ts"}"#).unwrap();
        assert_eq!(key.sort_order, SortOrder::Ascending);
    }
}
