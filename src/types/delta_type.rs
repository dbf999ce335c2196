//! The kind of row change carried by a delta file.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of change every row of a delta file represents.
///
/// The variant is carried through bucketing untouched; the merge stage uses it
/// together with the stream position to apply last-writer-wins.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeltaType {
    Insert,
    Update,
    Delete,
}

impl fmt::Display for DeltaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeltaType::Insert => "INSERT",
            DeltaType::Update => "UPDATE",
            DeltaType::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delta_type_serializes_as_upper_case() {
        let json = serde_json::to_string(&DeltaType::Delete).unwrap();
        assert_eq!(json, "\"DELETE\"");
        let parsed: DeltaType = serde_json::from_str("\"UPDATE\"").unwrap();
        assert_eq!(parsed, DeltaType::Update);
        assert_eq!(DeltaType::Insert.to_string(), "INSERT");
    }
}
