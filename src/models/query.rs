//! Query model definitions

use std::fmt;

use serde::{Deserialize, Serialize};

/// Handle of an editor buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BufferId(pub u32);

impl BufferId {
    /// Sentinel resolving to whatever buffer is active
    pub const CURRENT: BufferId = BufferId(0);

    pub fn is_current(self) -> bool {
        self == Self::CURRENT
    }
}

impl fmt::Display for BufferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "buffer {}", self.0)
    }
}

/// Output of a context query
///
/// Symbol queries produce names; window queries (and the symbol fallback)
/// produce a single text blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum QueryResult {
    Names(Vec<String>),
    Text(String),
}

impl QueryResult {
    pub fn as_names(&self) -> Option<&[String]> {
        match self {
            Self::Names(names) => Some(names),
            Self::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Names(_) => None,
            Self::Text(text) => Some(text),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Names(names) => names.is_empty(),
            Self::Text(text) => text.is_empty(),
        }
    }
}

impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Names(names) => write!(f, "{}", names.join("\n")),
            Self::Text(text) => write!(f, "{text}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_result_serializes_untagged() {
        let names = QueryResult::Names(vec!["foo".into(), "bar".into()]);
        assert_eq!(serde_json::to_string(&names).unwrap(), r#"["foo","bar"]"#);

        let text = QueryResult::Text("fn main() {}".into());
        assert_eq!(serde_json::to_string(&text).unwrap(), r#""fn main() {}""#);
    }

    #[test]
    fn test_current_sentinel() {
        assert!(BufferId::CURRENT.is_current());
        assert!(!BufferId(3).is_current());
    }
}
