//! Backend primary keys.

use serde::{Deserialize, Serialize};

/// Primary keys arrive as text (uuid) or integers depending on the table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RowId {
    Text(String),
    Number(i64),
}

impl std::fmt::Display for RowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowId::Text(s) => f.write_str(s),
            RowId::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for RowId {
    /// Integer-looking text becomes [`RowId::Number`] so a key typed on the
    /// command line compares equal to the one the backend returned.
    fn from(raw: &str) -> Self {
        let raw = raw.trim();
        match raw.parse::<i64>() {
            Ok(n) => RowId::Number(n),
            Err(_) => RowId::Text(raw.to_string()),
        }
    }
}
