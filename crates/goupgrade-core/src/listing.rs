use serde::{Deserialize, Serialize};

/// Kind reported by git tree listings for subdirectories.
pub const TREE_ENTRY_KIND: &str = "tree";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntry {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl TreeEntry {
    pub fn new(path: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: kind.into(),
        }
    }

    pub fn directory(path: impl Into<String>) -> Self {
        Self::new(path, TREE_ENTRY_KIND)
    }

    pub fn is_directory(&self) -> bool {
        self.kind == TREE_ENTRY_KIND
    }
}
