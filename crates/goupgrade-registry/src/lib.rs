mod github;

use anyhow::Result;
use goupgrade_core::TreeEntry;

pub use github::{
    parse_ref_response, parse_tree_response, GithubTreeClient, GITHUB_API_BASE, GOLANG_DL_BRANCH,
    GOLANG_DL_OWNER, GOLANG_DL_REPO,
};

/// Source of the top-level directory listing that release folders are
/// discovered from.
pub trait ReleaseListing {
    fn list_entries(&self) -> Result<Vec<TreeEntry>>;
}

/// Fixed listing, used when the entries are already known.
#[derive(Debug, Clone, Default)]
pub struct StaticListing {
    entries: Vec<TreeEntry>,
}

impl StaticListing {
    pub fn new(entries: Vec<TreeEntry>) -> Self {
        Self { entries }
    }
}

impl ReleaseListing for StaticListing {
    fn list_entries(&self) -> Result<Vec<TreeEntry>> {
        Ok(self.entries.clone())
    }
}
