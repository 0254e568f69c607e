use goupgrade_core::{GoVersion, TreeEntry};
use tracing::debug;

/// Folder-name prefix used by the release repository (`go1.21.0`, `gotip`).
pub const RELEASE_FOLDER_PREFIX: &str = "go";

/// Turns a tree listing into release versions, newest first.
///
/// Only directories named `<prefix><version>` are candidates. Names whose
/// remainder is not a version (`gotip`) are skipped.
pub fn discover_versions(entries: &[TreeEntry], prefix: &str) -> Vec<GoVersion> {
    let mut versions = entries
        .iter()
        .filter(|entry| entry.is_directory())
        .filter_map(|entry| entry.path.strip_prefix(prefix))
        .filter_map(|candidate| {
            let parsed = GoVersion::parse(candidate);
            if parsed.is_none() {
                debug!(folder = %format!("{prefix}{candidate}"), "skipping non-version folder");
            }
            parsed
        })
        .collect::<Vec<_>>();
    versions.sort_unstable_by(|a, b| b.cmp(a));
    versions.dedup();
    versions
}

pub fn version_labels(versions: &[GoVersion]) -> Vec<String> {
    versions
        .iter()
        .map(|version| version.original().to_string())
        .collect()
}
