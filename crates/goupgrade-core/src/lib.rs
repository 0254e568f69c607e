mod layout;
mod listing;
mod platform;
mod selection;
mod version;

pub use layout::{default_download_dir, default_install_root, InstallPaths};
pub use listing::{TreeEntry, TREE_ENTRY_KIND};
pub use platform::{Arch, Os};
pub use selection::{Selection, DOWNLOAD_BASE_URL};
pub use version::GoVersion;
