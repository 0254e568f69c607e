use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};

use crate::selection::Selection;

const DEFAULT_INSTALL_ROOT: &str = "/usr/local/go";
const ASIDE_SUFFIX: &str = "-old";
// Release archives always unpack into a top-level `go/` directory.
const ARCHIVE_ROOT_DIR: &str = "go";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallPaths {
    install_root: PathBuf,
    aside_root: PathBuf,
    download_dir: PathBuf,
}

impl InstallPaths {
    pub fn new(install_root: impl Into<PathBuf>, download_dir: impl Into<PathBuf>) -> Result<Self> {
        let install_root = install_root.into();
        let file_name = install_root
            .file_name()
            .ok_or_else(|| anyhow!("install root has no directory name: {}", install_root.display()))?;
        if file_name != ARCHIVE_ROOT_DIR {
            return Err(anyhow!(
                "install root must be a directory named '{ARCHIVE_ROOT_DIR}' because release archives unpack into it: {}",
                install_root.display()
            ));
        }
        if install_root.parent().map_or(true, |parent| parent.as_os_str().is_empty()) {
            return Err(anyhow!(
                "install root must have a parent directory to extract into: {}",
                install_root.display()
            ));
        }

        let mut aside_name = OsString::from(file_name);
        aside_name.push(ASIDE_SUFFIX);
        let aside_root = install_root.with_file_name(aside_name);

        Ok(Self {
            install_root,
            aside_root,
            download_dir: download_dir.into(),
        })
    }

    pub fn install_root(&self) -> &Path {
        &self.install_root
    }

    pub fn aside_root(&self) -> &Path {
        &self.aside_root
    }

    /// Directory the release archive is extracted into.
    pub fn extract_root(&self) -> &Path {
        self.install_root
            .parent()
            .unwrap_or_else(|| Path::new("/"))
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    pub fn archive_path(&self, selection: &Selection) -> PathBuf {
        self.download_dir.join(selection.archive_file_name())
    }
}

pub fn default_install_root() -> PathBuf {
    PathBuf::from(DEFAULT_INSTALL_ROOT)
}

pub fn default_download_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set; cannot resolve download directory")?;
    Ok(PathBuf::from(home).join("Downloads"))
}
