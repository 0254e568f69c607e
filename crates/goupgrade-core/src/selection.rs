use crate::platform::{Arch, Os};
use crate::version::GoVersion;

pub const DOWNLOAD_BASE_URL: &str = "https://dl.google.com/go";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub arch: Arch,
    pub os: Os,
    pub version: GoVersion,
}

impl Selection {
    pub fn new(arch: Arch, os: Os, version: GoVersion) -> Self {
        Self { arch, os, version }
    }

    pub fn archive_file_name(&self) -> String {
        format!(
            "go{}.{}-{}.tar.gz",
            self.version.original(),
            self.os.as_str(),
            self.arch.as_str()
        )
    }

    pub fn download_url(&self) -> String {
        format!("{DOWNLOAD_BASE_URL}/{}", self.archive_file_name())
    }
}
