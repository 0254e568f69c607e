mod digest;
mod download;
mod fs_utils;
mod privileged;
mod sequence;

pub use digest::sha256_file;
pub use download::{
    ensure_archive, ArchiveSource, ArchiveStream, FetchOutcome, HttpArchiveSource,
};
pub use privileged::{CommandFs, Escalation, PrivilegedFs};
pub use sequence::{
    run_install, InstallPolicy, InstallReport, InstallState, InstallStep, StepOutcome,
    StepWarning,
};
