//! Replacement of the active installation with a freshly extracted release.
//!
//! The sequence moves the current tree aside, extracts the archive next to
//! it, and deletes the old tree once extraction succeeded:
//!
//! ```text
//! Pristine -> Renamed -> Installed -> Cleaned
//!                     \-> RolledBack
//! ```
//!
//! An aside tree left behind by an earlier run is deleted first. `mv` would
//! otherwise move the current tree *into* it.
//!
//! Every step produces a [`StepOutcome`]; the [`InstallPolicy`] decides which
//! failures stop the sequence.

use std::path::Path;

use anyhow::Error;
use goupgrade_core::InstallPaths;
use tracing::{error, info, warn};

use crate::privileged::PrivilegedFs;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallState {
    Pristine,
    Renamed,
    Installed,
    RolledBack,
    Cleaned,
}

impl InstallState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pristine => "pristine",
            Self::Renamed => "renamed",
            Self::Installed => "installed",
            Self::RolledBack => "rolled-back",
            Self::Cleaned => "cleaned",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallStep {
    ClearStale,
    RenameAside,
    ClearPartial,
    Extract,
    Restore,
    Cleanup,
}

impl InstallStep {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ClearStale => "clear-stale",
            Self::RenameAside => "rename-aside",
            Self::ClearPartial => "clear-partial",
            Self::Extract => "extract",
            Self::Restore => "restore",
            Self::Cleanup => "cleanup",
        }
    }
}

#[derive(Debug)]
pub enum StepOutcome {
    Done,
    Warning(StepWarning),
    Fatal(InstallStep, Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepWarning {
    pub step: InstallStep,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InstallPolicy {
    /// Stop before extracting when the current tree could not be moved aside.
    pub abort_on_rename_failure: bool,
}

impl InstallPolicy {
    pub fn strict() -> Self {
        Self {
            abort_on_rename_failure: true,
        }
    }

    pub fn classify(&self, step: InstallStep, result: anyhow::Result<()>) -> StepOutcome {
        let err = match result {
            Ok(()) => return StepOutcome::Done,
            Err(err) => err,
        };

        let fatal = match step {
            InstallStep::RenameAside => self.abort_on_rename_failure,
            InstallStep::ClearStale | InstallStep::Extract => true,
            InstallStep::ClearPartial | InstallStep::Restore | InstallStep::Cleanup => false,
        };
        if fatal {
            StepOutcome::Fatal(step, err)
        } else {
            StepOutcome::Warning(StepWarning {
                step,
                message: format!("{err:#}"),
            })
        }
    }
}

#[derive(Debug)]
pub struct InstallReport {
    pub state: InstallState,
    pub warnings: Vec<StepWarning>,
    pub error: Option<Error>,
}

impl InstallReport {
    fn new() -> Self {
        Self {
            state: InstallState::Pristine,
            warnings: Vec::new(),
            error: None,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.state == InstallState::Cleaned && self.error.is_none()
    }

    fn record(&mut self, outcome: StepOutcome) -> Option<Error> {
        match outcome {
            StepOutcome::Done => None,
            StepOutcome::Warning(warning) => {
                warn!(
                    "{} step failed, continuing : {}",
                    warning.step.as_str(),
                    warning.message
                );
                self.warnings.push(warning);
                None
            }
            StepOutcome::Fatal(step, err) => {
                error!("{} step failed : {err:#}", step.as_str());
                Some(err)
            }
        }
    }
}

pub fn run_install(
    fs: &dyn PrivilegedFs,
    paths: &InstallPaths,
    archive: &Path,
    policy: &InstallPolicy,
) -> InstallReport {
    let mut report = InstallReport::new();
    let install_root = paths.install_root();
    let aside_root = paths.aside_root();

    if aside_root.exists() {
        warn!(
            "{} already exists, probably left over from an interrupted upgrade; deleting it",
            aside_root.display()
        );
        let outcome = policy.classify(InstallStep::ClearStale, fs.remove_dir_all(aside_root));
        if let Some(err) = report.record(outcome) {
            report.error = Some(err);
            return report;
        }
    }

    info!(
        "Renaming {} to {} (might need undo)",
        install_root.display(),
        aside_root.display()
    );
    let outcome = policy.classify(InstallStep::RenameAside, fs.rename(install_root, aside_root));
    let moved_aside = matches!(outcome, StepOutcome::Done);
    if let Some(err) = report.record(outcome) {
        report.error = Some(err);
        return report;
    }
    report.state = InstallState::Renamed;

    info!(
        "Extracting {} into {}",
        archive.display(),
        paths.extract_root().display()
    );
    let outcome = policy.classify(
        InstallStep::Extract,
        fs.extract_tar_gz(archive, paths.extract_root()),
    );
    if let Some(err) = report.record(outcome) {
        roll_back(fs, paths, policy, moved_aside, &mut report);
        report.error = Some(err);
        return report;
    }
    report.state = InstallState::Installed;

    info!(
        "Cleaning up old version ({} gets deleted)",
        aside_root.display()
    );
    let outcome = policy.classify(InstallStep::Cleanup, fs.remove_dir_all(aside_root));
    report.record(outcome);
    report.state = InstallState::Cleaned;
    report
}

fn roll_back(
    fs: &dyn PrivilegedFs,
    paths: &InstallPaths,
    policy: &InstallPolicy,
    moved_aside: bool,
    report: &mut InstallReport,
) {
    info!("Extraction failed : undo renaming folder to the old version");
    let install_root = paths.install_root();
    let aside_root = paths.aside_root();

    // Only discard a half-extracted tree when the old one is safely aside.
    if moved_aside && install_root.exists() {
        let outcome = policy.classify(InstallStep::ClearPartial, fs.remove_dir_all(install_root));
        report.record(outcome);
    }

    // Nothing of ours sits at the aside path when the rename never happened.
    if moved_aside {
        let outcome = policy.classify(InstallStep::Restore, fs.rename(aside_root, install_root));
        report.record(outcome);
    }
    report.state = InstallState::RolledBack;
}
