use std::path::Path;
use std::process::Command;

use anyhow::{anyhow, Context, Result};
use tracing::debug;

/// Filesystem mutations on the installation tree. These usually need
/// elevated rights, so they are kept behind a trait the installer receives.
pub trait PrivilegedFs {
    fn rename(&self, from: &Path, to: &Path) -> Result<()>;
    fn remove_dir_all(&self, path: &Path) -> Result<()>;
    fn extract_tar_gz(&self, archive: &Path, destination: &Path) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Escalation {
    Sudo,
    None,
}

impl Escalation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sudo => "sudo",
            Self::None => "none",
        }
    }
}

/// Runs `mv`, `rm -rf` and `tar` as subprocesses, optionally through `sudo`.
#[derive(Debug, Clone, Copy)]
pub struct CommandFs {
    escalation: Escalation,
}

impl CommandFs {
    pub fn new(escalation: Escalation) -> Self {
        Self { escalation }
    }

    fn base_command(&self, program: &str) -> Command {
        match self.escalation {
            Escalation::Sudo => {
                let mut command = Command::new("sudo");
                command.arg(program);
                command
            }
            Escalation::None => Command::new(program),
        }
    }

    pub fn build_rename_command(&self, from: &Path, to: &Path) -> Command {
        let mut command = self.base_command("mv");
        command.arg(from).arg(to);
        command
    }

    pub fn build_remove_command(&self, path: &Path) -> Command {
        let mut command = self.base_command("rm");
        command.arg("-rf").arg(path);
        command
    }

    pub fn build_extract_command(&self, archive: &Path, destination: &Path) -> Command {
        let mut command = self.base_command("tar");
        command
            .arg("-C")
            .arg(destination)
            .arg("-xzf")
            .arg(archive);
        command
    }
}

impl PrivilegedFs for CommandFs {
    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        run_command(
            &mut self.build_rename_command(from, to),
            &format!("moving {} to {} failed", from.display(), to.display()),
        )
    }

    fn remove_dir_all(&self, path: &Path) -> Result<()> {
        run_command(
            &mut self.build_remove_command(path),
            &format!("removing {} failed", path.display()),
        )
    }

    fn extract_tar_gz(&self, archive: &Path, destination: &Path) -> Result<()> {
        run_command(
            &mut self.build_extract_command(archive, destination),
            &format!(
                "untar of {} into {} failed",
                archive.display(),
                destination.display()
            ),
        )
    }
}

pub(crate) fn run_command(command: &mut Command, context_message: &str) -> Result<()> {
    debug!(command = ?command, "running");
    let output = command
        .output()
        .with_context(|| format!("{context_message}: command failed to start"))?;
    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    Err(anyhow!(
        "{context_message}: status={} stdout='{}' stderr='{}'",
        output.status,
        stdout.trim(),
        stderr.trim()
    ))
}
