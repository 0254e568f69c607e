use std::process::Command;

use anyhow::{anyhow, Context, Result};

pub(crate) const TOOLCHAIN_BINARY: &str = "go";

/// Path of the toolchain executable found on `PATH`.
pub(crate) fn locate_toolchain() -> Result<String> {
    let mut command = Command::new("which");
    command.arg(TOOLCHAIN_BINARY);
    capture_first_line(&mut command, &format!("which {TOOLCHAIN_BINARY}"))
        .context("no current Go installation found")
}

/// Output of `go version`, e.g. `go version go1.20.5 linux/amd64`.
pub(crate) fn toolchain_version() -> Result<String> {
    let mut command = Command::new(TOOLCHAIN_BINARY);
    command.arg("version");
    capture_first_line(&mut command, &format!("{TOOLCHAIN_BINARY} version"))
}

pub(crate) fn capture_first_line(command: &mut Command, label: &str) -> Result<String> {
    let output = command
        .output()
        .with_context(|| format!("error running command `{label}`: command failed to start"))?;
    if !output.status.success() {
        return Err(anyhow!(
            "error running command `{label}` : {} [{}]",
            String::from_utf8_lossy(&output.stderr).trim(),
            output.status
        ));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let line = stdout.lines().next().map(str::trim).unwrap_or_default();
    if line.is_empty() {
        return Err(anyhow!(
            "error reading result of command `{label}` : empty output"
        ));
    }
    Ok(line.to_string())
}
