mod flow;
mod preflight;
mod prompt;
mod render;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use goupgrade_core::{default_download_dir, default_install_root, InstallPaths};
use goupgrade_installer::{Escalation, InstallPolicy};
use tracing::error;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::flow::{run_upgrade, UpgradeSettings};
use crate::render::{current_output_style, OutputStyle, TerminalRenderer};

#[derive(Parser, Debug)]
#[command(name = "upgrade-go", version)]
#[command(about = "Interactively upgrade the local Go toolchain", long_about = None)]
struct Cli {
    /// Active Go installation (its parent receives the extracted archive)
    #[arg(long, value_name = "PATH")]
    install_root: Option<PathBuf>,
    /// Where release archives are downloaded to [default: ~/Downloads]
    #[arg(long, value_name = "PATH")]
    download_dir: Option<PathBuf>,
    /// Run mv/rm/tar directly instead of through sudo
    #[arg(long)]
    no_sudo: bool,
    /// Abort when the current installation cannot be moved aside
    #[arg(long)]
    strict: bool,
}

impl Cli {
    fn settings(&self) -> Result<UpgradeSettings> {
        let install_root = self
            .install_root
            .clone()
            .unwrap_or_else(default_install_root);
        let download_dir = match &self.download_dir {
            Some(dir) => dir.clone(),
            None => default_download_dir()?,
        };

        Ok(UpgradeSettings {
            paths: InstallPaths::new(install_root, download_dir)?,
            escalation: if self.no_sudo {
                Escalation::None
            } else {
                Escalation::Sudo
            },
            policy: if self.strict {
                InstallPolicy::strict()
            } else {
                InstallPolicy::default()
            },
        })
    }
}

fn init_tracing(style: OutputStyle) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .with_ansi(style == OutputStyle::Rich)
        .without_time()
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let style = current_output_style();
    init_tracing(style);

    let result = cli
        .settings()
        .and_then(|settings| run_upgrade(&settings, TerminalRenderer::from_style(style)));
    match result {
        Ok(code) => code,
        Err(err) => {
            error!("{err:#}");
            ExitCode::from(1)
        }
    }
}
