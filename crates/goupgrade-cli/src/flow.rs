use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use goupgrade_core::{Arch, GoVersion, InstallPaths, Os, Selection};
use goupgrade_installer::{
    ensure_archive, run_install, sha256_file, ArchiveSource, CommandFs, Escalation, FetchOutcome,
    HttpArchiveSource, InstallPolicy,
};
use goupgrade_registry::{GithubTreeClient, ReleaseListing};
use goupgrade_resolver::{discover_versions, version_labels, RELEASE_FOLDER_PREFIX};
use indicatif::HumanBytes;
use reqwest::blocking::Client;
use tracing::info;

use crate::preflight::{locate_toolchain, toolchain_version};
use crate::prompt::{Prompter, StreamPrompter};
use crate::render::{DownloadProgress, TerminalRenderer};

const GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";

#[derive(Debug, Clone)]
pub(crate) struct UpgradeSettings {
    pub(crate) paths: InstallPaths,
    pub(crate) escalation: Escalation,
    pub(crate) policy: InstallPolicy,
}

pub(crate) fn run_upgrade(settings: &UpgradeSettings, renderer: TerminalRenderer) -> Result<ExitCode> {
    renderer.print_section("Current Go location");
    let location = locate_toolchain()?;
    info!("Go is installed in : {location}");

    renderer.print_section("Existing version");
    let current = toolchain_version()?;
    info!("Go version : {current:?}");

    let client = http_client()?;
    let listing = GithubTreeClient::golang_dl(client.clone())
        .with_token(std::env::var(GITHUB_TOKEN_ENV).ok());
    let mut prompter = StreamPrompter::terminal(renderer.style());
    let selection = select_release(&mut prompter, &listing, renderer)?;

    renderer.print_section("Download");
    let source = HttpArchiveSource::new(client);
    let archive = fetch_release(&source, &selection, &settings.paths, renderer)?;

    renderer.print_section("Install");
    info!(
        escalation = settings.escalation.as_str(),
        "replacing {}",
        settings.paths.install_root().display()
    );
    let fs = CommandFs::new(settings.escalation);
    let report = run_install(&fs, &settings.paths, &archive, &settings.policy);
    for warning in &report.warnings {
        renderer.print_status("warn", &format!("{}: {}", warning.step.as_str(), warning.message));
    }
    if !report.succeeded() {
        renderer.print_status(
            "err",
            &format!(
                "upgrade to go{} failed (state={})",
                selection.version,
                report.state.as_str()
            ),
        );
        return Ok(ExitCode::from(1));
    }

    renderer.print_section("Currently installed version");
    let installed = toolchain_version()?;
    info!("Go version : {installed:?}");
    renderer.print_status("ok", &format!("installed go{}", selection.version));
    Ok(ExitCode::SUCCESS)
}

fn http_client() -> Result<Client> {
    Client::builder()
        .user_agent(concat!("goupgrade/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(Duration::from_secs(30))
        .timeout(None::<Duration>)
        .build()
        .context("failed to build http client")
}

pub(crate) fn select_release(
    prompter: &mut dyn Prompter,
    listing: &dyn ReleaseListing,
    renderer: TerminalRenderer,
) -> Result<Selection> {
    renderer.print_section("Architecture");
    let arch = select_arch(prompter)?;
    renderer.print_section("Operating system");
    let os = select_os(prompter)?;
    renderer.print_section("Version");
    let version = select_version(prompter, listing)?;
    Ok(Selection::new(arch, os, version))
}

fn select_arch(prompter: &mut dyn Prompter) -> Result<Arch> {
    let labels = Arch::ALL.map(|arch| arch.as_str().to_string());
    let default = Arch::host()
        .and_then(|host| Arch::ALL.iter().position(|arch| *arch == host))
        .unwrap_or(0);
    let index = prompter
        .select("Select Architecture", &labels, default)
        .context("choosing architecture failed")?;
    Ok(Arch::ALL[index])
}

fn select_os(prompter: &mut dyn Prompter) -> Result<Os> {
    let labels = Os::ALL.map(|os| os.as_str().to_string());
    let default = Os::host()
        .and_then(|host| Os::ALL.iter().position(|os| *os == host))
        .unwrap_or(0);
    let index = prompter
        .select("Select OS", &labels, default)
        .context("choosing operating system failed")?;
    Ok(Os::ALL[index])
}

fn select_version(prompter: &mut dyn Prompter, listing: &dyn ReleaseListing) -> Result<GoVersion> {
    let entries = listing.list_entries()?;
    let mut versions = discover_versions(&entries, RELEASE_FOLDER_PREFIX);
    if versions.is_empty() {
        return Err(anyhow!("no versions found in the release listing"));
    }

    let labels = version_labels(&versions);
    let index = prompter
        .select("Select Version", &labels, 0)
        .context("choosing Go version failed")?;
    Ok(versions.swap_remove(index))
}

pub(crate) fn fetch_release(
    source: &dyn ArchiveSource,
    selection: &Selection,
    paths: &InstallPaths,
    renderer: TerminalRenderer,
) -> Result<PathBuf> {
    let url = selection.download_url();
    let archive = paths.archive_path(selection);

    let mut progress: Option<DownloadProgress> = None;
    let outcome = ensure_archive(source, &url, &archive, &mut |written, total| {
        progress
            .get_or_insert_with(|| renderer.start_download(total))
            .set(written)
    });
    let outcome = match outcome {
        Ok(outcome) => {
            if let Some(progress) = progress.take() {
                progress.finish_success();
            }
            outcome
        }
        Err(err) => {
            if let Some(progress) = progress.take() {
                progress.finish_abandon();
            }
            return Err(err);
        }
    };

    match outcome {
        FetchOutcome::CacheHit => {
            info!(
                "{} already exists, using it without re-downloading",
                archive.display()
            );
        }
        FetchOutcome::Downloaded { bytes } => {
            info!("Download complete ({}).", HumanBytes(bytes));
        }
    }
    let digest = sha256_file(&archive)?;
    info!("sha256 {digest}  {}", archive.display());
    renderer.print_status(
        "ok",
        &format!("{} ({})", archive.display(), outcome.as_str()),
    );
    Ok(archive)
}
