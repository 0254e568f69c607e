use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use tracing::{debug, info};

use crate::fs_utils::create_parent_dir;

const COPY_BUFFER_SIZE: usize = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    CacheHit,
    Downloaded { bytes: u64 },
}

impl FetchOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CacheHit => "cache-hit",
            Self::Downloaded { .. } => "downloaded",
        }
    }
}

pub struct ArchiveStream {
    pub content_length: Option<u64>,
    pub body: Box<dyn Read>,
}

pub trait ArchiveSource {
    /// Opens the archive at `url`. Anything but a complete, successful
    /// response is an error.
    fn open(&self, url: &str) -> Result<ArchiveStream>;
}

#[derive(Debug, Clone)]
pub struct HttpArchiveSource {
    client: Client,
}

impl HttpArchiveSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl ArchiveSource for HttpArchiveSource {
    fn open(&self, url: &str) -> Result<ArchiveStream> {
        let response = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("download failed: {url}"))?;
        if response.status() != StatusCode::OK {
            return Err(anyhow!(
                "download failed: {url} answered with http status {}",
                response.status().as_u16()
            ));
        }

        Ok(ArchiveStream {
            content_length: response.content_length(),
            body: Box::new(response),
        })
    }
}

/// Makes sure `target` holds the archive from `url`.
///
/// An existing file at `target` counts as already downloaded and is never
/// checked. A failed transfer leaves whatever was written in place.
pub fn ensure_archive(
    source: &dyn ArchiveSource,
    url: &str,
    target: &Path,
    progress: &mut dyn FnMut(u64, Option<u64>),
) -> Result<FetchOutcome> {
    if target.exists() {
        debug!(path = %target.display(), "archive already present, skipping download");
        return Ok(FetchOutcome::CacheHit);
    }

    create_parent_dir(target)?;
    info!("Downloading {url:?} into {}", target.display());
    let stream = source.open(url)?;
    let total = stream.content_length;

    let file =
        File::create(target).with_context(|| format!("creating file failed: {}", target.display()))?;
    let mut writer = BufWriter::new(file);
    let mut body = stream.body;
    let mut buffer = vec![0_u8; COPY_BUFFER_SIZE];
    let mut written = 0_u64;
    progress(written, total);

    loop {
        let read = match body.read(&mut buffer) {
            Ok(read) => read,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => {
                return Err(err).with_context(|| format!("download interrupted: {url}"));
            }
        };
        if read == 0 {
            break;
        }
        writer
            .write_all(&buffer[..read])
            .with_context(|| format!("failed writing {}", target.display()))?;
        written += read as u64;
        progress(written, total);
    }
    writer
        .flush()
        .with_context(|| format!("failed writing {}", target.display()))?;

    Ok(FetchOutcome::Downloaded { bytes: written })
}
