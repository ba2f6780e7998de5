use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use flate2::read::GzDecoder;
use serde::Serialize;
use tar::Archive;
use tempfile::NamedTempFile;
use uda_domain::{AssetKind, DownloadSource, HomeLayout, Platform, OFFICIAL_DOWNLOAD_BASE};

use crate::core::errors::UdaError;
use crate::core::fs::{mark_executable, ScratchDir};
use crate::core::runtime::effects::{Downloader, FetchError};

/// Downloads the uv release for a platform into the uda home.
pub struct Installer<'a> {
    downloader: &'a dyn Downloader,
    platform: Platform,
    install_path: PathBuf,
    scratch_root: PathBuf,
    official_base: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct InstallReport {
    pub path: PathBuf,
    pub url: String,
    pub attempts: usize,
    pub fell_back: bool,
}

enum AttemptError {
    Remote(FetchError),
    Local(anyhow::Error),
}

impl From<anyhow::Error> for AttemptError {
    fn from(err: anyhow::Error) -> Self {
        AttemptError::Local(err)
    }
}

impl<'a> Installer<'a> {
    pub fn new(downloader: &'a dyn Downloader, layout: &HomeLayout) -> Self {
        Self {
            downloader,
            platform: Platform::current(),
            install_path: layout.tool_path(),
            scratch_root: layout.cache_dir(),
            official_base: OFFICIAL_DOWNLOAD_BASE.to_string(),
        }
    }

    #[must_use]
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    #[must_use]
    pub fn with_official_base(mut self, base: impl Into<String>) -> Self {
        self.official_base = base.into();
        self
    }

    /// Tries `source`, then the official release page once if `source` was a mirror.
    pub fn install(&self, source: DownloadSource) -> Result<InstallReport> {
        let mut source = source;
        let mut attempts = 0;
        loop {
            attempts += 1;
            let url = self.platform.download_url(&source, &self.official_base);
            tracing::info!(%url, "downloading uv");
            match self.attempt(&url) {
                Ok(()) => {
                    return Ok(InstallReport {
                        path: self.install_path.clone(),
                        url,
                        attempts,
                        fell_back: attempts > 1,
                    });
                }
                Err(AttemptError::Remote(err)) if !source.is_official() => {
                    tracing::warn!(%url, %err, "mirror download failed, retrying from the official source");
                    source = DownloadSource::Official;
                }
                Err(AttemptError::Remote(err)) => {
                    return Err(UdaError::Network {
                        url,
                        reason: err.to_string(),
                    }
                    .into());
                }
                Err(AttemptError::Local(err)) => return Err(err),
            }
        }
    }

    fn attempt(&self, url: &str) -> Result<(), AttemptError> {
        let scratch = ScratchDir::new_in(&self.scratch_root, "uv-download-")?;
        let mut download = NamedTempFile::new_in(scratch.path())
            .map_err(|err| anyhow!(UdaError::io_at("failed to create download file", scratch.path(), err)))?;
        let bytes = match self.downloader.fetch(url, download.as_file_mut()) {
            Ok(bytes) => bytes,
            Err(FetchError::Io(err)) => {
                return Err(AttemptError::Local(
                    UdaError::io_at("failed to write download", download.path(), err).into(),
                ))
            }
            Err(err) => return Err(AttemptError::Remote(err)),
        };
        tracing::debug!(bytes, "download complete");

        if let Some(parent) = self.install_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|err| anyhow!(UdaError::io_at("failed to create", parent, err)))?;
        }
        match self.platform.asset_kind() {
            AssetKind::TarGz => {
                let staging = scratch.path().join("extract");
                extract_tar_gz(download.path(), &staging)?;
                let binary = find_binary(&staging, self.platform.binary_name())?;
                fs::copy(&binary, &self.install_path).map_err(|err| {
                    anyhow!(UdaError::io_at("failed to install uv", &self.install_path, err))
                })?;
            }
            AssetKind::Executable => {
                download.persist(&self.install_path).map_err(|err| {
                    anyhow!(UdaError::io_at("failed to install uv", &self.install_path, err.error))
                })?;
            }
        }
        mark_executable(&self.install_path).map_err(|err| {
            anyhow!(UdaError::io_at("failed to mark uv executable", &self.install_path, err))
        })?;
        Ok(())
    }
}

fn extract_tar_gz(archive: &Path, dest: &Path) -> Result<()> {
    let file = File::open(archive)
        .with_context(|| format!("opening uv archive {}", archive.display()))?;
    let mut tar = Archive::new(GzDecoder::new(file));
    tar.unpack(dest)
        .map_err(|err| anyhow!(UdaError::io_at("failed to extract uv archive", dest, err)))
}

/// Release archives put the binary one directory down (`uv-<target>/uv`).
fn find_binary(root: &Path, name: &str) -> Result<PathBuf> {
    let entries = fs::read_dir(root)
        .map_err(|err| anyhow!(UdaError::io_at("failed to read", root, err)))?;
    let mut dirs: Vec<PathBuf> = entries
        .flatten()
        .filter(|entry| entry.file_type().is_ok_and(|ty| ty.is_dir()))
        .map(|entry| entry.path())
        .collect();
    dirs.sort();
    dirs.into_iter()
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| {
            anyhow!(UdaError::io_at(
                "uv binary not found in archive",
                root,
                std::io::Error::from(std::io::ErrorKind::NotFound),
            ))
        })
}
