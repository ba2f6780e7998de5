use std::path::PathBuf;
use std::time::Duration;

use uda_domain::{default_candidates, DownloadSource, MirrorCandidate, Settings};

use crate::core::errors::UdaError;
use crate::core::runtime::effects::Downloader;

pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Picks the host the uv binary is downloaded from.
pub struct MirrorResolver<'a> {
    override_url: Option<String>,
    config_path: PathBuf,
    candidates: Vec<MirrorCandidate>,
    timeout: Duration,
    downloader: &'a dyn Downloader,
}

impl<'a> MirrorResolver<'a> {
    pub fn new(
        override_url: Option<String>,
        config_path: PathBuf,
        downloader: &'a dyn Downloader,
    ) -> Self {
        Self {
            override_url,
            config_path,
            candidates: default_candidates(),
            timeout: PROBE_TIMEOUT,
            downloader,
        }
    }

    #[must_use]
    pub fn with_candidates(mut self, mut candidates: Vec<MirrorCandidate>) -> Self {
        candidates.sort_by_key(|candidate| candidate.priority);
        self.candidates = candidates;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn candidates(&self) -> &[MirrorCandidate] {
        &self.candidates
    }

    /// `UV_MIRROR`, then the saved preference, then `""` for "nothing pinned".
    pub fn resolve(&self) -> String {
        if let Some(url) = self.override_url.as_deref().map(str::trim) {
            if !url.is_empty() {
                return url.to_string();
            }
        }
        match Settings::load(&self.config_path) {
            Ok(settings) => settings.mirror_url().unwrap_or_default().to_string(),
            Err(err) => {
                tracing::warn!(
                    path = %self.config_path.display(),
                    "ignoring unreadable mirror config: {err:#}"
                );
                String::new()
            }
        }
    }

    /// First candidate, by priority, whose `/simple/` index answers 200.
    pub fn find_working(&self) -> Result<MirrorCandidate, UdaError> {
        for candidate in &self.candidates {
            let url = candidate.probe_url();
            if self.downloader.probe(&url, self.timeout) {
                tracing::debug!(name = %candidate.name, url = %candidate.url, "mirror reachable");
                return Ok(candidate.clone());
            }
            tracing::debug!(name = %candidate.name, url = %url, "mirror unreachable");
        }
        Err(UdaError::NoWorkingMirror)
    }

    /// Download source for the first install attempt.
    pub fn choose_source(&self) -> DownloadSource {
        let pinned = self.resolve();
        if !pinned.is_empty() {
            return DownloadSource::from_mirror(&pinned);
        }
        match self.find_working() {
            Ok(candidate) => DownloadSource::from_mirror(&candidate.url),
            Err(err) => {
                tracing::debug!(%err, "falling back to the official source");
                DownloadSource::Official
            }
        }
    }
}
