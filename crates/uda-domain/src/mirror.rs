use serde::Serialize;

/// Host that stands for "download from the official release page".
pub const OFFICIAL_MIRROR: &str = "https://astral.sh";
/// Release download root used when no mirror applies.
pub const OFFICIAL_DOWNLOAD_BASE: &str = "https://github.com/astral-sh/uv/releases/latest/download";
/// Path appended to a mirror base to reach the same release assets.
pub const MIRROR_DOWNLOAD_PATH: &str = "uv/releases/latest/download";
/// Sub-path requested when probing a candidate for liveness.
pub const PROBE_PATH: &str = "simple/";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MirrorCandidate {
    pub name: String,
    pub url: String,
    pub priority: u32,
}

impl MirrorCandidate {
    pub fn new(name: impl Into<String>, url: impl Into<String>, priority: u32) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            priority,
        }
    }

    pub fn probe_url(&self) -> String {
        format!("{}/{PROBE_PATH}", self.url.trim_end_matches('/'))
    }
}

/// Built-in candidates in probe order.
pub fn default_candidates() -> Vec<MirrorCandidate> {
    let mut candidates = vec![
        MirrorCandidate::new("official", OFFICIAL_MIRROR, 0),
        MirrorCandidate::new("tsinghua", "https://pypi.tuna.tsinghua.edu.cn", 1),
        MirrorCandidate::new("aliyun", "https://mirrors.aliyun.com", 2),
    ];
    candidates.sort_by_key(|candidate| candidate.priority);
    candidates
}

/// Where a uv release asset is fetched from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DownloadSource {
    Official,
    Mirror(String),
}

impl DownloadSource {
    /// Classifies a resolved mirror URL. Empty strings and the official host
    /// both mean [`DownloadSource::Official`].
    pub fn from_mirror(url: &str) -> Self {
        let trimmed = url.trim().trim_end_matches('/');
        if trimmed.is_empty() || trimmed == OFFICIAL_MIRROR {
            Self::Official
        } else {
            Self::Mirror(trimmed.to_string())
        }
    }

    pub fn is_official(&self) -> bool {
        matches!(self, Self::Official)
    }

    /// Full download URL of `asset` from this source.
    pub fn asset_url(&self, official_base: &str, asset: &str) -> String {
        match self {
            Self::Official => format!("{}/{asset}", official_base.trim_end_matches('/')),
            Self::Mirror(base) => format!("{base}/{MIRROR_DOWNLOAD_PATH}/{asset}"),
        }
    }
}
