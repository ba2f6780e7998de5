use std::env;

use crate::mirror::DownloadSource;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssetKind {
    TarGz,
    Executable,
}

/// Target the uv release asset is chosen for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Platform {
    os: String,
    arch: String,
}

impl Platform {
    /// `os` and `arch` may use either Rust or Go style identifiers
    /// (`macos`/`darwin`, `x86_64`/`amd64`).
    pub fn new(os: &str, arch: &str) -> Self {
        Self {
            os: release_os(os).to_string(),
            arch: release_arch(arch).to_string(),
        }
    }

    pub fn current() -> Self {
        Self::new(env::consts::OS, env::consts::ARCH)
    }

    pub fn asset_kind(&self) -> AssetKind {
        if self.os == "linux" {
            AssetKind::TarGz
        } else {
            AssetKind::Executable
        }
    }

    pub fn asset_name(&self) -> String {
        match self.asset_kind() {
            AssetKind::TarGz => format!("uv-{}-unknown-linux-gnu.tar.gz", self.arch),
            AssetKind::Executable => {
                let ext = if self.os == "windows" { ".exe" } else { "" };
                format!("uv-{}-{}{ext}", self.os, self.arch)
            }
        }
    }

    pub fn download_url(&self, source: &DownloadSource, official_base: &str) -> String {
        source.asset_url(official_base, &self.asset_name())
    }

    /// File name of the uv binary inside a release archive.
    pub fn binary_name(&self) -> &'static str {
        if self.os == "windows" {
            "uv.exe"
        } else {
            "uv"
        }
    }
}

/// Maps a process architecture identifier onto uv's release naming.
pub fn release_arch(arch: &str) -> &str {
    match arch {
        "amd64" | "x86_64" => "x86_64",
        "arm64" | "aarch64" => "aarch64",
        other => other,
    }
}

fn release_os(os: &str) -> &str {
    match os {
        "macos" => "darwin",
        other => other,
    }
}
