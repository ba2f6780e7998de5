use std::{
    ffi::OsStr,
    fmt,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context, Result};
use dirs_next::home_dir;

pub const HOME_ENV: &str = "UDA_HOME";
pub const ENVIRONMENTS_DIR: &str = "environments";
pub const CACHE_DIR: &str = "cache";
pub const CONFIG_FILE: &str = "config.toml";
/// Marker value meaning "no environment is active".
pub const BASE_ENV: &str = "base";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
    #[error("environment name is required")]
    Empty,
    #[error("environment name `{0}` is not a valid directory name")]
    Traversal(String),
    #[error("environment name `{0}` contains a path separator")]
    Separator(String),
    #[error("environment name `{BASE_ENV}` is reserved")]
    Reserved,
    #[error("environment name `{0}` contains `$`, a backtick or a control character")]
    ShellUnsafe(String),
}

/// A validated environment name, safe to use as a single path segment.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EnvName(String);

impl EnvName {
    pub fn parse(raw: &str) -> Result<Self, NameError> {
        if raw.is_empty() {
            return Err(NameError::Empty);
        }
        if raw == "." || raw == ".." {
            return Err(NameError::Traversal(raw.to_string()));
        }
        if raw.contains(['/', '\\', '\0']) {
            return Err(NameError::Separator(raw.to_string()));
        }
        if raw == BASE_ENV {
            return Err(NameError::Reserved);
        }
        // bash promptvars and zsh PROMPT_SUBST re-expand PS1 on every prompt
        if raw.chars().any(|c| c == '$' || c == '`' || c.is_control()) {
            return Err(NameError::ShellUnsafe(raw.to_string()));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EnvName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EnvName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Path registry for everything uda keeps on disk.
///
/// Every accessor is pure path arithmetic; nothing here touches the
/// filesystem except [`HomeLayout::ensure`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomeLayout {
    root: PathBuf,
}

impl HomeLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `$UDA_HOME` when set and non-empty, otherwise `~/.uda`.
    ///
    /// A relative override is resolved against the current directory so that
    /// every derived path, including the `PATH` entry activation prepends, is
    /// absolute.
    pub fn from_override(home: Option<&OsStr>) -> Result<Self> {
        if let Some(dir) = home.filter(|value| !value.is_empty()) {
            let root = std::path::absolute(dir)
                .with_context(|| format!("cannot resolve {HOME_ENV}={}", Path::new(dir).display()))?;
            return Ok(Self::new(root));
        }
        let home = home_dir().ok_or_else(|| anyhow!("home directory not found"))?;
        Ok(Self::new(home.join(".uda")))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn environments_root(&self) -> PathBuf {
        self.root.join(ENVIRONMENTS_DIR)
    }

    pub fn env_dir(&self, name: &EnvName) -> PathBuf {
        self.environments_root().join(name.as_str())
    }

    /// Directory an activated environment prepends to `PATH`.
    pub fn env_bin_dir(&self, name: &EnvName) -> PathBuf {
        self.env_dir(name).join(bin_dir_name())
    }

    pub fn env_python(&self, name: &EnvName) -> PathBuf {
        let exe = if cfg!(windows) {
            "python.exe"
        } else {
            "python"
        };
        self.env_bin_dir(name).join(exe)
    }

    /// Maps an absolute environment directory back to its name when it lives
    /// directly under the environments root.
    pub fn env_name_for_dir(&self, dir: &Path) -> Option<EnvName> {
        let parent = dir.parent()?;
        if parent != self.environments_root() {
            return None;
        }
        let name = dir.file_name()?.to_str()?;
        EnvName::parse(name).ok()
    }

    pub fn tool_path(&self) -> PathBuf {
        self.root.join(tool_file_name())
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.root.join(CACHE_DIR)
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    /// Creates the root, environments and cache directories.
    pub fn ensure(&self) -> Result<()> {
        for dir in [self.root.clone(), self.environments_root(), self.cache_dir()] {
            std::fs::create_dir_all(&dir)
                .map_err(|err| anyhow!("failed to create {}: {err}", dir.display()))?;
        }
        Ok(())
    }
}

pub fn bin_dir_name() -> &'static str {
    if cfg!(windows) {
        "Scripts"
    } else {
        "bin"
    }
}

pub fn tool_file_name() -> &'static str {
    if cfg!(windows) {
        "uv.exe"
    } else {
        "uv"
    }
}
