use std::collections::HashMap;
use std::env;
use std::ffi::OsStr;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use uda_domain::{HomeLayout, BASE_ENV, HOME_ENV};

use crate::core::net;

pub const MIRROR_OVERRIDE_ENV: &str = "UV_MIRROR";
pub const ACTIVE_ENV_VAR: &str = "_UDA_ACTIVE_ENV";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalOptions {
    pub quiet: bool,
    pub verbose: u8,
    pub trace: bool,
    pub json: bool,
    pub no_color: bool,
}

#[derive(Debug, Clone)]
pub struct EnvSnapshot {
    vars: HashMap<String, String>,
}

impl EnvSnapshot {
    #[must_use]
    pub fn capture() -> Self {
        Self {
            vars: env::vars().collect(),
        }
    }

    #[must_use]
    pub fn var(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Value of `key` when set to something other than whitespace.
    #[must_use]
    pub fn non_empty(&self, key: &str) -> Option<&str> {
        self.var(key).filter(|value| !value.trim().is_empty())
    }

    #[must_use]
    pub fn testing(pairs: &[(&str, &str)]) -> Self {
        let vars = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Self { vars }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub(crate) layout: HomeLayout,
    pub(crate) network: NetworkConfig,
    pub(crate) session: SessionConfig,
}

impl Config {
    /// Builds a configuration snapshot from the current process environment.
    ///
    /// # Errors
    /// Returns an error if no home directory can be determined.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_snapshot(&EnvSnapshot::capture())
    }

    pub fn from_snapshot(snapshot: &EnvSnapshot) -> anyhow::Result<Self> {
        let layout = HomeLayout::from_override(snapshot.var(HOME_ENV).map(OsStr::new))?;
        Ok(Self {
            layout,
            network: NetworkConfig {
                mirror_override: snapshot
                    .non_empty(MIRROR_OVERRIDE_ENV)
                    .map(|value| value.trim().to_string()),
                keep_proxies: net::keep_proxies(snapshot),
            },
            session: SessionConfig {
                active_env: snapshot
                    .non_empty(ACTIVE_ENV_VAR)
                    .filter(|name| *name != BASE_ENV)
                    .map(ToOwned::to_owned),
                virtual_env: snapshot.non_empty("VIRTUAL_ENV").map(PathBuf::from),
                shell: snapshot.non_empty("SHELL").map(ToOwned::to_owned),
            },
        })
    }

    #[must_use]
    pub fn layout(&self) -> &HomeLayout {
        &self.layout
    }

    #[must_use]
    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }

    #[must_use]
    pub fn session(&self) -> &SessionConfig {
        &self.session
    }
}

#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// `UV_MIRROR`, trimmed; wins over the saved preference.
    pub mirror_override: Option<String>,
    pub keep_proxies: bool,
}

/// What the calling shell says about the active environment.
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    pub active_env: Option<String>,
    pub virtual_env: Option<PathBuf>,
    pub shell: Option<String>,
}
