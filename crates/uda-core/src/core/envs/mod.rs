//! Named environments stored as directories under `<home>/environments`.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::Result;
use uda_domain::{EnvName, HomeLayout};

use crate::core::errors::UdaError;
use crate::core::fs::remove_dir_all_writable;
use crate::core::runtime::effects::ToolRunner;
use crate::core::uv::run_uv;

pub struct EnvironmentStore<'a> {
    layout: &'a HomeLayout,
    runner: &'a dyn ToolRunner,
}

impl<'a> EnvironmentStore<'a> {
    pub fn new(layout: &'a HomeLayout, runner: &'a dyn ToolRunner) -> Self {
        Self { layout, runner }
    }

    pub fn layout(&self) -> &HomeLayout {
        self.layout
    }

    /// True iff the environment directory is present.
    pub fn exists(&self, name: &EnvName) -> bool {
        let dir = self.layout.env_dir(name);
        match fs::metadata(&dir) {
            Ok(meta) => meta.is_dir(),
            Err(err) if err.kind() == io::ErrorKind::NotFound => false,
            Err(err) => {
                tracing::warn!(path = %dir.display(), %err, "cannot inspect environment");
                false
            }
        }
    }

    /// Names of all environments, sorted.
    pub fn list(&self) -> Result<Vec<String>> {
        let root = self.layout.environments_root();
        let entries = match fs::read_dir(&root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(UdaError::io_at("failed to read environments", root, err).into()),
        };
        let mut names = Vec::new();
        for entry in entries {
            let entry =
                entry.map_err(|err| UdaError::io_at("failed to read environments", &root, err))?;
            let is_dir = entry.file_type().is_ok_and(|ty| ty.is_dir());
            if !is_dir {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => tracing::warn!(name = ?raw, "skipping non UTF-8 environment name"),
            }
        }
        names.sort();
        Ok(names)
    }

    /// Installs the requested interpreter (if any), makes the directory and
    /// runs `uv venv` into it. A failed `uv` run leaves the directory behind.
    pub fn create(&self, uv: &Path, name: &EnvName, python: Option<&str>) -> Result<PathBuf> {
        if let Some(version) = python {
            tracing::info!(version, "installing python");
            run_uv(
                self.runner,
                uv,
                &[
                    OsString::from("python"),
                    OsString::from("install"),
                    OsString::from(version),
                ],
                &[],
            )?;
        }
        let dir = self.layout.env_dir(name);
        fs::create_dir_all(&dir)
            .map_err(|err| UdaError::io_at("failed to create environment", &dir, err))?;
        let mut args = vec![OsString::from("venv"), dir.clone().into_os_string()];
        if let Some(version) = python {
            args.push("--python".into());
            args.push(version.into());
        }
        run_uv(self.runner, uv, &args, &[])?;
        tracing::debug!(path = %dir.display(), "environment created");
        Ok(dir)
    }

    /// Recursive removal; an absent environment is already removed.
    pub fn remove(&self, name: &EnvName) -> Result<()> {
        let dir = self.layout.env_dir(name);
        remove_dir_all_writable(&dir)
            .map_err(|err| UdaError::io_at("failed to remove environment", &dir, err))?;
        Ok(())
    }
}
