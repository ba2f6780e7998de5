#![allow(dead_code)]

use std::{
    fs,
    path::{Path, PathBuf},
};

use assert_cmd::{assert::Assert, cargo::cargo_bin_cmd, Command};
use serde_json::Value;
use tempfile::TempDir;

/// An isolated `UDA_HOME` plus an empty directory used as `PATH`.
pub struct TestHome {
    temp: TempDir,
}

impl TestHome {
    pub fn new() -> Self {
        let temp = tempfile::Builder::new()
            .prefix("uda-cli-")
            .tempdir()
            .expect("tempdir");
        fs::create_dir_all(temp.path().join("empty-path")).expect("path dir");
        Self { temp }
    }

    /// Parent of the home; `root()` is `<dir>/home`.
    pub fn dir(&self) -> &Path {
        self.temp.path()
    }

    pub fn root(&self) -> PathBuf {
        self.temp.path().join("home")
    }

    pub fn env_dir(&self, name: &str) -> PathBuf {
        self.root().join("environments").join(name)
    }

    pub fn uv_log(&self) -> PathBuf {
        self.temp.path().join("uv.log")
    }

    pub fn uv_calls(&self) -> Vec<String> {
        fs::read_to_string(self.uv_log())
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// `uda` with a scrubbed session: no active env, no mirror override,
    /// no colors, and a `PATH` that cannot see a system uv.
    pub fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("uda");
        cmd.env("UDA_HOME", self.root())
            .env("PATH", self.temp.path().join("empty-path"))
            .env("SHELL", "/bin/bash")
            .env("NO_COLOR", "1")
            .env_remove("_UDA_ACTIVE_ENV")
            .env_remove("_UDA_ACTIVE_PATH")
            .env_remove("VIRTUAL_ENV")
            .env_remove("UV_MIRROR")
            .env_remove("UDA_KEEP_PROXIES");
        cmd
    }

    /// Drops a shell-script `uv` into the home. It appends its argv to
    /// `uv.log`, makes `<dir>/bin/python` on `venv <dir>`, and exits with
    /// `$FAKE_UV_EXIT` (default 0).
    #[cfg(unix)]
    pub fn install_fake_uv(&self) {
        use std::os::unix::fs::PermissionsExt;
        fs::create_dir_all(self.root()).expect("home");
        let script = format!(
            "#!/bin/sh\n\
             printf '%s\\n' \"$*\" >> '{log}'\n\
             if [ \"$1\" = venv ]; then mkdir -p \"$2/bin\" && : > \"$2/bin/python\"; fi\n\
             exit \"${{FAKE_UV_EXIT:-0}}\"\n",
            log = self.uv_log().display()
        );
        let uv = self.root().join("uv");
        fs::write(&uv, script).expect("write fake uv");
        fs::set_permissions(&uv, fs::Permissions::from_mode(0o755)).expect("chmod");
    }

    pub fn create_env(&self, name: &str) {
        self.cmd().args(["create", name]).assert().success();
    }
}

pub fn stdout(assert: &Assert) -> String {
    String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 stdout")
}

pub fn stderr(assert: &Assert) -> String {
    String::from_utf8(assert.get_output().stderr.clone()).expect("utf8 stderr")
}

pub fn parse_json(assert: &Assert) -> Value {
    serde_json::from_slice(&assert.get_output().stdout).expect("valid json")
}

pub fn path_str(path: &Path) -> String {
    path.display().to_string()
}
