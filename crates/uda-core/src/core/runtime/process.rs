use std::{
    ffi::OsString,
    io::Read,
    path::Path,
    process::{Command, Stdio},
    thread,
};

use anyhow::{Context, Result};

use crate::core::tooling::progress::ProgressSuspendGuard;

const PROXY_VARS: [&str; 8] = [
    "HTTP_PROXY",
    "http_proxy",
    "HTTPS_PROXY",
    "https_proxy",
    "ALL_PROXY",
    "all_proxy",
    "NO_PROXY",
    "no_proxy",
];

fn is_proxy_env(key: &str) -> bool {
    PROXY_VARS.contains(&key)
}

/// Env overrides that strip inherited proxy settings from a child unless
/// they should be kept.
pub(crate) fn proxy_overrides(keep_proxies: bool) -> Vec<(String, String)> {
    if keep_proxies {
        return Vec::new();
    }
    PROXY_VARS
        .iter()
        .map(|key| ((*key).to_string(), String::new()))
        .collect()
}

const MAX_CAPTURE_BYTES: usize = 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutput {
    /// `None` when the child was terminated by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl RunOutput {
    #[must_use]
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Execute a program and capture stdout/stderr.
///
/// # Errors
///
/// Returns an error when the program cannot be spawned or the I/O streams cannot
/// be read entirely.
pub fn run_command(
    program: &Path,
    args: &[OsString],
    envs: &[(String, String)],
) -> Result<RunOutput> {
    let mut command = configured_command(program, args, envs);
    command.stdin(Stdio::null());
    command.stdout(Stdio::piped());
    command.stderr(Stdio::piped());

    let display = program.display().to_string();
    let mut child = command
        .spawn()
        .with_context(|| format!("failed to start {display}"))?;
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| anyhow::anyhow!("stdout missing for {display}"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| anyhow::anyhow!("stderr missing for {display}"))?;
    let stdout_handle = thread::spawn(move || read_to_string_limited(stdout, MAX_CAPTURE_BYTES));
    let stderr_handle = thread::spawn(move || read_to_string_limited(stderr, MAX_CAPTURE_BYTES));

    let status = child
        .wait()
        .with_context(|| format!("failed to wait for {display}"))?;
    let stdout = stdout_handle
        .join()
        .map_err(|_| anyhow::anyhow!("stdout thread panicked"))??;
    let stderr = stderr_handle
        .join()
        .map_err(|_| anyhow::anyhow!("stderr thread panicked"))??;
    Ok(RunOutput {
        code: status.code(),
        stdout,
        stderr,
    })
}

/// Execute a program with inherited stdio so the user sees its output live.
///
/// # Errors
///
/// Returns an error when the program cannot be spawned.
pub fn run_command_passthrough(
    program: &Path,
    args: &[OsString],
    envs: &[(String, String)],
) -> Result<RunOutput> {
    let _suspend = ProgressSuspendGuard::new();
    let mut command = configured_command(program, args, envs);
    command.stdin(Stdio::inherit());
    command.stdout(Stdio::inherit());
    command.stderr(Stdio::inherit());

    let status = command
        .status()
        .with_context(|| format!("failed to start {}", program.display()))?;
    Ok(RunOutput {
        code: status.code(),
        stdout: String::new(),
        stderr: String::new(),
    })
}

fn configured_command(program: &Path, args: &[OsString], envs: &[(String, String)]) -> Command {
    let mut command = Command::new(program);
    command.args(args);
    for (key, value) in envs {
        if value.is_empty() && is_proxy_env(key) {
            command.env_remove(key);
            continue;
        }
        command.env(key, value);
    }
    command
}

fn read_to_string_limited(mut reader: impl Read, limit: usize) -> Result<String> {
    let mut buffer = Vec::new();
    let mut truncated = false;
    let mut chunk = [0u8; 8192];
    loop {
        let read = reader.read(&mut chunk)?;
        if read == 0 {
            break;
        }
        let room = limit.saturating_sub(buffer.len());
        if read > room {
            truncated = true;
        }
        buffer.extend_from_slice(&chunk[..read.min(room)]);
    }
    let mut text = String::from_utf8_lossy(&buffer).to_string();
    if truncated {
        text.push_str("\n[...truncated...]\n");
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<OsString> {
        values.iter().map(OsString::from).collect()
    }

    #[cfg(unix)]
    #[test]
    fn run_command_captures_output_and_status_unix() -> Result<()> {
        let output = run_command(
            Path::new("/bin/sh"),
            &args(&["-c", "printf out && printf err >&2; exit 7"]),
            &[],
        )?;
        assert_eq!(output.code, Some(7));
        assert!(!output.success());
        assert_eq!(output.stdout, "out");
        assert_eq!(output.stderr, "err");
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn run_command_truncates_large_output_unix() -> Result<()> {
        let bytes = MAX_CAPTURE_BYTES + 1024;
        let output = run_command(
            Path::new("/bin/sh"),
            &args(&["-c", &format!("head -c {bytes} /dev/zero | tr '\\0' a")]),
            &[],
        )?;
        assert!(output.stdout.contains("[...truncated...]"));
        assert!(output.stdout.len() <= MAX_CAPTURE_BYTES + 64);
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn run_command_passthrough_returns_status_unix() -> Result<()> {
        let output = run_command_passthrough(Path::new("/bin/sh"), &args(&["-c", "exit 3"]), &[])?;
        assert_eq!(output.code, Some(3));
        assert!(output.stdout.is_empty());
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn run_command_removes_proxy_vars_when_empty() -> Result<()> {
        let script = r#"if [ -z "${HTTP_PROXY+x}" ] && [ -z "${NO_PROXY+x}" ]; then echo missing; else echo present; fi"#;
        let output = run_command(
            Path::new("/bin/sh"),
            &args(&["-c", script]),
            &[
                ("HTTP_PROXY".into(), String::new()),
                ("NO_PROXY".into(), String::new()),
            ],
        )?;
        assert_eq!(output.stdout.trim(), "missing");
        Ok(())
    }

    #[test]
    fn spawning_a_missing_program_is_an_error() {
        let result = run_command(Path::new("/definitely/not/here/uv"), &[], &[]);
        assert!(result.is_err());
    }
}
