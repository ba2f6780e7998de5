use std::ffi::{OsStr, OsString};
use std::path::Path;

use anyhow::Result;

use crate::core::errors::UdaError;
use crate::core::runtime::effects::ToolRunner;

/// Arguments for `uv <subcommand...>` with `--python` injected after the
/// subcommand unless the caller already chose an interpreter.
pub fn with_python(subcommand: &[&str], python: &Path, rest: &[OsString]) -> Vec<OsString> {
    let mut args: Vec<OsString> = subcommand.iter().map(OsString::from).collect();
    if !selects_python(rest) {
        args.push("--python".into());
        args.push(python.as_os_str().to_owned());
    }
    args.extend(rest.iter().cloned());
    args
}

fn selects_python(args: &[OsString]) -> bool {
    args.iter().map(|arg| arg.to_string_lossy()).any(|arg| {
        arg == "--python" || arg.starts_with("--python=") || arg == "-p"
    })
}

/// Runs uv with inherited stdio; a non-zero exit becomes [`UdaError::ExternalTool`].
pub fn run_uv(
    runner: &dyn ToolRunner,
    uv: &Path,
    args: &[OsString],
    envs: &[(String, String)],
) -> Result<()> {
    tracing::debug!(uv = %uv.display(), args = ?args, "running uv");
    let output = runner.run_passthrough(uv, args, envs)?;
    if output.success() {
        return Ok(());
    }
    Err(UdaError::ExternalTool {
        command: describe(args),
        code: output.code,
    }
    .into())
}

// `uv venv` style label: the leading non-flag words only.
fn describe(args: &[OsString]) -> String {
    let words: Vec<_> = args
        .iter()
        .map(OsString::as_os_str)
        .map(OsStr::to_string_lossy)
        .take_while(|arg| !arg.starts_with('-') && !arg.contains(std::path::MAIN_SEPARATOR))
        .take(2)
        .collect();
    if words.is_empty() {
        "uv".to_string()
    } else {
        format!("uv {}", words.join(" "))
    }
}
