use std::ffi::OsString;

use anyhow::Result;
use serde_json::json;

use crate::core::config::context::CommandContext;
use crate::core::tooling::progress::ProgressReporter;
use crate::core::tooling::ExecutionOutcome;
use crate::core::uv::{Installer, MirrorResolver};

#[derive(Clone, Debug, Default)]
pub struct SelfInstallRequest {
    /// Download base used instead of the GitHub release page.
    pub official_base: Option<String>,
}

/// Downloads uv into the uda home, preferring a reachable mirror.
///
/// # Errors
/// `NetworkFailure` once the official source has also failed, or an
/// I/O failure while unpacking.
pub fn self_install(ctx: &CommandContext, request: SelfInstallRequest) -> Result<ExecutionOutcome> {
    let layout = ctx.layout();
    let resolver = MirrorResolver::new(
        ctx.config().network().mirror_override.clone(),
        layout.config_path(),
        ctx.downloader(),
    );
    let spinner = ProgressReporter::spinner("Installing uv");
    let source = resolver.choose_source();
    let mut installer = Installer::new(ctx.downloader(), layout);
    if let Some(base) = request.official_base {
        installer = installer.with_official_base(base);
    }
    let report = match installer.install(source) {
        Ok(report) => report,
        Err(err) => {
            drop(spinner);
            return Err(err);
        }
    };
    spinner.finish(format!("Installed uv to {}", report.path.display()));

    let version = ctx
        .runner()
        .run_captured(&report.path, &[OsString::from("--version")], &[])
        .ok()
        .filter(|output| output.success())
        .map(|output| output.stdout.trim().to_string());
    if version.is_none() {
        tracing::warn!(path = %report.path.display(), "installed uv did not report a version");
    }
    Ok(ExecutionOutcome::success(
        format!("installed uv to {}", report.path.display()),
        json!({
            "path": report.path.display().to_string(),
            "url": report.url,
            "attempts": report.attempts,
            "fell_back": report.fell_back,
            "version": version,
        }),
    ))
}
