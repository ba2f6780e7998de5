use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::Result;
use serde_json::json;

use crate::core::commands::target_env;
use crate::core::config::context::CommandContext;
use crate::core::runtime::process::proxy_overrides;
use crate::core::tooling::ExecutionOutcome;
use crate::core::uv::{find_uv, run_uv, with_python};

#[derive(Clone, Debug, Default)]
pub struct InstallRequest {
    pub env: Option<String>,
    pub requirements: Option<PathBuf>,
    pub packages: Vec<String>,
}

#[derive(Clone, Debug, Default)]
pub struct RunRequest {
    pub env: Option<String>,
    pub command: Vec<OsString>,
}

/// `uv pip install` into the target environment's interpreter.
///
/// # Errors
/// User errors when nothing is requested or no environment applies; the
/// `uv` exit status otherwise.
pub fn pkg_install(ctx: &CommandContext, request: InstallRequest) -> Result<ExecutionOutcome> {
    if request.packages.is_empty() && request.requirements.is_none() {
        return Ok(ExecutionOutcome::user_error(
            "no packages specified",
            json!({ "reason": "invalid_arguments", "hint": "uda install <package>... or -r <file>" }),
        ));
    }
    let env = target_env(ctx, request.env.as_deref())?;
    let uv = find_uv(ctx.layout())?;
    let python = ctx.layout().env_python(&env);

    let mut rest = Vec::new();
    if let Some(file) = &request.requirements {
        rest.push(OsString::from("-r"));
        rest.push(file.clone().into_os_string());
    }
    rest.extend(request.packages.iter().map(OsString::from));
    let args = with_python(&["pip", "install"], &python, &rest);
    let envs = proxy_overrides(ctx.config().network().keep_proxies);
    tracing::info!(env = %env, packages = request.packages.len(), "installing packages");
    run_uv(ctx.runner(), &uv, &args, &envs)?;

    let message = match request.packages.len() {
        0 => format!("installed requirements into {env}"),
        1 => format!("installed {} into {env}", request.packages[0]),
        n => format!("installed {n} packages into {env}"),
    };
    Ok(ExecutionOutcome::success(
        message,
        json!({
            "env": env.as_str(),
            "packages": request.packages,
            "requirements": request.requirements.as_ref().map(|path| path.display().to_string()),
        }),
    ))
}

/// `uv run` with the environment's interpreter; no command starts it bare.
///
/// # Errors
/// User errors when no environment applies. A failing command is a
/// `Failure` outcome carrying its exit code, not an error.
pub fn pkg_run(ctx: &CommandContext, request: RunRequest) -> Result<ExecutionOutcome> {
    let env = target_env(ctx, request.env.as_deref())?;
    let uv = find_uv(ctx.layout())?;
    let python = ctx.layout().env_python(&env);
    let command = if request.command.is_empty() {
        vec![python.clone().into_os_string()]
    } else {
        request.command
    };
    // everything after the interpreter belongs to the command, flags included
    let mut args = vec![
        OsString::from("run"),
        OsString::from("--python"),
        python.into_os_string(),
    ];
    args.extend(command);

    let mut envs = proxy_overrides(ctx.config().network().keep_proxies);
    envs.push((
        "VIRTUAL_ENV".to_string(),
        ctx.layout().env_dir(&env).display().to_string(),
    ));
    tracing::debug!(env = %env, "running in environment");
    let output = ctx.runner().run_passthrough(&uv, &args, &envs)?;
    if output.success() {
        return Ok(ExecutionOutcome::success(
            String::new(),
            json!({ "env": env.as_str(), "code": 0, "quiet": true }),
        ));
    }
    // the child's own status becomes ours
    Ok(ExecutionOutcome::failure(
        match output.code {
            Some(code) => format!("command exited with status {code}"),
            None => "command terminated by signal".to_string(),
        },
        json!({
            "env": env.as_str(),
            "code": output.code,
            "reason": "external_tool_failure",
            "quiet": true,
        }),
    ))
}
