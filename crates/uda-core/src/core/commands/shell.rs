use std::env;
use std::path::PathBuf;

use anyhow::Result;
use serde_json::json;
use uda_domain::{EnvName, BASE_ENV};

use crate::core::config::context::CommandContext;
use crate::core::envs::EnvironmentStore;
use crate::core::errors::UdaError;
use crate::core::shell::{activate_script, deactivate_script, init_script, ShellDialect};
use crate::core::tooling::ExecutionOutcome;

#[derive(Clone, Debug)]
pub struct ActivateRequest {
    pub name: String,
    pub shell: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct DeactivateRequest {
    pub shell: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct InitRequest {
    pub shell: Option<String>,
    /// Path embedded in the wrapper; defaults to the running executable.
    pub binary: Option<PathBuf>,
}

fn dialect(ctx: &CommandContext, explicit: Option<&str>) -> ShellDialect {
    ShellDialect::detect(explicit, ctx.config().session().shell.as_deref())
}

/// Emits the activation script for `name`. `base` means deactivate.
///
/// # Errors
/// `EnvNotFound` or `InvalidName`; nothing is printed in either case.
pub fn shell_activate(ctx: &CommandContext, request: ActivateRequest) -> Result<ExecutionOutcome> {
    let dialect = dialect(ctx, request.shell.as_deref());
    if request.name == BASE_ENV {
        return Ok(ExecutionOutcome::passthrough(
            deactivate_script(dialect),
            json!({ "env": BASE_ENV, "shell": dialect.to_string() }),
        ));
    }
    let name = EnvName::parse(&request.name).map_err(UdaError::from)?;
    let store = EnvironmentStore::new(ctx.layout(), ctx.runner());
    let script = activate_script(&store, &name, dialect)?;
    tracing::debug!(env = %name, shell = %dialect, "activation script ready");
    Ok(ExecutionOutcome::passthrough(
        script,
        json!({ "env": name.as_str(), "shell": dialect.to_string() }),
    ))
}

/// Emits the deactivation script; harmless when nothing is active.
///
/// # Errors
/// Never fails today; kept fallible like every other handler.
pub fn shell_deactivate(
    ctx: &CommandContext,
    request: DeactivateRequest,
) -> Result<ExecutionOutcome> {
    let dialect = dialect(ctx, request.shell.as_deref());
    Ok(ExecutionOutcome::passthrough(
        deactivate_script(dialect),
        json!({ "shell": dialect.to_string() }),
    ))
}

/// Emits the shell integration to be sourced from an rc file.
///
/// # Errors
/// Returns an error if the running executable cannot be located.
pub fn shell_init(ctx: &CommandContext, request: InitRequest) -> Result<ExecutionOutcome> {
    let dialect = dialect(ctx, request.shell.as_deref());
    let binary = match request.binary {
        Some(path) => path,
        None => current_binary()?,
    };
    Ok(ExecutionOutcome::passthrough(
        init_script(dialect, &binary),
        json!({ "shell": dialect.to_string(), "binary": binary.display().to_string() }),
    ))
}

fn current_binary() -> Result<PathBuf> {
    let exe = env::current_exe()
        .map_err(|err| UdaError::io("failed to locate the uda executable", err))?;
    Ok(exe.canonicalize().unwrap_or(exe))
}
