//! Command handlers: one request struct and one function per subcommand.

mod envs;
mod mirror;
mod packages;
mod selfcmd;
mod shell;

use anyhow::Result;
use uda_domain::EnvName;

use crate::core::config::context::CommandContext;
use crate::core::envs::EnvironmentStore;
use crate::core::errors::UdaError;

pub use envs::{env_create, env_list, env_remove, CreateRequest, ListRequest, RemoveRequest};
pub use mirror::{
    mirror_probe, mirror_set, mirror_show, MirrorProbeRequest, MirrorSetRequest,
    MirrorShowRequest,
};
pub use packages::{pkg_install, pkg_run, InstallRequest, RunRequest};
pub use selfcmd::{self_install, SelfInstallRequest};
pub use shell::{
    shell_activate, shell_deactivate, shell_init, ActivateRequest, DeactivateRequest, InitRequest,
};

/// Environment a package command applies to: `--env`, then the active
/// marker, then a `VIRTUAL_ENV` that lives under the environments root.
pub(crate) fn target_env(ctx: &CommandContext, explicit: Option<&str>) -> Result<EnvName> {
    let session = ctx.config().session();
    let name = if let Some(raw) = explicit {
        EnvName::parse(raw).map_err(UdaError::from)?
    } else if let Some(active) = session.active_env.as_deref() {
        EnvName::parse(active).map_err(UdaError::from)?
    } else if let Some(name) = session
        .virtual_env
        .as_deref()
        .and_then(|dir| ctx.layout().env_name_for_dir(dir))
    {
        name
    } else {
        return Err(UdaError::NoTargetEnv.into());
    };
    let store = EnvironmentStore::new(ctx.layout(), ctx.runner());
    if !store.exists(&name) {
        return Err(UdaError::EnvNotFound(name.to_string()).into());
    }
    Ok(name)
}
