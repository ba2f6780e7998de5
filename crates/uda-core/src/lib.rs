#![deny(clippy::all)]

mod core;

pub use crate::core::commands::{
    env_create, env_list, env_remove, mirror_probe, mirror_set, mirror_show, pkg_install,
    pkg_run, self_install, shell_activate, shell_deactivate, shell_init, ActivateRequest,
    CreateRequest, DeactivateRequest, InitRequest, InstallRequest, ListRequest,
    MirrorProbeRequest, MirrorSetRequest, MirrorShowRequest, RemoveRequest, RunRequest,
    SelfInstallRequest,
};
pub use crate::core::config::context::{CommandContext, CommandInfo};
pub use crate::core::config::{Config, EnvSnapshot, GlobalOptions, NetworkConfig, SessionConfig};
pub use crate::core::envs::EnvironmentStore;
pub use crate::core::errors::{ErrorKind, UdaError};
pub use crate::core::runtime::effects::{SharedEffects, SystemEffects};
pub use crate::core::runtime::process::RunOutput;
pub use crate::core::runtime::{format_status_message, to_json_response, CommandGroup};
pub use crate::core::shell::ShellDialect;
pub use crate::core::tooling::diagnostics::commands as diag_commands;
pub use crate::core::tooling::{CommandStatus, ExecutionOutcome};
