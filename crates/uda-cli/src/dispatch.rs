use color_eyre::Result;
use serde_json::{json, Value};
use uda_core::{
    diag_commands, ActivateRequest, CommandContext, CommandGroup, CommandInfo, CreateRequest,
    DeactivateRequest, ExecutionOutcome, InitRequest, InstallRequest, ListRequest,
    MirrorProbeRequest, MirrorSetRequest, MirrorShowRequest, RemoveRequest, RunRequest,
    SelfInstallRequest, UdaError,
};

use crate::cli::{CommandGroupCli, MirrorCommand, SelfCommand};

pub fn command_info(group: &CommandGroupCli) -> CommandInfo {
    match group {
        CommandGroupCli::Create(_) => CommandInfo::new(CommandGroup::Create, "create"),
        CommandGroupCli::List => CommandInfo::new(CommandGroup::List, "list"),
        CommandGroupCli::Remove(_) => CommandInfo::new(CommandGroup::Remove, "remove"),
        CommandGroupCli::Activate(_) => CommandInfo::new(CommandGroup::Activate, "activate"),
        CommandGroupCli::Deactivate(_) => {
            CommandInfo::new(CommandGroup::Deactivate, "deactivate")
        }
        CommandGroupCli::Init(_) => CommandInfo::new(CommandGroup::Init, "init"),
        CommandGroupCli::Install(_) => CommandInfo::new(CommandGroup::Install, "install"),
        CommandGroupCli::Run(_) => CommandInfo::new(CommandGroup::Run, "run"),
        CommandGroupCli::SelfCmd(SelfCommand::Install) => {
            CommandInfo::new(CommandGroup::SelfManage, "install")
        }
        CommandGroupCli::Mirror(MirrorCommand::Show) => {
            CommandInfo::new(CommandGroup::Mirror, "show")
        }
        CommandGroupCli::Mirror(MirrorCommand::Set(_)) => {
            CommandInfo::new(CommandGroup::Mirror, "set")
        }
        CommandGroupCli::Mirror(MirrorCommand::Probe) => {
            CommandInfo::new(CommandGroup::Mirror, "probe")
        }
    }
}

pub fn dispatch_command(
    ctx: &CommandContext,
    group: &CommandGroupCli,
) -> Result<(CommandInfo, ExecutionOutcome)> {
    let info = command_info(group);
    match group {
        CommandGroupCli::Create(args) => {
            let request = CreateRequest {
                name: args.name.clone(),
                python: args.python.clone(),
            };
            core_call(info, || uda_core::env_create(ctx, request))
        }
        CommandGroupCli::List => core_call(info, || uda_core::env_list(ctx, ListRequest)),
        CommandGroupCli::Remove(args) => {
            let request = RemoveRequest {
                name: args.name.clone(),
            };
            core_call(info, || uda_core::env_remove(ctx, request))
        }
        CommandGroupCli::Activate(args) => {
            let request = ActivateRequest {
                name: args.name.clone(),
                shell: args.shell.shell.clone(),
            };
            core_call(info, || uda_core::shell_activate(ctx, request))
        }
        CommandGroupCli::Deactivate(args) => {
            let request = DeactivateRequest {
                shell: args.shell.clone(),
            };
            core_call(info, || uda_core::shell_deactivate(ctx, request))
        }
        CommandGroupCli::Init(args) => {
            let request = InitRequest {
                shell: args.shell.clone().or_else(|| args.dialect.clone()),
                binary: None,
            };
            core_call(info, || uda_core::shell_init(ctx, request))
        }
        CommandGroupCli::Install(args) => {
            let request = InstallRequest {
                env: args.env.clone(),
                requirements: args.requirements.clone(),
                packages: args.packages.clone(),
            };
            core_call(info, || uda_core::pkg_install(ctx, request))
        }
        CommandGroupCli::Run(args) => {
            let request = RunRequest {
                env: args.env.clone(),
                command: args.command.clone(),
            };
            core_call(info, || uda_core::pkg_run(ctx, request))
        }
        CommandGroupCli::SelfCmd(SelfCommand::Install) => core_call(info, || {
            uda_core::self_install(ctx, SelfInstallRequest::default())
        }),
        CommandGroupCli::Mirror(MirrorCommand::Show) => {
            core_call(info, || uda_core::mirror_show(ctx, MirrorShowRequest))
        }
        CommandGroupCli::Mirror(MirrorCommand::Set(args)) => {
            let request = MirrorSetRequest {
                url: args.url.clone(),
                name: args.name.clone(),
                priority: args.priority,
            };
            core_call(info, || uda_core::mirror_set(ctx, request))
        }
        CommandGroupCli::Mirror(MirrorCommand::Probe) => {
            core_call(info, || uda_core::mirror_probe(ctx, MirrorProbeRequest))
        }
    }
}

fn core_call<F>(info: CommandInfo, action: F) -> Result<(CommandInfo, ExecutionOutcome)>
where
    F: FnOnce() -> anyhow::Result<ExecutionOutcome>,
{
    match action() {
        Ok(outcome) => Ok((info, outcome)),
        Err(err) => Ok((info, outcome_from_error(info, &err))),
    }
}

/// Typed failures keep their kind; anything else is an internal error.
pub fn outcome_from_error(info: CommandInfo, err: &anyhow::Error) -> ExecutionOutcome {
    if let Some(uda) = err.downcast_ref::<UdaError>() {
        let mut details = uda.details();
        if let Value::Object(map) = &mut details {
            map.insert("diagnostic".into(), Value::String(error_code(info).into()));
        }
        return if uda.is_user_error() {
            ExecutionOutcome::user_error(uda.to_string(), details)
        } else {
            ExecutionOutcome::failure(uda.to_string(), details)
        };
    }
    let issues: Vec<String> = err.chain().map(std::string::ToString::to_string).collect();
    ExecutionOutcome::failure(
        err.to_string(),
        json!({
            "reason": "internal_error",
            "diagnostic": error_code(info),
            "issues": issues,
            "hint": "Re-run with `-vv` for more detail, or open an issue if this persists.",
        }),
    )
}

fn error_code(info: CommandInfo) -> &'static str {
    match info.group {
        CommandGroup::Create => diag_commands::CREATE,
        CommandGroup::List => diag_commands::LIST,
        CommandGroup::Remove => diag_commands::REMOVE,
        CommandGroup::Activate => diag_commands::ACTIVATE,
        CommandGroup::Deactivate => diag_commands::DEACTIVATE,
        CommandGroup::Init => diag_commands::INIT,
        CommandGroup::Install => diag_commands::INSTALL,
        CommandGroup::Run => diag_commands::RUN,
        CommandGroup::SelfManage => diag_commands::SELF,
        CommandGroup::Mirror => diag_commands::MIRROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uda_core::CommandStatus;

    #[test]
    fn typed_errors_keep_their_kind() {
        let info = CommandInfo::new(CommandGroup::Activate, "activate");
        let err = anyhow::Error::from(UdaError::EnvNotFound("ml".into()));
        let outcome = outcome_from_error(info, &err);
        assert_eq!(outcome.status, CommandStatus::UserError);
        assert_eq!(outcome.message, "environment ml does not exist");
        assert_eq!(outcome.details["reason"], "not_found");
        assert_eq!(outcome.details["diagnostic"], diag_commands::ACTIVATE);

        let err = anyhow::Error::from(UdaError::ExternalTool {
            command: "uv venv".into(),
            code: Some(1),
        });
        assert_eq!(
            outcome_from_error(info, &err).status,
            CommandStatus::Failure
        );
    }

    #[test]
    fn context_wrapped_errors_are_still_typed() {
        let info = CommandInfo::new(CommandGroup::Create, "create");
        let err = anyhow::Error::from(UdaError::AlreadyExists("ml".into()))
            .context("while creating");
        let outcome = outcome_from_error(info, &err);
        assert_eq!(outcome.status, CommandStatus::UserError);
    }

    #[test]
    fn untyped_errors_are_internal() {
        let info = CommandInfo::new(CommandGroup::Mirror, "set");
        let err = anyhow::anyhow!("disk on fire").context("saving config");
        let outcome = outcome_from_error(info, &err);
        assert_eq!(outcome.status, CommandStatus::Failure);
        assert_eq!(outcome.details["reason"], "internal_error");
        assert_eq!(outcome.details["issues"][1], "disk on fire");
    }
}
