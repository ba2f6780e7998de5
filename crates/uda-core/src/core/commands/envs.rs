use anyhow::Result;
use serde_json::json;
use uda_domain::EnvName;

use crate::core::config::context::CommandContext;
use crate::core::envs::EnvironmentStore;
use crate::core::errors::UdaError;
use crate::core::tooling::ExecutionOutcome;
use crate::core::uv::find_uv;

#[derive(Clone, Debug)]
pub struct CreateRequest {
    pub name: String,
    pub python: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct ListRequest;

#[derive(Clone, Debug)]
pub struct RemoveRequest {
    pub name: String,
}

/// Creates a named environment, installing the requested interpreter first.
///
/// # Errors
/// `AlreadyExists` when the name is taken, `ToolNotFound` without uv, or
/// the failure of the underlying `uv` call.
pub fn env_create(ctx: &CommandContext, request: CreateRequest) -> Result<ExecutionOutcome> {
    let name = EnvName::parse(&request.name).map_err(UdaError::from)?;
    let store = EnvironmentStore::new(ctx.layout(), ctx.runner());
    if store.exists(&name) {
        return Err(UdaError::AlreadyExists(name.to_string()).into());
    }
    let uv = find_uv(ctx.layout())?;
    let python = request
        .python
        .as_deref()
        .map(str::trim)
        .filter(|version| !version.is_empty());
    let dir = store.create(&uv, &name, python)?;
    Ok(ExecutionOutcome::success(
        format!("created environment {name}"),
        json!({
            "env": name.as_str(),
            "path": dir.display().to_string(),
            "python": python,
            "hint": format!("activate with `uda activate {name}`"),
        }),
    ))
}

/// Prints environment names, one per line.
///
/// # Errors
/// Returns an error if the environments directory cannot be read.
pub fn env_list(ctx: &CommandContext, _request: ListRequest) -> Result<ExecutionOutcome> {
    let store = EnvironmentStore::new(ctx.layout(), ctx.runner());
    let names = store.list()?;
    let text = if names.is_empty() {
        "No environments found".to_string()
    } else {
        names.join("\n")
    };
    Ok(ExecutionOutcome::passthrough(
        text,
        json!({ "environments": names }),
    ))
}

/// Deletes a named environment.
///
/// # Errors
/// `EnvNotFound` when nothing by that name exists.
pub fn env_remove(ctx: &CommandContext, request: RemoveRequest) -> Result<ExecutionOutcome> {
    let name = EnvName::parse(&request.name).map_err(UdaError::from)?;
    let store = EnvironmentStore::new(ctx.layout(), ctx.runner());
    if !store.exists(&name) {
        return Err(UdaError::EnvNotFound(name.to_string()).into());
    }
    store.remove(&name)?;
    if ctx.config().session().active_env.as_deref() == Some(name.as_str()) {
        tracing::warn!(env = %name, "removed the active environment; run `uda deactivate`");
    }
    Ok(ExecutionOutcome::success(
        format!("removed environment {name}"),
        json!({ "env": name.as_str() }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::commands::testing::*;

    #[test]
    fn create_list_remove() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let layout = home(temp.path())?;
        let global = global();
        let effects = shared(FakeEffects::default());
        let ctx = CommandContext::with_parts(&global, config(temp.path(), &[])?, effects.clone());

        let outcome = env_list(&ctx, ListRequest)?;
        assert!(outcome.is_passthrough());
        assert_eq!(outcome.message, "No environments found");

        let created = env_create(
            &ctx,
            CreateRequest {
                name: "ml".into(),
                python: Some("3.12".into()),
            },
        )?;
        assert_eq!(created.message, "created environment ml");
        assert_eq!(created.details["python"], "3.12");
        let calls = effects.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].0, layout.tool_path());
        assert_eq!(calls[0].1, vec!["python", "install", "3.12"]);
        assert_eq!(calls[1].1[0], "venv");

        assert_eq!(env_list(&ctx, ListRequest)?.message, "ml");

        env_remove(&ctx, RemoveRequest { name: "ml".into() })?;
        assert_eq!(env_list(&ctx, ListRequest)?.message, "No environments found");
        Ok(())
    }

    #[test]
    fn duplicate_create_is_rejected_before_uv_runs() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let layout = home(temp.path())?;
        std::fs::create_dir_all(layout.environments_root().join("ml"))?;
        let global = global();
        let effects = shared(FakeEffects::default());
        let ctx = CommandContext::with_parts(&global, config(temp.path(), &[])?, effects.clone());

        let err = env_create(
            &ctx,
            CreateRequest {
                name: "ml".into(),
                python: None,
            },
        )
        .expect_err("exists");
        assert!(matches!(
            err.downcast_ref::<UdaError>(),
            Some(UdaError::AlreadyExists(_))
        ));
        assert!(effects.calls().is_empty());
        Ok(())
    }

    #[test]
    fn invalid_and_missing_names_are_user_errors() -> Result<()> {
        let temp = tempfile::tempdir()?;
        home(temp.path())?;
        let global = global();
        let ctx = CommandContext::with_parts(
            &global,
            config(temp.path(), &[])?,
            shared(FakeEffects::default()),
        );

        for name in ["", "..", "a/b", "base"] {
            let err = env_create(
                &ctx,
                CreateRequest {
                    name: name.into(),
                    python: None,
                },
            )
            .expect_err("invalid");
            let err = err.downcast_ref::<UdaError>().expect("typed");
            assert!(err.is_user_error(), "{name}: {err}");
        }

        let err = env_remove(&ctx, RemoveRequest { name: "ghost".into() }).expect_err("absent");
        assert_eq!(err.to_string(), "environment ghost does not exist");
        Ok(())
    }

    #[test]
    fn create_without_uv_reports_tool_not_found() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let global = global();
        let cfg = config(temp.path(), &[])?;
        cfg.layout().ensure()?;
        let ctx = CommandContext::with_parts(&global, cfg, shared(FakeEffects::default()));
        let err = env_create(
            &ctx,
            CreateRequest {
                name: "ml".into(),
                python: None,
            },
        );
        // a uv on PATH would be found instead
        if which::which("uv").is_err() {
            let err = err.expect_err("no uv");
            assert!(matches!(
                err.downcast_ref::<UdaError>(),
                Some(UdaError::ToolNotFound)
            ));
        }
        Ok(())
    }
}
