use anyhow::Result;
use serde_json::json;
use uda_domain::{save_mirror, MirrorPreference, Settings};
use url::Url;

use crate::core::config::context::CommandContext;
use crate::core::tooling::ExecutionOutcome;
use crate::core::uv::MirrorResolver;

#[derive(Clone, Debug, Default)]
pub struct MirrorShowRequest;

#[derive(Clone, Debug)]
pub struct MirrorSetRequest {
    pub url: String,
    pub name: Option<String>,
    pub priority: i64,
}

#[derive(Clone, Debug, Default)]
pub struct MirrorProbeRequest;

/// Reports the mirror `self install` would start from and where it came from.
///
/// # Errors
/// Never fails; a malformed config reads as unpinned.
pub fn mirror_show(ctx: &CommandContext, _request: MirrorShowRequest) -> Result<ExecutionOutcome> {
    let network = ctx.config().network();
    let config_path = ctx.layout().config_path();
    let resolver = MirrorResolver::new(
        network.mirror_override.clone(),
        config_path.clone(),
        ctx.downloader(),
    );
    let resolved = resolver.resolve();
    let origin = if network.mirror_override.is_some() {
        "UV_MIRROR"
    } else if resolved.is_empty() {
        "unset"
    } else {
        "config"
    };
    let message = if resolved.is_empty() {
        "no mirror pinned; `uda self install` probes the built-in list".to_string()
    } else {
        format!("{resolved} (from {origin})")
    };
    Ok(ExecutionOutcome::success(
        message,
        json!({
            "url": resolved,
            "origin": origin,
            "config": config_path.display().to_string(),
            "candidates": resolver.candidates(),
        }),
    ))
}

/// Persists a mirror preference in `config.toml`.
///
/// # Errors
/// Returns an error if the config file cannot be read or written.
pub fn mirror_set(ctx: &CommandContext, request: MirrorSetRequest) -> Result<ExecutionOutcome> {
    let parsed = match Url::parse(request.url.trim()) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => url,
        Ok(url) => {
            return Ok(ExecutionOutcome::user_error(
                format!("unsupported mirror scheme `{}`", url.scheme()),
                json!({ "reason": "invalid_mirror", "url": request.url }),
            ))
        }
        Err(err) => {
            return Ok(ExecutionOutcome::user_error(
                format!("invalid mirror url `{}`: {err}", request.url),
                json!({ "reason": "invalid_mirror", "url": request.url }),
            ))
        }
    };
    let url = parsed.as_str().trim_end_matches('/').to_string();
    let preference = MirrorPreference {
        name: request
            .name
            .unwrap_or_else(|| parsed.host_str().unwrap_or("custom").to_string()),
        url,
        priority: request.priority,
    };
    let path = ctx.layout().config_path();
    save_mirror(&path, &preference)?;
    if ctx.config().network().mirror_override.is_some() {
        tracing::warn!("UV_MIRROR is set and takes precedence over the saved mirror");
    }
    Ok(ExecutionOutcome::success(
        format!("mirror set to {}", preference.url),
        json!({ "mirror": preference, "config": path.display().to_string() }),
    ))
}

/// Probes the built-in candidates and reports the first one that answers.
///
/// # Errors
/// `NoWorkingMirror` when every candidate is unreachable.
pub fn mirror_probe(ctx: &CommandContext, _request: MirrorProbeRequest) -> Result<ExecutionOutcome> {
    let settings = Settings::load(&ctx.layout().config_path()).unwrap_or_else(|err| {
        tracing::warn!("ignoring unreadable mirror config: {err:#}");
        Settings::default()
    });
    let mut candidates = uda_domain::default_candidates();
    if let Some(saved) = settings.mirror.filter(|mirror| !mirror.url.trim().is_empty()) {
        let priority = u32::try_from(saved.priority.max(0)).unwrap_or(u32::MAX);
        let name = if saved.name.is_empty() {
            "saved".to_string()
        } else {
            saved.name
        };
        candidates.push(uda_domain::MirrorCandidate::new(name, saved.url, priority));
    }
    let resolver = MirrorResolver::new(None, ctx.layout().config_path(), ctx.downloader())
        .with_candidates(candidates);
    let candidate = resolver.find_working()?;
    Ok(ExecutionOutcome::success(
        format!("{} ({}) is reachable", candidate.name, candidate.url),
        json!({ "mirror": candidate }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::commands::testing::*;
    use crate::core::errors::UdaError;
    use crate::core::tooling::CommandStatus;
    use std::fs;

    #[test]
    fn set_then_show_round_trips_through_config() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let global = global();
        let cfg = config(temp.path(), &[])?;
        cfg.layout().ensure()?;
        let config_path = cfg.layout().config_path();
        let ctx = CommandContext::with_parts(&global, cfg, shared(FakeEffects::default()));

        let shown = mirror_show(&ctx, MirrorShowRequest)?;
        assert_eq!(shown.details["origin"], "unset");

        let set = mirror_set(
            &ctx,
            MirrorSetRequest {
                url: "https://mirrors.example.org/".into(),
                name: None,
                priority: 3,
            },
        )?;
        assert_eq!(set.message, "mirror set to https://mirrors.example.org");
        assert_eq!(set.details["mirror"]["name"], "mirrors.example.org");
        let saved = Settings::load(&config_path)?;
        assert_eq!(saved.mirror_url(), Some("https://mirrors.example.org"));

        let shown = mirror_show(&ctx, MirrorShowRequest)?;
        assert_eq!(shown.details["origin"], "config");
        assert_eq!(shown.details["url"], "https://mirrors.example.org");
        Ok(())
    }

    #[test]
    fn override_wins_in_show() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let global = global();
        let cfg = config(temp.path(), &[("UV_MIRROR", "https://env.example")])?;
        cfg.layout().ensure()?;
        fs::write(
            cfg.layout().config_path(),
            "[mirror]\nurl = \"https://saved.example\"\nname = \"saved\"\npriority = 1\n",
        )?;
        let ctx = CommandContext::with_parts(&global, cfg, shared(FakeEffects::default()));
        let shown = mirror_show(&ctx, MirrorShowRequest)?;
        assert_eq!(shown.details["url"], "https://env.example");
        assert_eq!(shown.details["origin"], "UV_MIRROR");
        Ok(())
    }

    #[test]
    fn set_rejects_non_http_urls() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let global = global();
        let ctx = CommandContext::with_parts(
            &global,
            config(temp.path(), &[])?,
            shared(FakeEffects::default()),
        );
        for url in ["not a url", "ftp://mirror.example"] {
            let outcome = mirror_set(
                &ctx,
                MirrorSetRequest {
                    url: url.into(),
                    name: None,
                    priority: 0,
                },
            )?;
            assert_eq!(outcome.status, CommandStatus::UserError, "{url}");
        }
        assert!(!ctx.layout().config_path().exists());
        Ok(())
    }

    #[test]
    fn probe_reports_first_live_candidate() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let global = global();
        let effects = shared(FakeEffects {
            live_probes: vec!["https://mirrors.aliyun.com".into()],
            ..FakeEffects::default()
        });
        let ctx = CommandContext::with_parts(&global, config(temp.path(), &[])?, effects);
        let outcome = mirror_probe(&ctx, MirrorProbeRequest)?;
        assert_eq!(outcome.details["mirror"]["name"], "aliyun");

        let dead = CommandContext::with_parts(
            &global,
            config(temp.path(), &[])?,
            shared(FakeEffects::default()),
        );
        let err = mirror_probe(&dead, MirrorProbeRequest).expect_err("all dead");
        assert!(matches!(
            err.downcast_ref::<UdaError>(),
            Some(UdaError::NoWorkingMirror)
        ));
        Ok(())
    }
}
