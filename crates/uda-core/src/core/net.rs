use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;

use crate::core::config::EnvSnapshot;

pub(crate) const KEEP_PROXIES_ENV: &str = "UDA_KEEP_PROXIES";
pub(crate) const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60);

/// Decide whether uda should honor standard proxy environment variables.
///
/// Behavior:
/// - `UDA_KEEP_PROXIES=1/true/yes/on` forces proxies on.
/// - `UDA_KEEP_PROXIES=0/false/no/off/""` forces proxies off.
/// - If unset, proxies are enabled only when at least one proxy env var is set.
pub(crate) fn keep_proxies(env: &EnvSnapshot) -> bool {
    match env.var(KEEP_PROXIES_ENV) {
        Some(raw) => {
            let value = raw.trim().to_ascii_lowercase();
            !matches!(value.as_str(), "" | "0" | "false" | "no" | "off")
        }
        None => {
            const PROXY_KEYS: &[&str] = &[
                "HTTP_PROXY",
                "http_proxy",
                "HTTPS_PROXY",
                "https_proxy",
                "ALL_PROXY",
                "all_proxy",
                "NO_PROXY",
                "no_proxy",
            ];
            PROXY_KEYS
                .iter()
                .any(|key| env.var(key).is_some_and(|value| !value.trim().is_empty()))
        }
    }
}

pub(crate) fn build_http_client(keep_proxies: bool, timeout: Duration) -> Result<Client> {
    let mut builder = Client::builder()
        .user_agent(format!("uda/{}", env!("CARGO_PKG_VERSION")))
        .timeout(timeout);
    if !keep_proxies {
        builder = builder.no_proxy();
    }
    builder.build().context("failed to build HTTP client")
}
