use std::fmt::Write as _;

use uda_domain::EnvName;

use super::{quote, ShellDialect};
use crate::core::envs::EnvironmentStore;
use crate::core::errors::UdaError;

// Drops every `:$_UDA_ACTIVE_PATH:` segment from PATH by exact match.
const SH_REMOVE_ACTIVE: &str = r#"    _uda_path=":$PATH:"
    while case "$_uda_path" in *:"$_UDA_ACTIVE_PATH":*) true ;; *) false ;; esac; do
        _uda_path=${_uda_path%%:"$_UDA_ACTIVE_PATH":*}:${_uda_path#*:"$_UDA_ACTIVE_PATH":}
    done
    _uda_path=${_uda_path#:}
    PATH=${_uda_path%:}
    unset _uda_path
"#;

const FISH_REMOVE_ACTIVE: &str = r"    while set -l _uda_i (contains -i -- $_UDA_ACTIVE_PATH $PATH)
        set -e PATH[$_uda_i]
    end
";

/// Script that switches the calling shell to `name`.
///
/// Fails with [`UdaError::EnvNotFound`] before producing any text when the
/// environment is missing.
pub fn activate_script(
    store: &EnvironmentStore<'_>,
    name: &EnvName,
    dialect: ShellDialect,
) -> Result<String, UdaError> {
    if !store.exists(name) {
        return Err(UdaError::EnvNotFound(name.to_string()));
    }
    let layout = store.layout();
    let env_dir = layout.env_dir(name).display().to_string();
    let bin_dir = layout.env_bin_dir(name).display().to_string();
    let name_q = quote(dialect, name.as_str());
    let bin_q = quote(dialect, &bin_dir);
    let env_q = quote(dialect, &env_dir);

    let mut script = String::new();
    if dialect.is_fish() {
        let _ = writeln!(script, "set -gx _UDA_ACTIVE_ENV {name_q}");
        let _ = writeln!(script, "set -l _uda_new_path {bin_q}");
        script.push_str("if set -q _UDA_ACTIVE_PATH\n");
        script.push_str(FISH_REMOVE_ACTIVE);
        script.push_str("end\n");
        script.push_str("set -gx PATH $_uda_new_path $PATH\n");
        script.push_str("set -gx _UDA_ACTIVE_PATH $_uda_new_path\n");
        let _ = writeln!(script, "set -gx VIRTUAL_ENV {env_q}");
    } else {
        let _ = writeln!(script, "_UDA_ACTIVE_ENV={name_q}");
        let _ = writeln!(script, "_uda_new_path={bin_q}");
        script.push_str("if [ -n \"${_UDA_ACTIVE_PATH-}\" ]; then\n");
        script.push_str(SH_REMOVE_ACTIVE);
        script.push_str("fi\n");
        script.push_str("PATH=\"$_uda_new_path${PATH:+:$PATH}\"\n");
        script.push_str("_UDA_ACTIVE_PATH=\"$_uda_new_path\"\n");
        let _ = writeln!(script, "VIRTUAL_ENV={env_q}");
        script.push_str("export _UDA_ACTIVE_ENV _UDA_ACTIVE_PATH VIRTUAL_ENV PATH\n");
        script.push_str("unset _uda_new_path\n");
        script.push_str("if [ -z \"${_UDA_BASE_PS1+x}\" ]; then\n    _UDA_BASE_PS1=\"${PS1-}\"\nfi\n");
        script.push_str("PS1=\"($_UDA_ACTIVE_ENV) ${_UDA_BASE_PS1}\"\n");
        script.push_str("hash -r 2>/dev/null || true\n");
    }
    Ok(script)
}

/// Script that returns the calling shell to the `base` state.
pub fn deactivate_script(dialect: ShellDialect) -> String {
    let mut script = String::new();
    if dialect.is_fish() {
        script.push_str("if set -q _UDA_ACTIVE_PATH\n");
        script.push_str(FISH_REMOVE_ACTIVE);
        script.push_str("    set -eg VIRTUAL_ENV\n");
        script.push_str("    set -eg _UDA_ACTIVE_PATH\n");
        script.push_str("end\n");
        script.push_str("set -gx _UDA_ACTIVE_ENV base\n");
    } else {
        script.push_str("if [ -n \"${_UDA_ACTIVE_PATH-}\" ]; then\n");
        script.push_str(SH_REMOVE_ACTIVE);
        script.push_str("    unset VIRTUAL_ENV\n");
        script.push_str("fi\n");
        script.push_str("unset _UDA_ACTIVE_PATH\n");
        script.push_str("_UDA_ACTIVE_ENV=base\n");
        script.push_str("export _UDA_ACTIVE_ENV PATH\n");
        script.push_str("if [ -n \"${_UDA_BASE_PS1+x}\" ]; then\n    PS1=\"$_UDA_BASE_PS1\"\nfi\n");
        script.push_str("hash -r 2>/dev/null || true\n");
    }
    script
}
