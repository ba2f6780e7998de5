//! Text a cooperating shell evaluates: the `uda` wrapper function plus
//! activation and deactivation snippets.
//!
//! Session state lives only in the calling shell:
//! `_UDA_ACTIVE_ENV` (name, `base` when nothing is active),
//! `_UDA_ACTIVE_PATH` (the exact `PATH` entry we prepended) and
//! `_UDA_BASE_PS1` (the prompt before any activation, captured once).

mod init;
mod session;

use std::path::Path;

use strum::{Display, EnumIter};

pub use init::init_script;
pub use session::{activate_script, deactivate_script};

pub const ACTIVE_ENV_MARKER: &str = "_UDA_ACTIVE_ENV";
pub const ACTIVE_PATH_MARKER: &str = "_UDA_ACTIVE_PATH";
pub const BASE_PROMPT_MARKER: &str = "_UDA_BASE_PS1";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum ShellDialect {
    Bash,
    Zsh,
    Fish,
    Posix,
}

impl ShellDialect {
    /// Accepts a bare name or a path such as `/usr/bin/zsh`; anything
    /// unrecognized is treated as a POSIX shell.
    #[must_use]
    pub fn from_name(raw: &str) -> Self {
        let base = Path::new(raw.trim())
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default();
        let base = base.strip_suffix(".exe").unwrap_or(base);
        match base.to_ascii_lowercase().as_str() {
            "bash" => ShellDialect::Bash,
            "zsh" => ShellDialect::Zsh,
            "fish" => ShellDialect::Fish,
            _ => ShellDialect::Posix,
        }
    }

    /// Explicit choice first, then `$SHELL`, then bash.
    #[must_use]
    pub fn detect(explicit: Option<&str>, shell_env: Option<&str>) -> Self {
        match explicit.or(shell_env).map(str::trim).filter(|raw| !raw.is_empty()) {
            Some(raw) => Self::from_name(raw),
            None => ShellDialect::Bash,
        }
    }

    pub(crate) fn is_fish(self) -> bool {
        matches!(self, ShellDialect::Fish)
    }
}

/// Single-quotes `raw` for sh-family shells.
pub(crate) fn sh_quote(raw: &str) -> String {
    format!("'{}'", raw.replace('\'', r"'\''"))
}

/// Single-quotes `raw` for fish, where `\` and `'` are the only escapes.
pub(crate) fn fish_quote(raw: &str) -> String {
    format!("'{}'", raw.replace('\\', r"\\").replace('\'', r"\'"))
}

pub(crate) fn quote(dialect: ShellDialect, raw: &str) -> String {
    if dialect.is_fish() {
        fish_quote(raw)
    } else {
        sh_quote(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dialect_from_names_and_paths() {
        assert_eq!(ShellDialect::from_name("bash"), ShellDialect::Bash);
        assert_eq!(ShellDialect::from_name("/usr/bin/zsh"), ShellDialect::Zsh);
        assert_eq!(ShellDialect::from_name("/opt/homebrew/bin/fish"), ShellDialect::Fish);
        assert_eq!(ShellDialect::from_name("dash"), ShellDialect::Posix);
        assert_eq!(ShellDialect::from_name("tcsh"), ShellDialect::Posix);
    }

    #[test]
    fn detect_prefers_explicit_then_env_then_bash() {
        assert_eq!(
            ShellDialect::detect(Some("fish"), Some("/bin/zsh")),
            ShellDialect::Fish
        );
        assert_eq!(ShellDialect::detect(None, Some("/bin/zsh")), ShellDialect::Zsh);
        assert_eq!(ShellDialect::detect(None, None), ShellDialect::Bash);
        assert_eq!(ShellDialect::detect(None, Some("")), ShellDialect::Bash);
    }

    #[test]
    fn quoting_survives_awkward_paths() {
        assert_eq!(sh_quote("/opt/it's here"), r"'/opt/it'\''s here'");
        assert_eq!(fish_quote(r"C:\it's"), r"'C:\\it\'s'");
    }

    #[test]
    fn dialect_display_matches_flag_values() {
        assert_eq!(ShellDialect::Posix.to_string(), "posix");
        assert_eq!(ShellDialect::Zsh.to_string(), "zsh");
    }
}
