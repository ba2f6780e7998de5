use std::path::Path;

use super::{fish_quote, sh_quote, ShellDialect};

/// Wrapper function and prompt bootstrap sourced once per shell session.
///
/// `binary` is embedded verbatim so the wrapper keeps working when `uda`
/// is not on `PATH`.
pub fn init_script(dialect: ShellDialect, binary: &Path) -> String {
    let binary = binary.display().to_string();
    match dialect {
        ShellDialect::Fish => fish_init(&binary),
        ShellDialect::Bash | ShellDialect::Zsh | ShellDialect::Posix => sh_init(dialect, &binary),
    }
}

fn sh_init(dialect: ShellDialect, binary: &str) -> String {
    let bin = sh_quote(binary);
    format!(
        r#"# uda shell integration ({dialect})
_UDA_BIN={bin}
_UDA_ACTIVE_ENV="${{_UDA_ACTIVE_ENV:-base}}"
export _UDA_ACTIVE_ENV
if [ -z "${{_UDA_BASE_PS1+x}}" ]; then
    _UDA_BASE_PS1="${{PS1-}}"
fi

uda() {{
    if [ "$#" -eq 0 ]; then
        "$_UDA_BIN"
        return
    fi
    case "$1" in
        activate|a|deactivate|d)
            _uda_cmd="$1"
            shift
            _uda_script="$("$_UDA_BIN" "$_uda_cmd" --shell {dialect} "$@")" || {{
                _uda_status=$?
                unset _uda_cmd _uda_script
                return "$_uda_status"
            }}
            eval "$_uda_script"
            unset _uda_cmd _uda_script
            ;;
        pip|pip3)
            if [ "${{2-}}" = "install" ]; then
                shift 2
                "$_UDA_BIN" install "$@"
            else
                command "$@"
            fi
            ;;
        *)
            "$_UDA_BIN" "$@"
            ;;
    esac
}}

alias conda=uda
"#
    )
}

fn fish_init(binary: &str) -> String {
    let bin = fish_quote(binary);
    format!(
        r#"# uda shell integration (fish)
set -gx _UDA_BIN {bin}
if not set -q _UDA_ACTIVE_ENV
    set -gx _UDA_ACTIVE_ENV base
end
if not functions -q _uda_base_fish_prompt; and functions -q fish_prompt
    functions -c fish_prompt _uda_base_fish_prompt
end

function fish_prompt
    if set -q _UDA_ACTIVE_ENV; and test "$_UDA_ACTIVE_ENV" != base
        printf '(%s) ' $_UDA_ACTIVE_ENV
    end
    if functions -q _uda_base_fish_prompt
        _uda_base_fish_prompt
    end
end

function uda
    if test (count $argv) -eq 0
        $_UDA_BIN
        return
    end
    switch $argv[1]
        case activate a deactivate d
            $_UDA_BIN $argv[1] --shell fish $argv[2..-1] | source
            return $pipestatus[1]
        case pip pip3
            if test (count $argv) -ge 2; and test "$argv[2]" = install
                $_UDA_BIN install $argv[3..-1]
            else
                command $argv
            end
        case '*'
            $_UDA_BIN $argv
    end
end

alias conda uda
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn every_dialect_routes_wrapper_commands() {
        for dialect in ShellDialect::iter() {
            let script = init_script(dialect, Path::new("/opt/uda/bin/uda"));
            assert!(script.contains("/opt/uda/bin/uda"), "{dialect}");
            for needle in ["activate", "deactivate", "pip", "pip3", "install"] {
                assert!(script.contains(needle), "{dialect} missing {needle}");
            }
            if dialect == ShellDialect::Fish {
                assert!(script.contains("switch $argv[1]"));
                assert!(script.contains("alias conda uda"));
            } else {
                assert!(script.contains("case \"$1\" in"));
                assert!(script.contains("alias conda=uda"));
                assert!(script.contains(&format!("--shell {dialect}")));
            }
        }
    }

    #[test]
    fn binary_path_is_quoted() {
        let script = init_script(ShellDialect::Bash, Path::new("/Users/o'neil/bin/uda"));
        assert!(script.contains(r"_UDA_BIN='/Users/o'\''neil/bin/uda'"));
        let fish = init_script(ShellDialect::Fish, Path::new("/Users/o'neil/bin/uda"));
        assert!(fish.contains(r"set -gx _UDA_BIN '/Users/o\'neil/bin/uda'"));
    }

    #[cfg(unix)]
    mod sh {
        use super::*;
        use crate::core::runtime::process::run_command;
        use anyhow::Result;
        use std::ffi::OsString;
        use std::fs;

        /// A stand-in `uda` binary that records its arguments and, for
        /// `activate`, prints a tiny activation script.
        fn fake_binary(dir: &Path) -> Result<std::path::PathBuf> {
            use std::os::unix::fs::PermissionsExt;
            let path = dir.join("uda");
            let log = dir.join("calls.log");
            fs::write(
                &path,
                format!(
                    "#!/bin/sh\nprintf '%s\\n' \"$*\" >> '{}'\n\
                     case \"$1\" in\n\
                     activate|a) [ \"$4\" = ghost ] && {{ echo 'environment ghost does not exist' >&2; exit 1; }}\n\
                     printf '_UDA_ACTIVE_ENV=%s\\nexport _UDA_ACTIVE_ENV\\n' \"$4\" ;;\n\
                     deactivate|d) printf '_UDA_ACTIVE_ENV=base\\n' ;;\n\
                     esac\n",
                    log.display()
                ),
            )?;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
            Ok(path)
        }

        fn run(dir: &Path, body: &str) -> Result<(String, String)> {
            let binary = fake_binary(dir)?;
            let script = format!(
                "unset _UDA_ACTIVE_ENV _UDA_BASE_PS1\n{}{body}",
                init_script(ShellDialect::Posix, &binary)
            );
            let output = run_command(
                Path::new("/bin/sh"),
                &[OsString::from("-c"), OsString::from(script)],
                &[],
            )?;
            let log = fs::read_to_string(dir.join("calls.log")).unwrap_or_default();
            Ok((output.stdout, log))
        }

        #[test]
        fn wrapper_evaluates_activation_output() -> Result<()> {
            let temp = tempfile::tempdir()?;
            let (stdout, log) = run(
                temp.path(),
                "printf '%s\\n' \"$_UDA_ACTIVE_ENV\"\nuda activate ml\nprintf '%s\\n' \"$_UDA_ACTIVE_ENV\"\nuda d\nprintf '%s\\n' \"$_UDA_ACTIVE_ENV\"\n",
            )?;
            assert_eq!(stdout, "base\nml\nbase\n");
            assert_eq!(log, "activate --shell posix ml\nd --shell posix\n");
            Ok(())
        }

        #[test]
        fn failed_activation_returns_status_and_changes_nothing() -> Result<()> {
            let temp = tempfile::tempdir()?;
            let (stdout, _log) = run(
                temp.path(),
                "uda activate ghost\nprintf '%s %s\\n' \"$?\" \"$_UDA_ACTIVE_ENV\"\n",
            )?;
            assert_eq!(stdout, "1 base\n");
            Ok(())
        }

        #[test]
        fn pip_install_is_forwarded_once() -> Result<()> {
            let temp = tempfile::tempdir()?;
            let (_stdout, log) = run(
                temp.path(),
                "uda pip install numpy 'pandas>=2'\nuda pip3 install -r req.txt\nuda list\n",
            )?;
            assert_eq!(
                log,
                "install numpy pandas>=2\ninstall -r req.txt\nlist\n"
            );
            Ok(())
        }
    }
}
