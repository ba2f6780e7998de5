use atty::Stream;
use color_eyre::Result;
use serde_json::Value;
use uda_core::{CommandGroup, CommandInfo, CommandStatus, ExecutionOutcome};

use crate::style::Style;

#[derive(Clone, Copy, Debug)]
pub struct OutputOptions {
    pub quiet: bool,
    pub json: bool,
    pub no_color: bool,
}

/// Prints `outcome` and returns the process exit code.
///
/// Script and listing text goes to stdout untouched; failures only ever
/// reach stderr so an `eval "$(uda activate x)"` never runs error text.
pub fn emit_output(
    opts: &OutputOptions,
    info: CommandInfo,
    outcome: &ExecutionOutcome,
) -> Result<i32> {
    let mut code = outcome.status.exit_code();
    if info.group == CommandGroup::Run {
        if let Some(exit_code) = outcome
            .details
            .as_object()
            .and_then(|map| map.get("code"))
            .and_then(Value::as_i64)
        {
            code = i32::try_from(exit_code).unwrap_or(code);
        }
    }

    let script = emits_script(info.group);
    let ok = matches!(outcome.status, CommandStatus::Ok);

    if opts.json {
        let payload = uda_core::to_json_response(info, outcome);
        let rendered = serde_json::to_string_pretty(&payload)?;
        if script {
            // stdout of these commands is eval'd by the shell hook
            if ok && outcome.is_passthrough() {
                print_raw(&outcome.message);
            }
            eprintln!("{rendered}");
        } else {
            println!("{rendered}");
        }
        return Ok(code);
    }

    if ok {
        if script && outcome.is_passthrough() {
            print_raw(&outcome.message);
            return Ok(code);
        }
        if opts.quiet || is_quiet(&outcome.details) {
            return Ok(code);
        }
        let style = Style::new(opts.no_color, atty::is(Stream::Stdout));
        if outcome.is_passthrough() {
            print_raw(&outcome.message);
        } else {
            let message = uda_core::format_status_message(info, &outcome.message);
            println!("{}", style.status(&outcome.status, &message));
            if let Some(hint) = hint_from_details(&outcome.details) {
                println!("{}", style.info(&format!("Tip: {hint}")));
            }
        }
    } else {
        let style = Style::new(opts.no_color, atty::is(Stream::Stderr));
        let message = uda_core::format_status_message(info, &outcome.message);
        eprintln!("{}", style.status(&outcome.status, &message));
        if !opts.quiet {
            if let Some(hint) = hint_from_details(&outcome.details) {
                eprintln!("{}", style.info(&format!("Hint: {hint}")));
            }
        }
    }

    Ok(code)
}

/// Commands whose stdout is shell code; it is printed whatever `-q`/`--json` say.
fn emits_script(group: CommandGroup) -> bool {
    matches!(
        group,
        CommandGroup::Activate | CommandGroup::Deactivate | CommandGroup::Init
    )
}

fn print_raw(text: &str) {
    if text.ends_with('\n') {
        print!("{text}");
    } else {
        println!("{text}");
    }
}

fn hint_from_details(details: &Value) -> Option<&str> {
    details
        .as_object()
        .and_then(|map| map.get("hint"))
        .and_then(Value::as_str)
}

fn is_quiet(details: &Value) -> bool {
    details
        .as_object()
        .and_then(|map| map.get("quiet"))
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn hint_and_quiet_flags_are_read_from_details() {
        let details = json!({ "hint": "uda activate ml", "quiet": true });
        assert_eq!(hint_from_details(&details), Some("uda activate ml"));
        assert!(is_quiet(&details));
        assert!(!is_quiet(&json!("plain")));
    }

    #[test]
    fn only_shell_commands_emit_scripts() {
        for group in [CommandGroup::Activate, CommandGroup::Deactivate, CommandGroup::Init] {
            assert!(emits_script(group), "{group}");
        }
        for group in [CommandGroup::List, CommandGroup::Run, CommandGroup::Mirror] {
            assert!(!emits_script(group), "{group}");
        }
    }

    #[test]
    fn run_exit_code_comes_from_details() -> Result<()> {
        let opts = OutputOptions {
            quiet: true,
            json: false,
            no_color: true,
        };
        let run = CommandInfo::new(CommandGroup::Run, "run");
        let failed = ExecutionOutcome::failure("command exited with status 7", json!({ "code": 7 }));
        assert_eq!(emit_output(&opts, run, &failed)?, 7);

        let create = CommandInfo::new(CommandGroup::Create, "create");
        let with_code = ExecutionOutcome::failure("uv venv failed", json!({ "code": 7 }));
        assert_eq!(emit_output(&opts, create, &with_code)?, 2);
        Ok(())
    }
}
