use std::ffi::OsString;
use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

pub const UDA_HELP_TEMPLATE: &str =
    "{before-help}\nUsage:\n    {usage}\n\nGlobal options:\n{options}\n";

pub const UDA_BEFORE_HELP: &str = concat!(
    "uda ",
    env!("CARGO_PKG_VERSION"),
    " – Conda-style named environments on top of uv\n\n",
    "\x1b[1;36mEnvironments\x1b[0m\n",
    "  create (c)       Create a named environment, optionally pinning Python.\n",
    "  list (ls)        List environments.\n",
    "  remove (rm)      Delete an environment.\n\n",
    "\x1b[1;36mShell\x1b[0m\n",
    "  init             Print the shell hook; add `eval \"$(uda init)\"` to your rc file.\n",
    "  activate (a)     Switch the current shell to an environment.\n",
    "  deactivate (d)   Return the current shell to base.\n\n",
    "\x1b[1;36mPackages\x1b[0m\n",
    "  install (add, i) Install packages into the active or named environment.\n",
    "  run              Run a command with an environment's interpreter.\n\n",
    "\x1b[1;36muv\x1b[0m\n",
    "  self install     Download uv into the uda home.\n",
    "  mirror           Show, pin or probe the uv download mirror.\n",
);

#[derive(Parser, Debug)]
#[command(
    name = "uda",
    author,
    version,
    propagate_version = false,
    disable_help_subcommand = true,
    before_help = UDA_BEFORE_HELP,
    help_template = UDA_HELP_TEMPLATE
)]
#[allow(clippy::struct_excessive_bools)]
pub struct UdaCli {
    #[arg(
        short,
        long,
        help = "Suppress human output (errors still print to stderr)",
        global = true
    )]
    pub quiet: bool,
    #[arg(
        short,
        long,
        action = ArgAction::Count,
        help = "Increase logging (-vv reaches trace)",
        global = true
    )]
    pub verbose: u8,
    #[arg(long, help = "Force trace logging regardless of -v/-q", global = true)]
    pub trace: bool,
    #[arg(
        long,
        help = "Emit {status,message,details} JSON envelopes",
        global = true
    )]
    pub json: bool,
    #[arg(long, help = "Disable colored human output", global = true)]
    pub no_color: bool,
    #[command(subcommand)]
    pub command: CommandGroupCli,
}

#[derive(Subcommand, Debug)]
pub enum CommandGroupCli {
    #[command(
        visible_alias = "c",
        about = "Create a named environment.",
        override_usage = "uda create <NAME> [--python VERSION]"
    )]
    Create(CreateArgs),
    #[command(visible_alias = "ls", about = "List environments.")]
    List,
    #[command(
        visible_alias = "rm",
        about = "Delete an environment.",
        override_usage = "uda remove <NAME>"
    )]
    Remove(RemoveArgs),
    #[command(
        visible_alias = "a",
        about = "Print the script that activates an environment (eval'd by the shell hook).",
        override_usage = "uda activate <NAME>"
    )]
    Activate(ActivateArgs),
    #[command(
        visible_alias = "d",
        about = "Print the script that returns the shell to base."
    )]
    Deactivate(ShellArgs),
    #[command(
        about = "Print the shell integration for bash, zsh, fish or sh.",
        override_usage = "uda init [--shell SHELL | SHELL]"
    )]
    Init(InitArgs),
    #[command(
        visible_aliases = ["add", "i"],
        about = "Install packages with `uv pip install` into an environment.",
        override_usage = "uda install [--env NAME] [-r FILE] [PACKAGE...]"
    )]
    Install(InstallArgs),
    #[command(
        about = "Run a command with an environment's interpreter via `uv run`.",
        override_usage = "uda run [--env NAME] [COMMAND [ARG...]]"
    )]
    Run(RunArgs),
    #[command(name = "self", about = "Manage the uv binary uda drives.", subcommand)]
    SelfCmd(SelfCommand),
    #[command(about = "Show, pin or probe the uv download mirror.", subcommand)]
    Mirror(MirrorCommand),
}

#[derive(Subcommand, Debug)]
pub enum SelfCommand {
    #[command(about = "Download or update uv, preferring a reachable mirror.")]
    Install,
}

#[derive(Subcommand, Debug)]
pub enum MirrorCommand {
    #[command(about = "Show the mirror `self install` starts from.")]
    Show,
    #[command(about = "Pin a mirror in config.toml.")]
    Set(MirrorSetArgs),
    #[command(about = "Probe the built-in mirrors and report the first reachable one.")]
    Probe,
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    #[arg(value_name = "NAME")]
    pub name: String,
    #[arg(long, value_name = "VERSION", help = "Python version to install (e.g. 3.12)")]
    pub python: Option<String>,
}

#[derive(Args, Debug)]
pub struct RemoveArgs {
    #[arg(value_name = "NAME")]
    pub name: String,
}

#[derive(Args, Debug, Default)]
pub struct ShellArgs {
    #[arg(
        long,
        value_name = "SHELL",
        help = "Dialect of the emitted script (default: $SHELL)"
    )]
    pub shell: Option<String>,
}

#[derive(Args, Debug)]
pub struct ActivateArgs {
    #[arg(value_name = "NAME")]
    pub name: String,
    #[command(flatten)]
    pub shell: ShellArgs,
}

#[derive(Args, Debug)]
pub struct InitArgs {
    #[arg(value_name = "SHELL", conflicts_with = "shell")]
    pub dialect: Option<String>,
    #[arg(long, value_name = "SHELL", help = "bash, zsh, fish or sh (default: $SHELL)")]
    pub shell: Option<String>,
}

#[derive(Args, Debug)]
pub struct InstallArgs {
    #[arg(long, value_name = "NAME", help = "Target environment (default: the active one)")]
    pub env: Option<String>,
    #[arg(short = 'r', long, value_name = "FILE", help = "Install from a requirements file")]
    pub requirements: Option<PathBuf>,
    #[arg(
        value_name = "PACKAGE",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub packages: Vec<String>,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    #[arg(long, value_name = "NAME", help = "Target environment (default: the active one)")]
    pub env: Option<String>,
    #[arg(
        value_name = "COMMAND",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub command: Vec<OsString>,
}

#[derive(Args, Debug)]
pub struct MirrorSetArgs {
    #[arg(value_name = "URL")]
    pub url: String,
    #[arg(long, value_name = "NAME", help = "Label stored with the mirror (default: host)")]
    pub name: Option<String>,
    #[arg(long, value_name = "N", default_value_t = 0)]
    pub priority: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        UdaCli::command().debug_assert();
    }

    #[test]
    fn aliases_and_wrapper_invocations_parse() {
        let cli = UdaCli::parse_from(["uda", "a", "--shell", "posix", "ml"]);
        match cli.command {
            CommandGroupCli::Activate(args) => {
                assert_eq!(args.name, "ml");
                assert_eq!(args.shell.shell.as_deref(), Some("posix"));
            }
            other => panic!("unexpected {other:?}"),
        }

        let cli = UdaCli::parse_from(["uda", "add", "--env", "ml", "numpy", "pandas>=2"]);
        match cli.command {
            CommandGroupCli::Install(args) => {
                assert_eq!(args.env.as_deref(), Some("ml"));
                assert_eq!(args.packages, vec!["numpy", "pandas>=2"]);
            }
            other => panic!("unexpected {other:?}"),
        }

        let cli = UdaCli::parse_from(["uda", "run", "python", "-c", "print(1)"]);
        match cli.command {
            CommandGroupCli::Run(args) => assert_eq!(args.command.len(), 3),
            other => panic!("unexpected {other:?}"),
        }

        let cli = UdaCli::parse_from(["uda", "init", "zsh"]);
        assert!(matches!(
            cli.command,
            CommandGroupCli::Init(InitArgs { dialect: Some(ref d), .. }) if d == "zsh"
        ));
    }
}
