use clap::Parser;
use color_eyre::Result;
use tracing_subscriber::EnvFilter;
use uda_core::{CommandContext, GlobalOptions};

mod cli;
mod dispatch;
mod output;
mod style;

use cli::UdaCli;
use output::{emit_output, OutputOptions};

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = UdaCli::parse();
    init_tracing(cli.trace, cli.verbose, cli.quiet);

    let global = GlobalOptions {
        quiet: cli.quiet,
        verbose: cli.verbose,
        trace: cli.trace,
        json: cli.json,
        no_color: cli.no_color,
    };
    let opts = OutputOptions {
        quiet: cli.quiet,
        json: cli.json,
        no_color: cli.no_color,
    };

    let info = dispatch::command_info(&cli.command);
    let outcome = match prepare_context(&global) {
        Ok(ctx) => dispatch::dispatch_command(&ctx, &cli.command)?.1,
        Err(err) => dispatch::outcome_from_error(info, &err),
    };
    let code = emit_output(&opts, info, &outcome)?;

    if code == 0 {
        Ok(())
    } else {
        std::process::exit(code);
    }
}

/// Resolves the home and makes sure its directories exist.
fn prepare_context(global: &GlobalOptions) -> anyhow::Result<CommandContext<'_>> {
    let ctx = CommandContext::new(global)?;
    ctx.layout().ensure()?;
    tracing::debug!(home = %ctx.layout().root().display(), "uda home ready");
    Ok(ctx)
}

fn init_tracing(trace: bool, verbose: u8, quiet: bool) {
    let level = if trace {
        "trace"
    } else if quiet {
        "error"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = EnvFilter::new(format!("uda={level},uda_core={level},uda_domain={level}"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
