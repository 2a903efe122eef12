//! Stackwright CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use stackwright::cli::{Cli, CommandDispatcher};
use stackwright::config;
use stackwright::ui::{create_ui, OutputMode};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for logging.
///
/// Log level is controlled by:
/// 1. `--debug` flag sets level to DEBUG
/// 2. `-v`/`-vv` or the configured `verbosity` (the higher wins)
/// 3. `RUST_LOG` environment variable (if set)
/// 4. Default is INFO
fn init_tracing(debug: bool, verbosity: u8) {
    let filter = match (debug, verbosity) {
        (true, _) | (false, 1) => EnvFilter::new("stackwright=debug"),
        (false, 0) => {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("stackwright=info"))
        }
        _ => EnvFilter::new("stackwright=trace"),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let cwd = std::env::current_dir().unwrap_or_default();
    let configuration = match config::discover(&cwd) {
        Ok(configuration) => {
            configuration.with_cli_paths(&cli.component_paths, &cli.environment_paths)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(1);
        }
    };

    init_tracing(cli.debug, cli.verbose.max(configuration.verbosity));
    tracing::debug!("Stackwright starting with args: {:?}", cli);

    let output_mode = if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    };
    let mut ui = create_ui(output_mode);

    let dispatcher = CommandDispatcher::new(configuration);

    match dispatcher.dispatch(&cli, ui.as_mut()) {
        Ok(result) => ExitCode::from(result.exit_code as u8),
        Err(e) => {
            ui.error(&format!("Error: {}", e));
            ExitCode::from(1)
        }
    }
}
