//! Taskline CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use taskline::cli::{Cli, RunCommand};
use taskline::ui::{should_use_colors, LogRouter};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for logging.
///
/// Log level is controlled by:
/// 1. `--debug` flag sets level to DEBUG
/// 2. `RUST_LOG` environment variable (if set)
/// 3. Default is INFO
///
/// Output goes through `router`, so the renderer can draw it below the tree.
fn init_tracing(debug: bool, router: LogRouter) {
    let filter = if debug {
        EnvFilter::new("taskline=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("taskline=info"))
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(router)
                .with_target(false)
                .without_time()
                .with_ansi(should_use_colors()),
        )
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let router = LogRouter::new();
    init_tracing(cli.debug, router.clone());

    tracing::debug!("taskline starting with args: {:?}", cli);

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(1);
        }
    };

    let command = RunCommand::new(&cli);
    match runtime.block_on(command.execute(router)) {
        Ok(result) => ExitCode::from(result.exit_code.clamp(0, 255) as u8),
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::from(1)
        }
    }
}
