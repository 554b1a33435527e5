//! deltaboot - self-updating launcher
//!
//! Installs the configured artifact on first run, keeps it patched to the
//! latest stable build and runs it.

mod cli;
mod commands;
mod output;
mod prompt;
mod render;

use clap::Parser;
use std::future::Future;
use std::process::ExitCode;
use tokio::runtime::{Builder, Runtime};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::Cli;

fn main() -> ExitCode {
    // Initialize rustls crypto provider (required for rustls 0.23+)
    // This must be done before any TLS operations
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    let runtime = match Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            output::error(&format!("Failed to start the async runtime: {}", e));
            return ExitCode::FAILURE;
        }
    };

    run_to_completion(runtime, commands::run(cli))
}

/// Drive `command` to completion, then shut down without waiting
///
/// An update prompt still waiting on a blocking thread cannot be cancelled;
/// it must not keep the launcher alive once the command is done.
fn run_to_completion<F>(runtime: Runtime, command: F) -> ExitCode
where
    F: Future<Output = ExitCode>,
{
    let code = runtime.block_on(command);
    runtime.shutdown_background();
    code
}

/// Initialize tracing with appropriate verbosity
fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
