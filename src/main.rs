//! Bril optimizer CLI entry point.

mod cli;

use std::io::{self, Write};

use bril_opt::run;
use clap::Parser;
use cli::Cli;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let output = match run(io::stdin().lock(), cli.output) {
        Ok(output) => output,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(
        functions = output.report.functions.len(),
        copies = output.report.total_copies(),
        removed = output.report.total_removed(),
        "optimized program"
    );

    let mut stdout = io::stdout().lock();
    if let Err(e) = stdout
        .write_all(output.rendered.as_bytes())
        .and_then(|()| stdout.flush())
    {
        eprintln!("error: failed to write output: {e}");
        std::process::exit(1);
    }
}

/// Log to stderr so stdout carries only the program. `RUST_LOG` overrides the
/// default `warn` level.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}
