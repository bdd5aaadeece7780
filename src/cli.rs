//! Command-line interface for the Bril optimizer.

use bril_opt::OutputFormat;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "bril-opt")]
#[command(
    about = "Optimize a Bril program read from stdin with local value numbering and dead code elimination",
    long_about = None
)]
pub struct Cli {
    /// Output format written to stdout
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub output: OutputFormat,
}
