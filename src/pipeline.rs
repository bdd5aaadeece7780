//! Driver pipeline for the `bril-opt` binary.
//!
//! ```text
//! stdin (Bril JSON)
//!     │
//!     ▼
//! read_program ─► Program
//!     │
//!     ▼
//! optimize_program ─► Program + ProgramReport
//!     │
//!     ▼
//! render ─► JSON or text
//! ```
//!
//! Decoding happens before any function is touched, so a decode error never
//! produces partial output.

use std::io::Read;

use bril_ir::printer::print_program;
use bril_ir::{CodecResult, Program, encode_program, read_program};
use bril_passes::{PipelineConfig, ProgramReport, optimize_program};

/// Output encoding selected on the command line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Bril JSON, the same wire format as the input.
    #[default]
    Json,
    /// Human-readable Bril text.
    Text,
}

/// Rendered output of one run together with what the optimizer did.
#[derive(Debug)]
pub struct RunOutput {
    pub rendered: String,
    pub report: ProgramReport,
}

/// Decode a program from `input`, optimize it and render it in `format`.
pub fn run(input: impl Read, format: OutputFormat) -> CodecResult<RunOutput> {
    let program = read_program(input)?;
    let (optimized, report) = optimize_program(&program, &PipelineConfig::default());
    let rendered = render(&optimized, format)?;
    Ok(RunOutput { rendered, report })
}

/// Render a program. Both formats end with a newline.
pub fn render(program: &Program, format: OutputFormat) -> CodecResult<String> {
    match format {
        OutputFormat::Json => {
            let mut json = encode_program(program)?;
            json.push('\n');
            Ok(json)
        }
        OutputFormat::Text => Ok(print_program(program)),
    }
}
