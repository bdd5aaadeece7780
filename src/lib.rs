//! Local value numbering and trivial dead code elimination for Bril.
//!
//! The heavy lifting lives in [`bril_passes`]; this crate wires decoding,
//! optimization and rendering together for the command-line tool.

pub mod pipeline;

pub use pipeline::{OutputFormat, RunOutput, render, run};
