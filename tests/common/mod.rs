//! Common test utilities for end-to-end tests.

use std::io::Write;
use std::process::{Command, Output, Stdio};

/// Run the `bril-opt` binary with `args`, feeding `input` on stdin.
#[allow(dead_code)]
pub fn run_bril_opt(args: &[&str], input: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_bril-opt"))
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn bril-opt");

    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(input.as_bytes())
        .expect("Failed to write program to stdin");

    child.wait_with_output().expect("Failed to wait for bril-opt")
}

/// Optimize `input` in-process and return the rendered output.
#[allow(dead_code)]
pub fn optimize(input: &str, format: bril_opt::OutputFormat) -> String {
    bril_opt::run(input.as_bytes(), format)
        .expect("Failed to optimize program")
        .rendered
}
