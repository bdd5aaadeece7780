//! Per-function optimization pipeline.
//!
//! `form_blocks → number_block (each) → flatten → DCE fixpoint`, run for each
//! function on its own. Nothing is carried from one function to the next.

use bril_ir::{Function, Program};

use crate::dce::{DceConfig, eliminate_dead_code_with_config};
use crate::lvn::{LvnStats, number_values};

/// Which passes the pipeline runs.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Run local value numbering. Default: true
    pub value_numbering: bool,
    /// Run dead code elimination with this configuration. Default: enabled.
    pub dead_code: Option<DceConfig>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            value_numbering: true,
            dead_code: Some(DceConfig::default()),
        }
    }
}

/// What the pipeline did to one function.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FunctionReport {
    pub name: String,
    pub instructions_before: usize,
    pub instructions_after: usize,
    pub lvn: LvnStats,
    /// Instructions removed by dead code elimination.
    pub removed: usize,
    /// DCE fixpoint iterations, 0 when DCE did not run.
    pub dce_iterations: usize,
}

/// Per-function reports for a whole program.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramReport {
    pub functions: Vec<FunctionReport>,
}

impl ProgramReport {
    pub fn total_removed(&self) -> usize {
        self.functions.iter().map(|f| f.removed).sum()
    }

    pub fn total_copies(&self) -> usize {
        self.functions.iter().map(|f| f.lvn.copies).sum()
    }
}

/// Optimize a single function.
#[tracing::instrument(skip_all, fields(function = %function.name))]
pub fn optimize_function(function: &Function, config: &PipelineConfig) -> (Function, FunctionReport) {
    let mut report = FunctionReport {
        name: function.name.clone(),
        instructions_before: function.instruction_count(),
        ..FunctionReport::default()
    };

    let mut optimized = if config.value_numbering {
        let (numbered, stats) = number_values(function);
        report.lvn = stats;
        numbered
    } else {
        function.clone()
    };

    if let Some(dce) = &config.dead_code {
        let result = eliminate_dead_code_with_config(&mut optimized, dce);
        if !result.reached_fixpoint {
            tracing::warn!(
                iterations = result.iterations,
                "dead code elimination stopped before reaching a fixpoint"
            );
        }
        report.removed = result.removed_count;
        report.dce_iterations = result.iterations;
    }

    report.instructions_after = optimized.instruction_count();
    tracing::debug!(
        before = report.instructions_before,
        after = report.instructions_after,
        copies = report.lvn.copies,
        renamed = report.lvn.renamed,
        removed = report.removed,
        "optimized function"
    );

    (optimized, report)
}

/// Optimize every function of a program independently.
pub fn optimize_program(program: &Program, config: &PipelineConfig) -> (Program, ProgramReport) {
    let (functions, reports): (Vec<_>, Vec<_>) = program
        .functions
        .iter()
        .map(|function| optimize_function(function, config))
        .unzip();

    (Program { functions }, ProgramReport { functions: reports })
}
