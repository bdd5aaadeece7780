//! Intra-procedural optimization passes for Bril.
//!
//! ## Pipeline
//!
//! ```text
//! Function
//!     │
//!     ▼
//! form_blocks ─► Vec<BasicBlock>
//!     │
//!     ▼
//! ValueNumberer::number_block (per block) ─► Vec<BasicBlock>
//!     │
//!     ▼
//! flatten ─► Function
//!     │
//!     ▼
//! eliminate_dead_code (fixpoint) ─► Function
//! ```
//!
//! Every function is optimized independently; nothing is shared between them.

pub mod blocks;
pub mod dce;
pub mod lvn;
pub mod pipeline;

pub use blocks::{BasicBlock, flatten, form_blocks};
pub use dce::{DceConfig, DceResult, eliminate_dead_code, eliminate_dead_code_with_config};
pub use lvn::{LvnStats, ValueNumberer, number_values};
pub use pipeline::{FunctionReport, PipelineConfig, ProgramReport, optimize_function, optimize_program};

#[cfg(test)]
pub(crate) mod test_util;
