//! Trivial dead code elimination (DCE).
//!
//! Two rules run alternately until neither removes anything:
//!
//! - [`drop_unused`]: an instruction whose destination is never read anywhere
//!   in the function is removed. Removing it may leave its own operands unread,
//!   so the rule cascades across iterations.
//! - [`drop_reassignments`]: within one block, a definition that is overwritten
//!   before anything reads it is removed.
//!
//! Instructions with side effects (`call`) are never removed, whatever happens
//! to their result.

use std::collections::{HashMap, HashSet};

use bril_ir::{Function, Node};

use crate::blocks::{BasicBlock, flatten, form_blocks};

/// Configuration for dead code elimination.
#[derive(Debug, Clone)]
pub struct DceConfig {
    /// Maximum fixpoint iterations before giving up.
    /// Default: `None` (run until fixpoint; always terminates).
    pub max_iterations: Option<usize>,
    /// Whether to run the per-block dead reassignment rule.
    /// Default: true
    pub drop_reassignments: bool,
}

impl Default for DceConfig {
    fn default() -> Self {
        Self {
            max_iterations: None,
            drop_reassignments: true,
        }
    }
}

/// Result of running dead code elimination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DceResult {
    /// Total number of instructions removed.
    pub removed_count: usize,
    /// Number of fixpoint iterations performed, including the final one that
    /// confirmed no change.
    pub iterations: usize,
    /// Whether fixpoint was reached (no more changes possible).
    pub reached_fixpoint: bool,
}

/// Eliminate dead code from a function using default configuration.
pub fn eliminate_dead_code(function: &mut Function) -> DceResult {
    eliminate_dead_code_with_config(function, &DceConfig::default())
}

/// Eliminate dead code with custom configuration.
pub fn eliminate_dead_code_with_config(function: &mut Function, config: &DceConfig) -> DceResult {
    let mut removed_count = 0;
    let mut iterations = 0;

    loop {
        if config.max_iterations.is_some_and(|max| iterations >= max) {
            return DceResult {
                removed_count,
                iterations,
                reached_fixpoint: false,
            };
        }
        iterations += 1;

        let mut removed = 0;
        if config.drop_reassignments {
            removed += drop_reassignments(function);
        }
        removed += drop_unused(function);

        tracing::trace!(function = %function.name, iteration = iterations, removed, "dce sweep");

        if removed == 0 {
            return DceResult {
                removed_count,
                iterations,
                reached_fixpoint: true,
            };
        }
        removed_count += removed;
    }
}

/// Remove instructions whose destination is not read anywhere in the function.
/// Returns the number of instructions removed.
pub fn drop_unused(function: &mut Function) -> usize {
    let used: HashSet<String> = function
        .instructions()
        .flat_map(|instr| instr.args.iter().cloned())
        .collect();

    let before = function.instrs.len();
    function.instrs.retain(|node| match node {
        Node::Label(_) => true,
        Node::Instruction(instr) => match &instr.dest {
            Some(dest) => used.contains(dest) || !instr.effect_kind().is_removable(),
            None => true,
        },
    });
    before - function.instrs.len()
}

/// Remove definitions that are overwritten in the same block before being read.
/// Returns the number of instructions removed.
pub fn drop_reassignments(function: &mut Function) -> usize {
    let blocks = form_blocks(std::mem::take(&mut function.instrs));
    let mut removed = 0;

    let blocks: Vec<BasicBlock> = blocks
        .into_iter()
        .map(|block| {
            let dead = dead_reassignments(&block);
            if dead.is_empty() {
                return block;
            }
            removed += dead.len();
            let nodes = block
                .nodes
                .into_iter()
                .enumerate()
                .filter(|(index, _)| !dead.contains(index))
                .map(|(_, node)| node)
                .collect();
            BasicBlock::new(nodes)
        })
        .collect();

    function.instrs = flatten(blocks);
    removed
}

/// Indices of definitions in `block` that are overwritten while still unread.
fn dead_reassignments(block: &BasicBlock) -> HashSet<usize> {
    let mut unread: HashMap<&str, usize> = HashMap::new();
    let mut dead = HashSet::new();

    for (index, node) in block.nodes.iter().enumerate() {
        let Node::Instruction(instr) = node else {
            continue;
        };
        for arg in &instr.args {
            unread.remove(arg.as_str());
        }
        if let Some(dest) = &instr.dest
            && let Some(previous) = unread.insert(dest.as_str(), index)
            && block.nodes[previous]
                .as_instruction()
                .is_some_and(|prev| prev.effect_kind().is_removable())
        {
            dead.insert(previous);
        }
    }

    dead
}

#[cfg(test)]
mod tests {
    use bril_ir::{Instruction, Type};
    use insta::assert_snapshot;

    use super::*;
    use crate::test_util::*;

    #[test]
    fn removes_unused_value() {
        let mut f = function(vec![konst("y", 5), konst("x", 1), effect("print", ["x"])]);
        let result = eliminate_dead_code(&mut f);

        assert_eq!(result.removed_count, 1);
        assert!(result.reached_fixpoint);
        assert_snapshot!(f.to_string(), @r"
        @main {
          x: int = const 1;
          print x;
        }
        ");
    }

    #[test]
    fn removes_dead_reassignment() {
        let mut f = function(vec![konst("x", 1), konst("x", 2), effect("print", ["x"])]);
        let result = eliminate_dead_code(&mut f);

        assert_eq!(result.removed_count, 1);
        assert_snapshot!(f.to_string(), @r"
        @main {
          x: int = const 2;
          print x;
        }
        ");
    }

    #[test]
    fn read_between_definitions_keeps_both() {
        let mut f = function(vec![
            konst("x", 1),
            effect("print", ["x"]),
            konst("x", 2),
            effect("print", ["x"]),
        ]);
        let result = eliminate_dead_code(&mut f);

        assert_eq!(result.removed_count, 0);
        assert_eq!(result.iterations, 1);
    }

    #[test]
    fn self_read_counts_as_use() {
        let mut f = function(vec![
            konst("x", 1),
            value("x", "add", ["x", "x"]),
            effect("print", ["x"]),
        ]);
        assert_eq!(drop_reassignments(&mut f), 0);
    }

    #[test]
    fn cascade_removal() {
        let mut f = function(vec![konst("a", 1), value("b", "add", ["a", "a"]), ret_void()]);
        let result = eliminate_dead_code(&mut f);

        // b goes in the first sweep, a in the second, the third confirms.
        assert_eq!(result.removed_count, 2);
        assert_eq!(result.iterations, 3);
        assert!(result.reached_fixpoint);
        assert_eq!(f.instruction_count(), 1);
    }

    #[test]
    fn reassignment_is_block_local() {
        // The first write of x may be read at .next through a jump from elsewhere.
        let mut f = function(vec![
            konst("x", 1),
            label("next"),
            konst("x", 2),
            effect("print", ["x"]),
        ]);
        assert_eq!(drop_reassignments(&mut f), 0);
    }

    #[test]
    fn uses_in_other_blocks_keep_definitions() {
        let mut f = function(vec![
            konst("x", 1),
            jmp("later"),
            label("later"),
            effect("print", ["x"]),
        ]);
        let result = eliminate_dead_code(&mut f);
        assert_eq!(result.removed_count, 0);
    }

    #[test]
    fn keeps_calls_with_unused_results() {
        let mut f = function(vec![
            call("r", "side_effect", []),
            call("r", "side_effect", []),
            ret_void(),
        ]);
        let result = eliminate_dead_code(&mut f);

        assert_eq!(result.removed_count, 0);
        assert_eq!(f.instruction_count(), 3);
    }

    #[test]
    fn keeps_effects_and_labels() {
        let mut f = function(vec![
            label("entry"),
            effect("print", ["a"]),
            Instruction::new("nop").into(),
            ret_void(),
        ]);
        let before = f.clone();
        let result = eliminate_dead_code(&mut f);
        assert_eq!(result.removed_count, 0);
        assert_eq!(f, before);
    }

    #[test]
    fn max_iterations_stops_early() {
        let mut f = function(vec![konst("a", 1), value("b", "add", ["a", "a"]), ret_void()]);
        let config = DceConfig {
            max_iterations: Some(1),
            drop_reassignments: true,
        };
        let result = eliminate_dead_code_with_config(&mut f, &config);

        assert_eq!(result.removed_count, 1);
        assert_eq!(result.iterations, 1);
        assert!(!result.reached_fixpoint);
    }

    #[test]
    fn reassignment_rule_can_be_disabled() {
        let mut f = function(vec![konst("x", 1), konst("x", 2), effect("print", ["x"])]);
        let config = DceConfig {
            max_iterations: None,
            drop_reassignments: false,
        };
        let result = eliminate_dead_code_with_config(&mut f, &config);

        // Both writes are read "somewhere" as far as the global rule can tell.
        assert_eq!(result.removed_count, 0);
    }

    #[test]
    fn iterations_bounded_by_instruction_count() {
        // A chain where each sweep frees exactly one more instruction.
        let mut body = vec![konst("v0", 0)];
        for i in 1..8 {
            let prev = format!("v{}", i - 1);
            let dest = format!("v{i}");
            body.push(Instruction::value(dest, Type::int(), "add", [prev.clone(), prev]).into());
        }
        let mut f = function(body);
        let n = f.instruction_count();
        let result = eliminate_dead_code(&mut f);

        assert_eq!(result.removed_count, n);
        assert!(result.iterations - 1 <= n);
        assert!(result.reached_fixpoint);
    }
}
