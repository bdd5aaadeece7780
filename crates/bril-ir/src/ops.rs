//! Operator classification.
//!
//! Passes query operators by name instead of matching on an exhaustive opcode
//! enum, so programs using extensions this crate does not know about still
//! flow through. Unknown operators are treated conservatively: they are never
//! considered redundant with one another.

/// Literal constant.
pub const CONST: &str = "const";
/// Pure copy of a single operand.
pub const ID: &str = "id";

/// Operators that end a basic block.
pub const TERMINATORS: &[&str] = &["br", "jmp", "ret"];

/// Operators whose result depends only on their operands, literal and type.
const PURE_OPS: &[&str] = &[
    // core
    "const", "id", "add", "mul", "sub", "div", "eq", "lt", "gt", "le", "ge", "not", "and", "or",
    // float
    "fadd", "fmul", "fsub", "fdiv", "feq", "flt", "fle", "fgt", "fge",
    // char
    "ceq", "clt", "cle", "cgt", "cge", "char2int", "int2char",
    // memory address arithmetic
    "ptradd",
];

/// Operators with effects observable outside the function.
const SIDE_EFFECT_OPS: &[&str] = &["call"];

/// How an operator relates to the rest of the program.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Result is a function of operands, literal and type only.
    Pure,
    /// Result may differ between two evaluations with equal operands
    /// (memory reads, allocation, phi nodes, unknown extensions).
    Opaque,
    /// Evaluation has effects beyond producing its result.
    SideEffect,
}

impl Effect {
    /// Whether two evaluations with the same operands may share one result.
    pub fn is_pure(self) -> bool {
        self == Effect::Pure
    }

    /// Whether the instruction may be dropped once its result is dead.
    pub fn is_removable(self) -> bool {
        self != Effect::SideEffect
    }
}

/// Classify an operator by name.
pub fn effect(op: &str) -> Effect {
    if PURE_OPS.contains(&op) {
        Effect::Pure
    } else if SIDE_EFFECT_OPS.contains(&op) {
        Effect::SideEffect
    } else {
        Effect::Opaque
    }
}

pub fn is_terminator(op: &str) -> bool {
    TERMINATORS.contains(&op)
}

pub fn is_copy(op: &str) -> bool {
    op == ID
}
