//! Shorthand constructors for building test functions.

use bril_ir::{Function, Instruction, Label, Literal, Node, Type};

pub fn konst(dest: &str, value: i64) -> Node {
    Instruction::constant(dest, Type::int(), Literal::from(value)).into()
}

pub fn value<const N: usize>(dest: &str, op: &str, args: [&str; N]) -> Node {
    Instruction::value(dest, Type::int(), op, args).into()
}

pub fn effect<const N: usize>(op: &str, args: [&str; N]) -> Node {
    Instruction::effect(op, args).into()
}

pub fn call<const N: usize>(dest: &str, func: &str, args: [&str; N]) -> Node {
    Instruction::value(dest, Type::int(), "call", args)
        .with_funcs([func])
        .into()
}

pub fn label(name: &str) -> Node {
    Label::new(name).into()
}

pub fn jmp(target: &str) -> Node {
    Instruction::new("jmp").with_labels([target]).into()
}

pub fn br(cond: &str, then_label: &str, else_label: &str) -> Node {
    Instruction::effect("br", [cond])
        .with_labels([then_label, else_label])
        .into()
}

pub fn ret<const N: usize>(args: [&str; N]) -> Node {
    Instruction::effect("ret", args).into()
}

pub fn ret_void() -> Node {
    Instruction::new("ret").into()
}

pub fn function(body: Vec<Node>) -> Function {
    Function::new("main").with_body(body)
}
