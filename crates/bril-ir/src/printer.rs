//! Bril text format printer.
//!
//! # Example output
//!
//! ```text
//! @main(n: int): int {
//!   one: int = const 1;
//!   sum: int = add n one;
//! .done:
//!   print sum;
//!   ret sum;
//! }
//! ```

use std::fmt::{self, Display, Write};

use crate::ir::{Argument, Function, Instruction, Label, Literal, Node, Program, Type};

/// Render a whole program in text form.
pub fn print_program(program: &Program) -> String {
    program.to_string()
}

impl Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for function in &self.functions {
            write!(f, "{function}")?;
        }
        Ok(())
    }
}

impl Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.name)?;
        if !self.args.is_empty() {
            f.write_char('(')?;
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{arg}")?;
            }
            f.write_char(')')?;
        }
        if let Some(ty) = &self.return_type {
            write!(f, ": {ty}")?;
        }
        f.write_str(" {\n")?;
        for node in &self.instrs {
            writeln!(f, "{node}")?;
        }
        f.write_str("}\n")
    }
}

impl Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.ty)
    }
}

impl Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Label(label) => write!(f, "{label}"),
            Node::Instruction(instr) => write!(f, "  {instr}"),
        }
    }
}

impl Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ".{}:", self.label)
    }
}

impl Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(dest) = &self.dest {
            f.write_str(dest)?;
            if let Some(ty) = &self.ty {
                write!(f, ": {ty}")?;
            }
            f.write_str(" = ")?;
        }
        f.write_str(&self.op)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        for func in &self.funcs {
            write!(f, " @{func}")?;
        }
        for label in &self.labels {
            write!(f, " .{label}")?;
        }
        if let Some(value) = &self.value {
            write!(f, " {value}")?;
        }
        f.write_char(';')
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (*self, self.as_integer()) {
            (Literal::Bool(b), _) => write!(f, "{b}"),
            (Literal::Number(_), Some(i)) => write!(f, "{i}"),
            (Literal::Number(n), None) => write!(f, "{n}"),
        }
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Primitive(name) => f.write_str(name),
            Type::Parameterized(constructor, inner) => write!(f, "{constructor}<{inner}>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;

    use super::*;

    fn sample_function() -> Function {
        Function::new("main")
            .with_args([Argument::new("n", Type::int()), Argument::new("p", Type::ptr(Type::int()))])
            .with_return_type(Type::int())
            .with_body([
                Instruction::constant("one", Type::int(), Literal::from(1)).into(),
                Instruction::constant("half", Type::float(), Literal::Number(0.5)).into(),
                Instruction::value("sum", Type::int(), "add", ["n", "one"]).into(),
                Instruction::effect("br", ["cond"]).with_labels(["done", "loop"]).into(),
                Label::new("done").into(),
                Instruction::new("call")
                    .with_dest("r", Type::int())
                    .with_args(["sum"])
                    .with_funcs(["helper"])
                    .into(),
                Instruction::effect("print", ["r"]).into(),
                Instruction::effect("ret", ["sum"]).into(),
            ])
    }

    #[test]
    fn prints_function() {
        assert_snapshot!(sample_function().to_string(), @r"
        @main(n: int, p: ptr<int>): int {
          one: int = const 1;
          half: float = const 0.5;
          sum: int = add n one;
          br cond .done .loop;
        .done:
          r: int = call sum @helper;
          print r;
          ret sum;
        }
        ");
    }

    #[test]
    fn omits_empty_signature_parts() {
        let program = Program {
            functions: vec![
                Function::new("main").with_body([Instruction::new("nop").into()]),
                Function::new("answer")
                    .with_return_type(Type::int())
                    .with_body([Instruction::constant("b", Type::bool(), Literal::Bool(true)).into()]),
            ],
        };
        assert_snapshot!(print_program(&program), @r"
        @main {
          nop;
        }
        @answer: int {
          b: bool = const true;
        }
        ");
    }
}
