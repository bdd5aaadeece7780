//! Local value numbering (LVN).
//!
//! Each basic block is rewritten on its own with a fresh value table:
//!
//! 1. Names read before any local definition (parameters, values flowing in
//!    from other blocks) are seeded with their own value numbers.
//! 2. A backward scan finds the last write of every destination. Earlier
//!    writes of a redefined name are moved to synthetic names so the old value
//!    stays addressable after the name is reused.
//! 3. A forward scan builds a [`CanonicalExpression`] for each instruction.
//!    Recomputations of a value already in the table become `id` copies of the
//!    value's representative.
//!
//! The rewritten block has the same length as the input. Removing the copies
//! that end up unused is left to [`crate::dce`].

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::ops::AddAssign;

use bril_ir::{Function, Instruction, Literal, Node, Type, ops};
use smallvec::SmallVec;

use crate::blocks::{BasicBlock, flatten, form_blocks};

/// Prefix of the names given to shadowed writes.
pub const SYNTHETIC_PREFIX: &str = "lvn.";

/// Identity of a value within one block. Never meaningful across blocks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ValueNumber(u32);

/// The name that holds a value in the rewritten block.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Binding {
    /// A name from the input program.
    Named(String),
    /// A fresh name for a write that is overwritten later in the same block.
    Synthetic(u32),
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Binding::Named(name) => f.write_str(name),
            Binding::Synthetic(index) => write!(f, "{SYNTHETIC_PREFIX}{index}"),
        }
    }
}

/// Hashable form of a literal. Numbers compare by bit pattern.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum LiteralKey {
    Bool(bool),
    Number(u64),
}

impl From<Literal> for LiteralKey {
    fn from(literal: Literal) -> Self {
        match literal {
            Literal::Bool(b) => LiteralKey::Bool(b),
            Literal::Number(n) => LiteralKey::Number(n.to_bits()),
        }
    }
}

/// The key used to detect redundant computation.
///
/// Besides the operator, operand value numbers and literal, the key carries the
/// declared type and function references: `const 1` as `int` and as `float`
/// are different values.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CanonicalExpression {
    op: String,
    args: SmallVec<[ValueNumber; 2]>,
    funcs: Vec<String>,
    ty: Option<Type>,
    literal: Option<LiteralKey>,
}

impl CanonicalExpression {
    fn new(instr: &Instruction, args: SmallVec<[ValueNumber; 2]>) -> Self {
        Self {
            op: instr.op.clone(),
            args,
            funcs: instr.funcs.clone(),
            ty: instr.ty.clone(),
            literal: instr.value.map(LiteralKey::from),
        }
    }
}

/// Counters reported by value numbering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LvnStats {
    /// Redundant computations replaced by copies.
    pub copies: usize,
    /// Destinations moved to synthetic names.
    pub renamed: usize,
}

impl AddAssign for LvnStats {
    fn add_assign(&mut self, other: Self) {
        self.copies += other.copies;
        self.renamed += other.renamed;
    }
}

/// Value table for a single block.
#[derive(Default)]
struct ValueTable {
    expressions: HashMap<CanonicalExpression, ValueNumber>,
    representatives: HashMap<ValueNumber, Binding>,
    numbers: HashMap<Binding, ValueNumber>,
    /// Original name -> synthetic binding, while the name is shadowed.
    renamed: HashMap<String, Binding>,
    next: u32,
}

impl ValueTable {
    fn fresh(&mut self) -> ValueNumber {
        let number = ValueNumber(self.next);
        self.next += 1;
        number
    }

    /// Give every name read before its local definition a number of its own.
    fn seed(&mut self, block: &BasicBlock) {
        let mut defined: HashSet<&str> = HashSet::new();
        for instr in block.instructions() {
            for arg in &instr.args {
                if defined.contains(arg.as_str()) {
                    continue;
                }
                let binding = Binding::Named(arg.clone());
                if !self.numbers.contains_key(&binding) {
                    let number = self.fresh();
                    self.bind(binding, number);
                }
            }
            if let Some(dest) = &instr.dest {
                defined.insert(dest);
            }
        }
    }

    fn bind(&mut self, binding: Binding, number: ValueNumber) {
        self.representatives
            .entry(number)
            .or_insert_with(|| binding.clone());
        self.numbers.insert(binding, number);
    }

    fn resolve(&self, name: &str) -> Binding {
        self.renamed
            .get(name)
            .cloned()
            .unwrap_or_else(|| Binding::Named(name.to_owned()))
    }

    fn number_of(&mut self, binding: &Binding) -> ValueNumber {
        if let Some(&number) = self.numbers.get(binding) {
            return number;
        }
        let number = self.fresh();
        self.bind(binding.clone(), number);
        number
    }

    /// Existing value for `key`, with the binding that currently holds it.
    fn lookup(&self, key: &CanonicalExpression) -> Option<(ValueNumber, Binding)> {
        let number = *self.expressions.get(key)?;
        let holder = self.representatives.get(&number)?;
        Some((number, holder.clone()))
    }
}

/// Indices of the nodes holding the last write of each destination.
fn last_writes(block: &BasicBlock) -> HashSet<usize> {
    let mut seen = HashSet::new();
    let mut last = HashSet::new();
    for (index, node) in block.nodes.iter().enumerate().rev() {
        let dest = node.as_instruction().and_then(|instr| instr.dest.as_deref());
        if let Some(dest) = dest
            && seen.insert(dest)
        {
            last.insert(index);
        }
    }
    last
}

/// Per-function value numbering driver.
///
/// Value tables are rebuilt for every block; only the supply of synthetic
/// names is shared, so that a synthetic name never collides with a name
/// already used anywhere in the function.
#[derive(Debug)]
pub struct ValueNumberer {
    reserved: HashSet<String>,
    next_synthetic: u32,
}

impl ValueNumberer {
    /// A numberer that avoids every name appearing in `function`.
    pub fn for_function(function: &Function) -> Self {
        let mut reserved: HashSet<String> =
            function.args.iter().map(|arg| arg.name.clone()).collect();
        for instr in function.instructions() {
            reserved.extend(instr.dest.iter().cloned());
            reserved.extend(instr.args.iter().cloned());
        }
        Self {
            reserved,
            next_synthetic: 0,
        }
    }

    fn fresh_synthetic(&mut self) -> Binding {
        loop {
            self.next_synthetic += 1;
            let binding = Binding::Synthetic(self.next_synthetic);
            if self.reserved.insert(binding.to_string()) {
                return binding;
            }
        }
    }

    /// Rewrite one block. Labels pass through; instructions keep their order.
    pub fn number_block(&mut self, block: &BasicBlock) -> (BasicBlock, LvnStats) {
        let mut table = ValueTable::default();
        table.seed(block);
        let last_writes = last_writes(block);
        let mut stats = LvnStats::default();

        let mut nodes = Vec::with_capacity(block.len());
        for (index, node) in block.nodes.iter().enumerate() {
            let node = match node {
                Node::Label(label) => Node::Label(label.clone()),
                Node::Instruction(instr) => {
                    let last_write = last_writes.contains(&index);
                    Node::Instruction(self.rewrite(&mut table, instr, last_write, &mut stats))
                }
            };
            nodes.push(node);
        }

        (BasicBlock::new(nodes), stats)
    }

    fn rewrite(
        &mut self,
        table: &mut ValueTable,
        instr: &Instruction,
        last_write: bool,
        stats: &mut LvnStats,
    ) -> Instruction {
        let operands: Vec<Binding> = instr.args.iter().map(|arg| table.resolve(arg)).collect();
        let numbers: SmallVec<[ValueNumber; 2]> =
            operands.iter().map(|binding| table.number_of(binding)).collect();

        let mut rewritten = Instruction {
            args: operands.iter().map(Binding::to_string).collect(),
            ..instr.clone()
        };

        let Some(dest) = &instr.dest else {
            return rewritten;
        };

        let number = if instr.effect_kind().is_pure() {
            let key = CanonicalExpression::new(instr, numbers.clone());
            if let Some((existing, holder)) = table.lookup(&key) {
                tracing::trace!(dest = %dest, source = %holder, "redundant computation");
                rewritten = copy_of(instr, &holder);
                stats.copies += 1;
                existing
            } else if ops::is_copy(&instr.op) && numbers.len() == 1 {
                // Copies share their source's number instead of entering the table.
                numbers[0]
            } else {
                let number = table.fresh();
                table.expressions.insert(key, number);
                number
            }
        } else {
            table.fresh()
        };

        let binding = if last_write {
            table.renamed.remove(dest);
            Binding::Named(dest.clone())
        } else {
            let binding = self.fresh_synthetic();
            table.renamed.insert(dest.clone(), binding.clone());
            stats.renamed += 1;
            binding
        };

        rewritten.dest = Some(binding.to_string());
        table.bind(binding, number);
        rewritten
    }
}

/// `dest: ty = id source`
fn copy_of(instr: &Instruction, source: &Binding) -> Instruction {
    Instruction {
        op: ops::ID.to_owned(),
        dest: instr.dest.clone(),
        args: vec![source.to_string()],
        funcs: Vec::new(),
        labels: Vec::new(),
        ty: instr.ty.clone(),
        value: None,
    }
}

/// Run local value numbering over every block of `function`.
pub fn number_values(function: &Function) -> (Function, LvnStats) {
    let mut numberer = ValueNumberer::for_function(function);
    let mut stats = LvnStats::default();

    let blocks: Vec<BasicBlock> = form_blocks(function.instrs.iter().cloned())
        .iter()
        .map(|block| {
            let (block, block_stats) = numberer.number_block(block);
            stats += block_stats;
            block
        })
        .collect();

    let rewritten = Function {
        instrs: flatten(blocks),
        name: function.name.clone(),
        args: function.args.clone(),
        return_type: function.return_type.clone(),
    };
    (rewritten, stats)
}
