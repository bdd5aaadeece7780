//! Bril program model.
//!
//! A [`Program`] owns its [`Function`]s, and each function owns an ordered
//! body of [`Node`]s. Nodes are plain values: passes never mutate an
//! instruction in place, they build a rewritten copy instead.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ops;

/// A whole Bril program.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub functions: Vec<Function>,
}

/// A Bril function: signature plus a flat body of labels and instructions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Function {
    #[serde(default)]
    pub instrs: Vec<Node>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<Argument>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<Type>,
}

impl Function {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            instrs: Vec::new(),
            name: name.into(),
            args: Vec::new(),
            return_type: None,
        }
    }

    pub fn with_args(mut self, args: impl IntoIterator<Item = Argument>) -> Self {
        self.args = args.into_iter().collect();
        self
    }

    pub fn with_return_type(mut self, ty: Type) -> Self {
        self.return_type = Some(ty);
        self
    }

    pub fn with_body(mut self, body: impl IntoIterator<Item = Node>) -> Self {
        self.instrs = body.into_iter().collect();
        self
    }

    /// Iterate over the instructions of the body, skipping labels.
    pub fn instructions(&self) -> impl Iterator<Item = &Instruction> {
        self.instrs.iter().filter_map(Node::as_instruction)
    }

    /// Number of instructions in the body (labels are not counted).
    pub fn instruction_count(&self) -> usize {
        self.instructions().count()
    }
}

/// A typed function parameter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argument {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: Type,
}

impl Argument {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// One position in a function body.
///
/// Serialization is derived; deserialization lives in [`crate::codec`] because
/// the variant is chosen by the presence of a `label` key.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Node {
    Label(Label),
    Instruction(Instruction),
}

impl Node {
    pub fn as_instruction(&self) -> Option<&Instruction> {
        match self {
            Node::Instruction(instr) => Some(instr),
            Node::Label(_) => None,
        }
    }

    pub fn as_label(&self) -> Option<&Label> {
        match self {
            Node::Label(label) => Some(label),
            Node::Instruction(_) => None,
        }
    }
}

impl From<Instruction> for Node {
    fn from(instr: Instruction) -> Self {
        Node::Instruction(instr)
    }
}

impl From<Label> for Node {
    fn from(label: Label) -> Self {
        Node::Label(label)
    }
}

/// A jump target marker.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub label: String,
}

impl Label {
    pub fn new(name: impl Into<String>) -> Self {
        Self { label: name.into() }
    }
}

/// A Bril instruction.
///
/// Field order matches the wire encoding.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    pub op: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub funcs: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub ty: Option<Type>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Literal>,
}

impl Instruction {
    /// A bare instruction with only an operator.
    pub fn new(op: impl Into<String>) -> Self {
        Self {
            op: op.into(),
            dest: None,
            args: Vec::new(),
            funcs: Vec::new(),
            labels: Vec::new(),
            ty: None,
            value: None,
        }
    }

    /// `dest: ty = const value`
    pub fn constant(dest: impl Into<String>, ty: Type, value: Literal) -> Self {
        Self::new(ops::CONST).with_dest(dest, ty).with_value(value)
    }

    /// `dest: ty = op args...`
    pub fn value<S: Into<String>>(
        dest: impl Into<String>,
        ty: Type,
        op: impl Into<String>,
        args: impl IntoIterator<Item = S>,
    ) -> Self {
        Self::new(op).with_dest(dest, ty).with_args(args)
    }

    /// `op args...` with no destination.
    pub fn effect<S: Into<String>>(
        op: impl Into<String>,
        args: impl IntoIterator<Item = S>,
    ) -> Self {
        Self::new(op).with_args(args)
    }

    pub fn with_dest(mut self, dest: impl Into<String>, ty: Type) -> Self {
        self.dest = Some(dest.into());
        self.ty = Some(ty);
        self
    }

    pub fn with_args<S: Into<String>>(mut self, args: impl IntoIterator<Item = S>) -> Self {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_funcs<S: Into<String>>(mut self, funcs: impl IntoIterator<Item = S>) -> Self {
        self.funcs = funcs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_labels<S: Into<String>>(mut self, labels: impl IntoIterator<Item = S>) -> Self {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_value(mut self, value: Literal) -> Self {
        self.value = Some(value);
        self
    }

    /// Whether this instruction ends a basic block.
    pub fn is_terminator(&self) -> bool {
        ops::is_terminator(&self.op)
    }

    pub fn effect_kind(&self) -> ops::Effect {
        ops::effect(&self.op)
    }
}

/// Literal operand of a `const` instruction.
///
/// The wire format only carries booleans and numbers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Literal {
    Bool(bool),
    Number(f64),
}

impl Literal {
    /// 2^63, the first integral `f64` past `i64::MAX`.
    const I64_UPPER_BOUND: f64 = 9_223_372_036_854_775_808.0;

    /// Returns the value as an integer if it is integral and fits in an `i64`.
    pub fn as_integer(&self) -> Option<i64> {
        match *self {
            Literal::Number(n)
                if n.is_finite()
                    && n.fract() == 0.0
                    && (i64::MIN as f64..Self::I64_UPPER_BOUND).contains(&n) =>
            {
                Some(n as i64)
            }
            _ => None,
        }
    }
}

impl From<bool> for Literal {
    fn from(value: bool) -> Self {
        Literal::Bool(value)
    }
}

impl From<i64> for Literal {
    fn from(value: i64) -> Self {
        Literal::Number(value as f64)
    }
}

impl From<f64> for Literal {
    fn from(value: f64) -> Self {
        Literal::Number(value)
    }
}

/// A Bril type: either a primitive (`int`, `bool`, ...) or a parameterized
/// type such as `{"ptr": "int"}`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawType", into = "RawType")]
pub enum Type {
    Primitive(String),
    Parameterized(String, Box<Type>),
}

impl Type {
    pub fn int() -> Self {
        Type::Primitive("int".to_owned())
    }

    pub fn bool() -> Self {
        Type::Primitive("bool".to_owned())
    }

    pub fn float() -> Self {
        Type::Primitive("float".to_owned())
    }

    pub fn ptr(inner: Type) -> Self {
        Type::Parameterized("ptr".to_owned(), Box::new(inner))
    }
}

/// Wire shape of [`Type`].
#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawType {
    Primitive(String),
    Parameterized(BTreeMap<String, Type>),
}

impl TryFrom<RawType> for Type {
    type Error = String;

    fn try_from(raw: RawType) -> Result<Self, Self::Error> {
        match raw {
            RawType::Primitive(name) => Ok(Type::Primitive(name)),
            RawType::Parameterized(map) => {
                let mut entries = map.into_iter();
                match (entries.next(), entries.next()) {
                    (Some((constructor, inner)), None) => {
                        Ok(Type::Parameterized(constructor, Box::new(inner)))
                    }
                    _ => Err("parameterized type must have exactly one constructor".to_owned()),
                }
            }
        }
    }
}

impl From<Type> for RawType {
    fn from(ty: Type) -> Self {
        match ty {
            Type::Primitive(name) => RawType::Primitive(name),
            Type::Parameterized(constructor, inner) => {
                RawType::Parameterized(BTreeMap::from([(constructor, *inner)]))
            }
        }
    }
}
