//! Bril JSON wire format.
//!
//! Decoding is all-or-nothing: any malformed node aborts the whole program.
//! Encoding is pretty-printed with two-space indentation and a fixed field
//! order, so a node that went through the optimizer unchanged encodes to the
//! same bytes every time.

use std::fmt;
use std::io::{Read, Write};

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::errors::CodecResult;
use crate::ir::{Instruction, Label, Literal, Node, Program};

/// Decode a program from a JSON string.
pub fn decode_program(input: &str) -> CodecResult<Program> {
    Ok(serde_json::from_str(input)?)
}

/// Read an entire stream and decode it as a program.
pub fn read_program(mut reader: impl Read) -> CodecResult<Program> {
    let mut input = String::new();
    reader.read_to_string(&mut input)?;
    decode_program(&input)
}

/// Encode a program as pretty-printed JSON (no trailing newline).
pub fn encode_program(program: &Program) -> CodecResult<String> {
    Ok(serde_json::to_string_pretty(program)?)
}

/// Encode a program and write it followed by a newline.
pub fn write_program(mut writer: impl Write, program: &Program) -> CodecResult<()> {
    serde_json::to_writer_pretty(&mut writer, program)?;
    writeln!(writer)?;
    Ok(())
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let object = Map::<String, Value>::deserialize(deserializer)?;
        let is_label = object.contains_key("label");
        let value = Value::Object(object);

        if is_label {
            Label::deserialize(value)
                .map(Node::Label)
                .map_err(de::Error::custom)
        } else {
            Instruction::deserialize(value)
                .map(Node::Instruction)
                .map_err(de::Error::custom)
        }
    }
}

impl Serialize for Literal {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match (*self, self.as_integer()) {
            (Literal::Bool(b), _) => serializer.serialize_bool(b),
            (Literal::Number(_), Some(i)) => serializer.serialize_i64(i),
            (Literal::Number(n), None) => serializer.serialize_f64(n),
        }
    }
}

impl<'de> Deserialize<'de> for Literal {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(LiteralVisitor)
    }
}

struct LiteralVisitor;

impl Visitor<'_> for LiteralVisitor {
    type Value = Literal;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a boolean or numeric literal")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Literal, E> {
        Ok(Literal::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Literal, E> {
        Ok(Literal::Number(v as f64))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Literal, E> {
        Ok(Literal::Number(v as f64))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Literal, E> {
        Ok(Literal::Number(v))
    }
}
