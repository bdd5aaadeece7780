//! Bril IR crate.
//!
//! Provides the in-memory model of a Bril program together with the JSON wire
//! codec and the human-readable text printer used by the optimizer.

// === Program model ===
pub mod ir;
pub mod ops;

// === Wire format and printing ===
pub mod codec;
pub mod errors;
pub mod printer;

pub use codec::{decode_program, encode_program, read_program};
pub use errors::{CodecError, CodecResult};
pub use ir::{Argument, Function, Instruction, Label, Literal, Node, Program, Type};
pub use ops::Effect;
