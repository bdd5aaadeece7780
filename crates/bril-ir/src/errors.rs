//! Error types for decoding and encoding Bril programs.

use derive_more::{Display, Error, From};

pub type CodecResult<T> = Result<T, CodecError>;

#[derive(Display, Debug, Error, From)]
pub enum CodecError {
    #[display("failed to read program: {_0}")]
    Io(std::io::Error),

    #[display("malformed Bril JSON: {_0}")]
    Json(serde_json::Error),
}
