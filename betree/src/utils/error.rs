use strum::EnumIs;
use thiserror::Error;

use crate::value::ValueKind;

/// A single diagnostic produced by the expression front end.
///
/// `start` and `end` are byte offsets into the parsed source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserError {
    pub message: String,
    pub start: usize,
    pub end: usize,
}

impl std::fmt::Display for ParserError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (at {}..{})", self.message, self.start, self.end)
    }
}

fn join_messages(errors: &[ParserError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Error, EnumIs)]
pub enum Error {
    /// A comparison leaf and the attribute it reads hold values of different kinds.
    #[error(
        "Type mismatch on attribute `{key}`: the comparison holds a value of kind {expected}, but the attribute holds a value of kind {found}."
    )]
    TypeMismatch {
        key: String,
        expected: ValueKind,
        found: ValueKind,
    },

    /// The expression text could not be tokenised or parsed.
    #[error("Failed to parse expression: {}", join_messages(.errors))]
    ParserErrors { errors: Vec<ParserError> },

    /// The right-hand side of a comparison is an identifier rather than a literal.
    #[error(
        "Unsupported operand `{found}` at {start}..{end}: the right-hand side of a comparison must be an integer or string literal."
    )]
    UnsupportedOperand {
        found: String,
        start: usize,
        end: usize,
    },

    /// Writing the structured encoding or the compressed stream failed.
    #[error("Failed to encode tree: {0}")]
    Encoding(std::io::Error),

    /// The byte blob is not a valid compressed stream.
    #[error("Failed to decompress payload: {0}")]
    Decompression(std::io::Error),

    /// The decompressed payload is truncated, has trailing bytes, or holds invalid text.
    #[error("Malformed payload: {0}")]
    MalformedPayload(std::io::Error),

    /// The payload references a wire variant outside the closed set.
    #[error("Unknown wire variant with tag 0x{tag:02x}")]
    UnknownVariant { tag: u8 },

    /// The uncompressed payload is larger than the configured limit.
    #[error("Uncompressed payload exceeds the limit of {limit} bytes")]
    PayloadTooLarge { limit: usize },

    /// The tree nests deeper than the configured limit, on either side of the codec.
    #[error("Tree exceeds the maximum depth of {max}")]
    DepthExceeded { max: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration file '{file}': {source}")]
    ConfigParseError {
        source: toml::de::Error,
        file: String,
    },
}

pub type BetResult<T> = Result<T, Error>;
