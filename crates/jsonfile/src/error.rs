//! Error types for the codec.
//!
//! Three leaf kinds mirror the three layers of the engine: [`StructureError`]
//! for grammar violations, [`ParseError`] for malformed scalars and
//! [`EncodingError`] for invalid byte sequences. [`Error`] composes them with
//! the I/O failures the backing store can raise.

use thiserror::Error;

use crate::grammar::{GrammarEvent, GrammarState};

/// Convenience alias for results produced by this crate.
pub type Result<T> = core::result::Result<T, Error>;

/// Any failure the codec can produce.
#[derive(Debug, Error)]
pub enum Error {
    /// The grammar machine rejected a transition.
    #[error(transparent)]
    Structure(#[from] StructureError),
    /// A scalar token was malformed.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// The buffer held invalid UTF-8, or a code point could not be encoded.
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    /// The backing store failed to open, grow or flush.
    #[error("store i/o: {0}")]
    Io(#[from] std::io::Error),
    /// NaN and infinities have no JSON representation.
    #[error("cannot write non-finite number {0}")]
    NonFiniteNumber(f64),
}

/// An illegal grammar transition.
///
/// The machine is left unchanged when one of these is returned, so the caller
/// can abort cleanly.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StructureError {
    /// The event is not legal in the current state.
    #[error("cannot {event} from {state}")]
    InvalidTransition {
        /// State the machine was in when the event arrived.
        state: GrammarState,
        /// The rejected event.
        event: GrammarEvent,
    },
    /// A close event found the wrong container on the stack.
    #[error("unbalanced structure: expected {expected}, found {found}")]
    UnbalancedClose {
        /// Container state the close required.
        expected: GrammarState,
        /// State actually found on the stack.
        found: GrammarState,
    },
    /// A container closed directly after a value separator.
    #[error("dangling value separator (,) before container close")]
    DanglingSeparator,
    /// An event arrived after the top-level container completed.
    #[error("cannot {event}: document already complete")]
    DocumentComplete {
        /// The rejected event.
        event: GrammarEvent,
    },
}

/// A malformed scalar token.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// An escape other than `\" \\ \/ \b \f \n \r \t \uXXXX`.
    #[error("invalid escape sequence '\\{found}'")]
    InvalidEscape {
        /// The character following the backslash.
        found: char,
    },
    /// `\u` was not followed by four hex digits.
    #[error("invalid unicode escape: expected hex digit, found '{found}'")]
    InvalidUnicodeEscape {
        /// The offending character.
        found: char,
    },
    /// Number text violated the accepted grammar.
    #[error("malformed number at byte {offset}: {reason}")]
    MalformedNumber {
        /// Byte offset of the violation.
        offset: usize,
        /// What was wrong.
        reason: &'static str,
    },
    /// A character that can never appear in a number.
    #[error("unexpected character '{found}' in number at byte {offset}")]
    InvalidNumberCharacter {
        /// Byte offset of the character.
        offset: usize,
        /// The character.
        found: char,
    },
    /// An unquoted literal that is not exactly `true`, `false` or `null`.
    #[error("unquoted literal: expected {expected}, found {found}")]
    LiteralMismatch {
        /// The literal the first byte announced.
        expected: &'static str,
        /// The text actually present.
        found: String,
    },
    /// The buffer ended in the middle of a token.
    #[error("unexpected end of input at byte {offset}")]
    UnexpectedEndOfInput {
        /// Position of the scan when the input ran out.
        offset: usize,
    },
    /// A value accessor was called with no scalar available.
    #[error("no scalar value available")]
    NoValue,
    /// The current value does not parse as a decimal number.
    #[error("current value is not a number: {0}")]
    NotANumber(String),
    /// The current value does not fit the requested numeric type.
    #[error("number out of range: {0}")]
    OutOfRange(String),
}

/// An invalid byte sequence on decode, or an unencodable unit on encode.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodingError {
    /// A byte that cannot start a UTF-8 sequence.
    #[error("invalid utf-8 leading byte {byte:#04x} at offset {offset}")]
    InvalidLeadingByte {
        /// The offending byte.
        byte: u8,
        /// Byte offset within the buffer.
        offset: usize,
    },
    /// A continuation byte where a leading byte was expected.
    #[error("unexpected utf-8 continuation byte {byte:#04x} at offset {offset}")]
    UnexpectedContinuation {
        /// The offending byte.
        byte: u8,
        /// Byte offset within the buffer.
        offset: usize,
    },
    /// A non-continuation byte in the middle of a multi-byte sequence.
    #[error("invalid utf-8 continuation byte {byte:#04x} at offset {offset}")]
    InvalidContinuation {
        /// The offending byte.
        byte: u8,
        /// Byte offset within the buffer.
        offset: usize,
    },
    /// The buffer ended in the middle of a multi-byte sequence.
    #[error("truncated utf-8 sequence starting at offset {offset}")]
    TruncatedSequence {
        /// Byte offset of the sequence start.
        offset: usize,
    },
    /// The code point is above the largest encodable range.
    #[error("code point U+{0:X} cannot be encoded")]
    UnencodableCodePoint(u32),
    /// The decoded code point is not a valid Unicode scalar value.
    #[error("code point U+{0:X} is not a valid scalar value")]
    UnsupportedCodePoint(u32),
    /// A low surrogate arrived with no high surrogate pending.
    #[error("unpaired low surrogate {0:#06x}")]
    UnpairedLowSurrogate(u16),
    /// A high surrogate was never completed by a low surrogate.
    #[error("unpaired high surrogate {0:#06x}")]
    UnpairedHighSurrogate(u16),
}
