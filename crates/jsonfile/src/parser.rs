//! The streaming JSON parser.
//!
//! [`Parser`] walks the mapped bytes of a [`Store`] one token at a time,
//! driving a [`Grammar`] machine with read-side events and decoding
//! characters through the UTF-8 codec. No document tree is built: each call
//! to [`next_token`](Parser::next_token) classifies the next structural or
//! scalar unit and leaves the scalar's raw text in a single value slot.
//!
//! The value slot is pull-style: it holds the text of the most recently
//! extracted scalar and is overwritten (or cleared, for `null`) by the next
//! `next_token` or `skip` call, so consumers must read it before advancing.
//!
//! # Examples
//!
//! ```no_run
//! use jsonfile::{Parser, Store, Token};
//!
//! # fn main() -> jsonfile::Result<()> {
//! let store = Store::open("data.json")?.into_shared();
//! let mut parser = Parser::new(&store);
//! while parser.has_next() {
//!     match parser.next_token()? {
//!         Token::ObjectName => println!("member: {}", parser.value().unwrap_or("")),
//!         Token::Unknown => break,
//!         other => println!("{other:?}"),
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! [`Store`]: crate::Store

use std::rc::Rc;

use bigdecimal::{BigDecimal, ToPrimitive};
use tracing::trace;

use crate::{
    error::{EncodingError, ParseError, Result},
    grammar::{Grammar, GrammarEvent, GrammarState, SharedGrammar},
    store::SharedStore,
    utf8,
};

/// A classified unit returned by [`Parser::next_token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// `{` — an object was opened.
    StartObject,
    /// `}` — an object was closed.
    EndObject,
    /// `[` — an array was opened.
    StartArray,
    /// `]` — an array was closed.
    EndArray,
    /// A member name; its text is in the value slot.
    ObjectName,
    /// A string value; its raw text is in the value slot.
    ValueString,
    /// A number; its literal text is in the value slot.
    ValueNumber,
    /// `true` or `false`; the normalized text is in the value slot.
    ValueBoolean,
    /// `null`; the value slot is cleared.
    ValueNull,
    /// The input is exhausted.
    Unknown,
}

/// The streaming JSON parser.
///
/// Holds its own position cursor over a [`SharedStore`], so a generator with
/// an independent cursor can write the same bytes. The grammar machine may
/// likewise be private or shared with that generator
/// (see [`Parser::with_grammar`]).
#[derive(Debug)]
pub struct Parser {
    store: SharedStore,
    grammar: SharedGrammar,
    pos: usize,
    depth: usize,
    value: Option<String>,
    max_depth: Option<usize>,
}

impl Parser {
    /// Creates a parser over `store` with a fresh grammar machine.
    #[must_use]
    pub fn new(store: &SharedStore) -> Self {
        Self::with_grammar(store, Grammar::new().into_shared())
    }

    /// Creates a parser over `store` driving an existing grammar machine,
    /// typically one shared with a [`Generator`](crate::Generator) editing
    /// the same document.
    #[must_use]
    pub fn with_grammar(store: &SharedStore, grammar: SharedGrammar) -> Self {
        Self {
            store: Rc::clone(store),
            grammar,
            pos: 0,
            depth: 0,
            value: None,
            max_depth: None,
        }
    }

    /// Extracts the next token from the buffer.
    ///
    /// `:` and `,` drive the grammar but produce no token of their own;
    /// unrecognized filler bytes between tokens are skipped. Returns
    /// [`Token::Unknown`] once the input is exhausted.
    ///
    /// # Errors
    ///
    /// [`StructureError`](crate::StructureError) when a structural byte is
    /// illegal where it appears, [`ParseError`](crate::ParseError) for
    /// malformed scalars, [`EncodingError`](crate::EncodingError) for
    /// invalid UTF-8.
    pub fn next_token(&mut self) -> Result<Token> {
        while let Some(cp) = self.next_codepoint()? {
            let Some(c) = char::from_u32(cp) else {
                // Decodable but unrepresentable; skipped like any filler.
                continue;
            };
            match c {
                '{' => {
                    self.grammar
                        .borrow_mut()
                        .transition(GrammarEvent::StartObject)?;
                    self.depth += 1;
                    return Ok(Token::StartObject);
                }
                '}' => {
                    self.grammar
                        .borrow_mut()
                        .transition(GrammarEvent::EndObject)?;
                    self.depth = self.depth.saturating_sub(1);
                    return Ok(Token::EndObject);
                }
                '[' => {
                    self.grammar
                        .borrow_mut()
                        .transition(GrammarEvent::StartArray)?;
                    self.depth += 1;
                    return Ok(Token::StartArray);
                }
                ']' => {
                    self.grammar
                        .borrow_mut()
                        .transition(GrammarEvent::EndArray)?;
                    self.depth = self.depth.saturating_sub(1);
                    return Ok(Token::EndArray);
                }
                '"' => {
                    self.grammar.borrow_mut().transition(GrammarEvent::String)?;
                    let is_name =
                        self.grammar.borrow().current() == Some(GrammarState::NameRead);
                    self.scan_string()?;
                    return Ok(if is_name {
                        Token::ObjectName
                    } else {
                        Token::ValueString
                    });
                }
                ':' => self
                    .grammar
                    .borrow_mut()
                    .transition(GrammarEvent::NameSeparator)?,
                ',' => self
                    .grammar
                    .borrow_mut()
                    .transition(GrammarEvent::ValueSeparator)?,
                '-' | '0'..='9' => {
                    self.grammar.borrow_mut().transition(GrammarEvent::Value)?;
                    self.scan_number(c)?;
                    return Ok(Token::ValueNumber);
                }
                't' => {
                    self.grammar.borrow_mut().transition(GrammarEvent::Value)?;
                    self.scan_literal("true")?;
                    return Ok(Token::ValueBoolean);
                }
                'f' => {
                    self.grammar.borrow_mut().transition(GrammarEvent::Value)?;
                    self.scan_literal("false")?;
                    return Ok(Token::ValueBoolean);
                }
                'n' => {
                    self.grammar.borrow_mut().transition(GrammarEvent::Value)?;
                    self.scan_literal("null")?;
                    self.value = None;
                    return Ok(Token::ValueNull);
                }
                // Whitespace, and any other stray byte between tokens.
                _ => {}
            }
        }
        Ok(Token::Unknown)
    }

    /// Skips one level of nesting: advances until the current depth has
    /// decreased by one, discarding every intermediate token.
    ///
    /// # Errors
    ///
    /// As [`next_token`](Parser::next_token).
    pub fn skip(&mut self) -> Result<Token> {
        self.skip_levels(1)
    }

    /// Skips `levels` levels of nesting. When the requested depth exceeds
    /// the available nesting, the cursor fast-forwards to the end of the
    /// buffer and [`Token::Unknown`] is returned.
    ///
    /// # Errors
    ///
    /// As [`next_token`](Parser::next_token).
    pub fn skip_levels(&mut self, levels: usize) -> Result<Token> {
        if levels >= self.depth {
            self.pos = self.store.borrow().logical_size();
            return Ok(Token::Unknown);
        }
        let target = self.depth - levels;
        let mut token = Token::Unknown;
        while self.has_next() && self.depth != target {
            token = self.next_token()?;
        }
        Ok(token)
    }

    /// The highest nesting depth reached anywhere in the document.
    ///
    /// The first call re-tokenizes the whole buffer on a private probe
    /// cursor with a fresh grammar machine, leaving this parser's cursor and
    /// machine untouched; the result is cached until [`reset`](Parser::reset).
    ///
    /// # Errors
    ///
    /// As [`next_token`](Parser::next_token), raised against the probe scan.
    pub fn max_depth(&mut self) -> Result<usize> {
        if let Some(depth) = self.max_depth {
            return Ok(depth);
        }
        trace!("scanning for max depth");
        let mut probe = Parser::new(&self.store);
        let mut max = 0;
        while probe.has_next() {
            probe.next_token()?;
            max = max.max(probe.depth);
        }
        self.max_depth = Some(max);
        Ok(max)
    }

    /// Rewinds the cursor, clears the value slot and the max-depth cache,
    /// and resets the grammar machine (shared generators see the reset too).
    pub fn reset(&mut self) {
        self.pos = 0;
        self.depth = 0;
        self.value = None;
        self.max_depth = None;
        self.grammar.borrow_mut().reset();
    }

    /// `true` while document bytes remain ahead of the cursor.
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.pos < self.store.borrow().logical_size()
    }

    /// Current byte position of the read cursor.
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Current nesting depth at the cursor.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Raw text of the most recently extracted scalar, escapes unprocessed.
    /// `None` after a `null` or before any scalar has been read.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// The current value as an arbitrary-precision decimal. The literal text
    /// is preserved losslessly, trailing zeros included.
    ///
    /// # Errors
    ///
    /// [`ParseError::NoValue`] with nothing in the slot,
    /// [`ParseError::NotANumber`] when the text is not numeric.
    pub fn decimal(&self) -> Result<BigDecimal> {
        let text = self.value.as_deref().ok_or(ParseError::NoValue)?;
        match text.parse::<BigDecimal>() {
            Ok(decimal) => Ok(decimal),
            Err(_) => Err(ParseError::NotANumber(text.to_owned()).into()),
        }
    }

    /// The current value as a signed integer, truncating any fraction.
    ///
    /// # Errors
    ///
    /// As [`decimal`](Parser::decimal), plus [`ParseError::OutOfRange`].
    pub fn as_i64(&self) -> Result<i64> {
        let decimal = self.decimal()?;
        decimal
            .to_i64()
            .ok_or_else(|| ParseError::OutOfRange(decimal.to_string()).into())
    }

    /// The current value as a double.
    ///
    /// # Errors
    ///
    /// As [`decimal`](Parser::decimal), plus [`ParseError::OutOfRange`].
    pub fn as_f64(&self) -> Result<f64> {
        let decimal = self.decimal()?;
        decimal
            .to_f64()
            .ok_or_else(|| ParseError::OutOfRange(decimal.to_string()).into())
    }

    /// `true` when the current value reads `true`, ignoring case; `false`
    /// for anything else, including an empty slot.
    #[must_use]
    pub fn as_bool(&self) -> bool {
        self.value
            .as_deref()
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
    }

    /// Duplicates the handle to the grammar machine this parser drives.
    #[must_use]
    pub fn grammar(&self) -> SharedGrammar {
        Rc::clone(&self.grammar)
    }

    /// Duplicates the handle to the backing store.
    #[must_use]
    pub fn store(&self) -> SharedStore {
        Rc::clone(&self.store)
    }

    fn next_codepoint(&mut self) -> Result<Option<u32>> {
        let store = self.store.borrow();
        let bytes = &store.bytes()[..store.logical_size()];
        let mut pos = self.pos;
        let cp = utf8::decode_next(bytes, &mut pos)?;
        self.pos = pos;
        Ok(cp)
    }

    /// Scans from just past the opening quote to the next unescaped `"`,
    /// validating every escape sequence and storing the text between the
    /// quotes (escapes left raw) in the value slot.
    fn scan_string(&mut self) -> Result<()> {
        let store = self.store.borrow();
        let bytes = &store.bytes()[..store.logical_size()];
        let mut pos = self.pos;
        let mut text = String::new();
        let mut in_escape = false;
        loop {
            let Some(cp) = utf8::decode_next(bytes, &mut pos)? else {
                return Err(ParseError::UnexpectedEndOfInput { offset: pos }.into());
            };
            let Some(c) = char::from_u32(cp) else {
                return Err(EncodingError::UnsupportedCodePoint(cp).into());
            };
            if in_escape {
                match c {
                    '"' | '\\' | '/' | 'b' | 'f' | 'n' | 'r' | 't' => {
                        text.push('\\');
                        text.push(c);
                    }
                    'u' => {
                        text.push_str("\\u");
                        for _ in 0..4 {
                            let Some(h) = utf8::decode_next(bytes, &mut pos)? else {
                                return Err(
                                    ParseError::UnexpectedEndOfInput { offset: pos }.into()
                                );
                            };
                            match char::from_u32(h).filter(char::is_ascii_hexdigit) {
                                Some(h) => text.push(h),
                                None => {
                                    return Err(ParseError::InvalidUnicodeEscape {
                                        found: char::from_u32(h)
                                            .unwrap_or(char::REPLACEMENT_CHARACTER),
                                    }
                                    .into());
                                }
                            }
                        }
                    }
                    other => return Err(ParseError::InvalidEscape { found: other }.into()),
                }
                in_escape = false;
            } else if c == '\\' {
                in_escape = true;
            } else if c == '"' {
                self.pos = pos;
                self.value = Some(text);
                return Ok(());
            } else {
                text.push(c);
            }
        }
    }

    /// Scans the remainder of a number whose first character was `first`,
    /// storing the literal text in the value slot and pushing the
    /// terminating byte back for the next scan.
    fn scan_number(&mut self, first: char) -> Result<()> {
        let store = self.store.borrow();
        let bytes = &store.bytes()[..store.logical_size()];
        let mut pos = self.pos;
        let mut text = String::new();
        text.push(first);
        let mut seen_point = false;
        let mut in_exponent = false;
        loop {
            let at = pos;
            let Some(cp) = utf8::decode_next(bytes, &mut pos)? else {
                return Err(ParseError::UnexpectedEndOfInput { offset: pos }.into());
            };
            let Some(c) = char::from_u32(cp) else {
                return Err(EncodingError::UnsupportedCodePoint(cp).into());
            };
            if c.is_ascii_digit() {
                text.push(c);
                continue;
            }
            match c {
                '.' => {
                    if seen_point {
                        return Err(ParseError::MalformedNumber {
                            offset: at,
                            reason: "second decimal point",
                        }
                        .into());
                    }
                    seen_point = true;
                    text.push(c);
                }
                'e' | 'E' => {
                    if !seen_point {
                        return Err(ParseError::MalformedNumber {
                            offset: at,
                            reason: "exponent without a preceding decimal point",
                        }
                        .into());
                    }
                    in_exponent = true;
                    text.push(c);
                }
                '+' | '-' => {
                    if !in_exponent {
                        return Err(ParseError::MalformedNumber {
                            offset: at,
                            reason: "sign outside an exponent",
                        }
                        .into());
                    }
                    in_exponent = false;
                    text.push(c);
                }
                ' ' | '\t' | '\n' | '\r' | '\u{000C}' | ',' | ']' | '}' => {
                    // Terminator is not part of the number; re-scan it.
                    self.pos = at;
                    self.value = Some(text);
                    return Ok(());
                }
                other => {
                    return Err(ParseError::InvalidNumberCharacter {
                        offset: at,
                        found: other,
                    }
                    .into());
                }
            }
        }
    }

    /// Reads the unquoted literal starting one byte back, case-normalizes
    /// it, and requires it to match `expected` exactly.
    fn scan_literal(&mut self, expected: &'static str) -> Result<()> {
        let store = self.store.borrow();
        let start = self.pos - 1;
        let end = start + expected.len();
        if end > store.logical_size() {
            return Err(ParseError::UnexpectedEndOfInput {
                offset: store.logical_size(),
            }
            .into());
        }
        let found: String = store.bytes()[start..end]
            .iter()
            .map(|&b| char::from(b).to_ascii_lowercase())
            .collect();
        if found != expected {
            return Err(ParseError::LiteralMismatch { expected, found }.into());
        }
        self.pos = end;
        self.value = Some(found);
        Ok(())
    }
}
