//! The streaming JSON generator.
//!
//! [`Generator`] drives a [`Grammar`] machine with write-side events and
//! emits token bytes straight into the backing store, with no insignificant
//! whitespace. Before every write it checks whether the prior state calls
//! for an implicit `,` and emits one first, so sequential values can be
//! written without tracking separators by hand. Illegal sequencing surfaces
//! as the grammar machine's own [`StructureError`](crate::StructureError);
//! there is no silent recovery.
//!
//! # Examples
//!
//! ```no_run
//! use jsonfile::{Generator, Store};
//!
//! # fn main() -> jsonfile::Result<()> {
//! let store = Store::open("out.json")?.into_shared();
//! let mut writer = Generator::new(&store);
//! writer.start_object()?;
//! writer.write_member("id", 17)?;
//! writer.write_name("tags")?;
//! writer.start_array()?;
//! writer.write_value("a")?;
//! writer.write_value("b")?;
//! writer.end_array()?;
//! writer.end_object()?;
//! store.borrow_mut().flush()?;
//! # Ok(())
//! # }
//! ```

use std::rc::Rc;

use crate::{
    error::{EncodingError, Error, Result},
    grammar::{Grammar, GrammarEvent, GrammarState, SharedGrammar},
    parser::Parser,
    store::SharedStore,
    utf8,
};

/// A scalar value the generator can emit.
///
/// Built through the `From` impls, so callers pass plain Rust values to
/// [`Generator::write_value`]. Numeric kinds are formatted with their
/// canonical decimal text representation.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// A JSON string.
    Text(String),
    /// `true` or `false`.
    Boolean(bool),
    /// A 16-bit signed integer.
    Int16(i16),
    /// A 32-bit signed integer.
    Int32(i32),
    /// A 64-bit signed integer.
    Int64(i64),
    /// A single-precision float.
    Float32(f32),
    /// A double-precision float.
    Float64(f64),
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i16> for Scalar {
    fn from(value: i16) -> Self {
        Self::Int16(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Self::Int32(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Self::Int64(value)
    }
}

impl From<f32> for Scalar {
    fn from(value: f32) -> Self {
        Self::Float32(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Self::Float64(value)
    }
}

/// The streaming JSON generator.
///
/// Holds an independent write cursor over a [`SharedStore`]. The grammar
/// machine is its own by default; [`Generator::from_parser`] shares the
/// paired parser's machine and store for in-place read-modify-write.
#[derive(Debug)]
pub struct Generator {
    store: SharedStore,
    grammar: SharedGrammar,
    pos: usize,
    scratch: Vec<u8>,
}

impl Generator {
    /// Creates a generator over `store` with a fresh grammar machine and the
    /// write cursor at the start of the buffer.
    #[must_use]
    pub fn new(store: &SharedStore) -> Self {
        Self {
            store: Rc::clone(store),
            grammar: Grammar::new().into_shared(),
            pos: 0,
            scratch: Vec::new(),
        }
    }

    /// Creates a generator sharing `parser`'s store and grammar machine,
    /// with the write cursor at the parser's current position. Both sides
    /// then interleave events through the one machine.
    #[must_use]
    pub fn from_parser(parser: &Parser) -> Self {
        Self {
            store: parser.store(),
            grammar: parser.grammar(),
            pos: parser.position(),
            scratch: Vec::new(),
        }
    }

    /// Emits `{`, separating it from a preceding array element if needed.
    ///
    /// # Errors
    ///
    /// [`StructureError`](crate::StructureError) when an object cannot start
    /// here.
    pub fn start_object(&mut self) -> Result<&mut Self> {
        self.separate_element()?;
        self.grammar
            .borrow_mut()
            .transition(GrammarEvent::StartObject)?;
        self.emit(b"{")?;
        Ok(self)
    }

    /// Emits `}`.
    ///
    /// # Errors
    ///
    /// [`StructureError`](crate::StructureError) when no object is open, or
    /// a member is incomplete.
    pub fn end_object(&mut self) -> Result<&mut Self> {
        self.grammar
            .borrow_mut()
            .transition(GrammarEvent::EndObject)?;
        self.emit(b"}")?;
        Ok(self)
    }

    /// Emits `[`, separating it from a preceding array element if needed.
    ///
    /// # Errors
    ///
    /// [`StructureError`](crate::StructureError) when an array cannot start
    /// here.
    pub fn start_array(&mut self) -> Result<&mut Self> {
        self.separate_element()?;
        self.grammar
            .borrow_mut()
            .transition(GrammarEvent::StartArray)?;
        self.emit(b"[")?;
        Ok(self)
    }

    /// Emits `]`.
    ///
    /// # Errors
    ///
    /// [`StructureError`](crate::StructureError) when no array is open.
    pub fn end_array(&mut self) -> Result<&mut Self> {
        self.grammar
            .borrow_mut()
            .transition(GrammarEvent::EndArray)?;
        self.emit(b"]")?;
        Ok(self)
    }

    /// Emits `"name":`, separating it from a preceding member if needed.
    ///
    /// # Errors
    ///
    /// [`StructureError`](crate::StructureError) when a name is not expected
    /// here.
    pub fn write_name(&mut self, name: &str) -> Result<&mut Self> {
        if self.grammar.borrow().current() == Some(GrammarState::ValueRead) {
            self.separator()?;
        }
        self.grammar.borrow_mut().transition(GrammarEvent::String)?;
        self.emit_quoted(name)?;
        self.grammar
            .borrow_mut()
            .transition(GrammarEvent::NameSeparator)?;
        self.emit(b":")?;
        Ok(self)
    }

    /// Emits a JSON `null`.
    ///
    /// # Errors
    ///
    /// [`StructureError`](crate::StructureError) when a value is not
    /// expected here.
    pub fn write_null(&mut self) -> Result<&mut Self> {
        self.separate_element()?;
        self.grammar.borrow_mut().transition(GrammarEvent::Value)?;
        self.emit(b"null")?;
        Ok(self)
    }

    /// Emits a scalar value, separating it from a preceding array element if
    /// needed. Strings are escaped per RFC 8259; numbers use their canonical
    /// decimal text.
    ///
    /// # Errors
    ///
    /// [`Error::NonFiniteNumber`] for NaN or infinite floats, otherwise the
    /// grammar machine's [`StructureError`](crate::StructureError).
    pub fn write_value(&mut self, value: impl Into<Scalar>) -> Result<&mut Self> {
        let value = value.into();
        match value {
            Scalar::Float32(v) if !v.is_finite() => {
                return Err(Error::NonFiniteNumber(f64::from(v)));
            }
            Scalar::Float64(v) if !v.is_finite() => return Err(Error::NonFiniteNumber(v)),
            _ => {}
        }
        self.separate_element()?;
        match value {
            Scalar::Text(text) => {
                self.grammar.borrow_mut().transition(GrammarEvent::String)?;
                self.emit_quoted(&text)?;
            }
            Scalar::Boolean(v) => {
                self.grammar.borrow_mut().transition(GrammarEvent::Value)?;
                self.emit(if v { b"true" } else { b"false" })?;
            }
            Scalar::Int16(v) => self.emit_number(&v.to_string())?,
            Scalar::Int32(v) => self.emit_number(&v.to_string())?,
            Scalar::Int64(v) => self.emit_number(&v.to_string())?,
            Scalar::Float32(v) => self.emit_number(&v.to_string())?,
            Scalar::Float64(v) => self.emit_number(&v.to_string())?,
        }
        Ok(self)
    }

    /// Emits `"name":value` in one call.
    ///
    /// # Errors
    ///
    /// As [`write_name`](Generator::write_name) and
    /// [`write_value`](Generator::write_value).
    pub fn write_member(&mut self, name: &str, value: impl Into<Scalar>) -> Result<&mut Self> {
        self.write_name(name)?.write_value(value)
    }

    /// Emits `"name":null` in one call.
    ///
    /// # Errors
    ///
    /// As [`write_name`](Generator::write_name) and
    /// [`write_null`](Generator::write_null).
    pub fn write_null_member(&mut self, name: &str) -> Result<&mut Self> {
        self.write_name(name)?.write_null()
    }

    /// Current byte position of the write cursor.
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Duplicates the handle to the grammar machine this generator drives.
    #[must_use]
    pub fn grammar(&self) -> SharedGrammar {
        Rc::clone(&self.grammar)
    }

    /// Duplicates the handle to the backing store.
    #[must_use]
    pub fn store(&self) -> SharedStore {
        Rc::clone(&self.store)
    }

    /// Emits the implicit `,` after a completed array element.
    fn separate_element(&mut self) -> Result<()> {
        if self.grammar.borrow().current() == Some(GrammarState::ElementRead) {
            self.separator()?;
        }
        Ok(())
    }

    fn separator(&mut self) -> Result<()> {
        self.grammar
            .borrow_mut()
            .transition(GrammarEvent::ValueSeparator)?;
        self.emit(b",")
    }

    fn emit_number(&mut self, text: &str) -> Result<()> {
        self.grammar.borrow_mut().transition(GrammarEvent::Value)?;
        self.emit(text.as_bytes())
    }

    fn emit_quoted(&mut self, text: &str) -> Result<()> {
        self.scratch.clear();
        quote_into(text, &mut self.scratch)?;
        let mut store = self.store.borrow_mut();
        store.write_at(self.pos, &self.scratch)?;
        self.pos += self.scratch.len();
        Ok(())
    }

    fn emit(&mut self, bytes: &[u8]) -> Result<()> {
        self.store.borrow_mut().write_at(self.pos, bytes)?;
        self.pos += bytes.len();
        Ok(())
    }
}

/// Appends `text` as a quoted, escaped JSON string: `"` `\` and the short
/// escapes per RFC 8259, remaining control characters as `\u00XX`, and
/// everything else as raw UTF-8.
fn quote_into(text: &str, out: &mut Vec<u8>) -> core::result::Result<(), EncodingError> {
    out.push(b'"');
    for c in text.chars() {
        match c {
            '"' => out.extend_from_slice(b"\\\""),
            '\\' => out.extend_from_slice(b"\\\\"),
            '\u{0008}' => out.extend_from_slice(b"\\b"),
            '\u{000C}' => out.extend_from_slice(b"\\f"),
            '\n' => out.extend_from_slice(b"\\n"),
            '\r' => out.extend_from_slice(b"\\r"),
            '\t' => out.extend_from_slice(b"\\t"),
            c if c.is_control() && u32::from(c) < 0x20 => {
                out.extend_from_slice(format!("\\u{:04X}", u32::from(c)).as_bytes());
            }
            c => {
                utf8::encode(u32::from(c), out)?;
            }
        }
    }
    out.push(b'"');
    Ok(())
}
