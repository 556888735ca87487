//! Streaming JSON reading and writing over a growable, memory-mapped file
//! buffer.
//!
//! `jsonfile` parses and generates JSON directly against the bytes of a
//! persisted document, without building an in-memory tree. A [`Store`] maps
//! the file, a [`Parser`] pulls one [`Token`] at a time out of the mapped
//! bytes, and a [`Generator`] writes well-formed tokens back into them. Both
//! sides drive the same kind of [`Grammar`] state machine, and a
//! parser/generator pair sharing one machine can read and edit a document in
//! place.
//!
//! The trade is convenience for control: callers manage buffer position
//! (skipping subtrees they do not need), grammar validity is enforced on
//! every token in both directions, and persistence is explicit via
//! [`Store::flush`].
//!
//! # Examples
//!
//! ```no_run
//! use jsonfile::{Generator, Parser, Store, Token};
//!
//! # fn main() -> jsonfile::Result<()> {
//! let store = Store::open("weather.json")?.into_shared();
//!
//! let mut writer = Generator::new(&store);
//! writer.start_object()?;
//! writer.write_member("station", "KSEA")?;
//! writer.write_member("temp_c", 11.5)?;
//! writer.end_object()?;
//! store.borrow_mut().flush()?;
//!
//! let mut parser = Parser::new(&store);
//! assert_eq!(parser.next_token()?, Token::StartObject);
//! assert_eq!(parser.next_token()?, Token::ObjectName);
//! assert_eq!(parser.value(), Some("station"));
//! # Ok(())
//! # }
//! ```

mod error;
mod generator;
mod grammar;
mod parser;
mod store;
pub mod utf8;

#[cfg(test)]
mod tests;

pub use error::{EncodingError, Error, ParseError, Result, StructureError};
pub use generator::{Generator, Scalar};
pub use grammar::{Grammar, GrammarEvent, GrammarState, SharedGrammar};
pub use parser::{Parser, Token};
pub use store::{SharedStore, Store};
