use std::io::Write as _;

use tempfile::NamedTempFile;

use crate::{SharedStore, Store};

mod grammar_transitions;
mod parse_bad;

/// Writes `text` into a fresh temp file and opens a store over it. The
/// [`NamedTempFile`] keeps the path alive for the duration of the test.
fn fixture(text: &str) -> (NamedTempFile, SharedStore) {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file.flush().unwrap();
    let store = Store::open(file.path()).unwrap().into_shared();
    (file, store)
}

/// An empty store over a fresh temp file, for generator tests.
fn empty_fixture() -> (NamedTempFile, SharedStore) {
    fixture("")
}
