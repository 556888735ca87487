#![no_main]

use jsonfile::{Parser, Store, Token};
use libfuzzer_sys::fuzz_target;

/// Parsing arbitrary bytes must never panic: every malformed document has to
/// surface as an `Err`, and a document that tokenizes to completion has to
/// leave the depth accounting balanced against the grammar machine.
fn parse(data: &[u8]) {
    let Ok(file) = tempfile::NamedTempFile::new() else {
        return;
    };
    if std::fs::write(file.path(), data).is_err() {
        return;
    }
    let Ok(store) = Store::open(file.path()) else {
        return;
    };
    let store = store.into_shared();

    let mut parser = Parser::new(&store);
    let grammar = parser.grammar();
    loop {
        match parser.next_token() {
            Ok(Token::Unknown) => {
                assert_eq!(parser.depth(), grammar.borrow().depth());
                break;
            }
            Ok(_) => {
                let _ = parser.value();
            }
            Err(_) => break,
        }
    }
}

fuzz_target!(|data: &[u8]| parse(data));
