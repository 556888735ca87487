use super::fixture;
use crate::{Error, ParseError, Parser, StructureError, Token};

/// Drives the parser to the first error, panicking if the document parses
/// cleanly.
fn first_error(text: &str) -> Error {
    let (_file, store) = fixture(text);
    let mut parser = Parser::new(&store);
    loop {
        match parser.next_token() {
            Ok(Token::Unknown) => panic!("document parsed cleanly: {text}"),
            Ok(_) => {}
            Err(err) => return err,
        }
    }
}

#[test]
fn trailing_comma_in_object_is_rejected() {
    assert!(matches!(
        first_error(r#"{"a":1,}"#),
        Error::Structure(StructureError::DanglingSeparator)
    ));
}

#[test]
fn trailing_comma_in_array_is_rejected() {
    assert!(matches!(
        first_error("[1,2,]"),
        Error::Structure(StructureError::DanglingSeparator)
    ));
}

#[test]
fn tokens_before_the_trailing_comma_still_parse() {
    let (_file, store) = fixture("[1,2,]");
    let mut parser = Parser::new(&store);
    assert_eq!(parser.next_token().unwrap(), Token::StartArray);
    assert_eq!(parser.next_token().unwrap(), Token::ValueNumber);
    assert_eq!(parser.next_token().unwrap(), Token::ValueNumber);
    // The error surfaces only at the `]`.
    assert!(parser.next_token().is_err());
}

#[test]
fn colon_without_a_name_is_rejected() {
    assert!(matches!(
        first_error("{:1}"),
        Error::Structure(StructureError::InvalidTransition { .. })
    ));
}

#[test]
fn comma_at_top_level_is_rejected() {
    assert!(matches!(
        first_error(",1"),
        Error::Structure(StructureError::InvalidTransition { .. })
    ));
}

#[test]
fn mismatched_close_is_rejected() {
    assert!(matches!(
        first_error("[1}"),
        Error::Structure(StructureError::InvalidTransition { .. })
    ));
}

#[test]
fn number_as_object_name_is_rejected() {
    assert!(matches!(
        first_error("{1:2}"),
        Error::Structure(StructureError::InvalidTransition { .. })
    ));
}

#[test]
fn container_as_object_name_is_rejected() {
    assert!(matches!(
        first_error("{{}}"),
        Error::Structure(StructureError::InvalidTransition { .. })
    ));
}

#[test]
fn bare_top_level_number_is_rejected() {
    assert!(matches!(
        first_error("17 "),
        Error::Structure(StructureError::InvalidTransition { .. })
    ));
}

#[test]
fn tokens_after_a_completed_document_are_rejected() {
    let (_file, store) = fixture("{}[]");
    let mut parser = Parser::new(&store);
    assert_eq!(parser.next_token().unwrap(), Token::StartObject);
    assert_eq!(parser.next_token().unwrap(), Token::EndObject);
    assert!(matches!(
        parser.next_token(),
        Err(Error::Structure(StructureError::DocumentComplete { .. }))
    ));
}

#[test]
fn invalid_escape_is_rejected() {
    assert!(matches!(
        first_error(r#"["a\qb"]"#),
        Error::Parse(ParseError::InvalidEscape { found: 'q' })
    ));
}

#[test]
fn short_unicode_escape_is_rejected() {
    assert!(matches!(
        first_error(r#"["\u12G4"]"#),
        Error::Parse(ParseError::InvalidUnicodeEscape { found: 'G' })
    ));
}

#[test]
fn unterminated_string_is_rejected() {
    assert!(matches!(
        first_error(r#"["abc"#),
        Error::Parse(ParseError::UnexpectedEndOfInput { .. })
    ));
}

#[test]
fn second_decimal_point_is_rejected() {
    assert!(matches!(
        first_error("[1.2.3]"),
        Error::Parse(ParseError::MalformedNumber {
            reason: "second decimal point",
            ..
        })
    ));
}

#[test]
fn exponent_without_decimal_point_is_rejected() {
    assert!(matches!(
        first_error("[1e5]"),
        Error::Parse(ParseError::MalformedNumber {
            reason: "exponent without a preceding decimal point",
            ..
        })
    ));
}

#[test]
fn sign_outside_exponent_is_rejected() {
    assert!(matches!(
        first_error("[1-2]"),
        Error::Parse(ParseError::MalformedNumber {
            reason: "sign outside an exponent",
            ..
        })
    ));
}

#[test]
fn garbage_inside_a_number_is_rejected() {
    assert!(matches!(
        first_error("[12x]"),
        Error::Parse(ParseError::InvalidNumberCharacter { found: 'x', .. })
    ));
}

#[test]
fn number_running_into_end_of_input_is_rejected() {
    assert!(matches!(
        first_error("[35"),
        Error::Parse(ParseError::UnexpectedEndOfInput { .. })
    ));
}

#[test]
fn misspelled_literal_is_rejected() {
    assert!(matches!(
        first_error("[nul]"),
        Error::Parse(ParseError::LiteralMismatch {
            expected: "null",
            ..
        })
    ));
}

#[test]
fn truncated_literal_is_rejected() {
    assert!(matches!(
        first_error("[tr"),
        Error::Parse(ParseError::UnexpectedEndOfInput { .. })
    ));
}

#[test]
fn accessors_without_a_value_fail() {
    let (_file, store) = fixture("[null]");
    let mut parser = Parser::new(&store);
    parser.next_token().unwrap();
    parser.next_token().unwrap();
    assert!(matches!(
        parser.decimal(),
        Err(Error::Parse(ParseError::NoValue))
    ));
}

#[test]
fn non_numeric_value_does_not_convert() {
    let (_file, store) = fixture(r#"["abc"]"#);
    let mut parser = Parser::new(&store);
    parser.next_token().unwrap();
    parser.next_token().unwrap();
    assert!(matches!(
        parser.as_i64(),
        Err(Error::Parse(ParseError::NotANumber(_)))
    ));
}
