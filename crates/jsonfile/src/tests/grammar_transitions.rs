use rstest::rstest;

use crate::{Grammar, GrammarEvent, GrammarState, StructureError};

use crate::GrammarEvent::{
    EndArray, EndObject, NameSeparator, StartArray, StartObject, String, Value, ValueSeparator,
};

fn run(events: &[GrammarEvent]) -> Result<Grammar, StructureError> {
    let mut grammar = Grammar::new();
    for &event in events {
        grammar.transition(event)?;
    }
    Ok(grammar)
}

#[rstest]
#[case::empty_object(&[StartObject, EndObject])]
#[case::empty_array(&[StartArray, EndArray])]
#[case::single_member(&[StartObject, String, NameSeparator, Value, EndObject])]
#[case::string_member(&[StartObject, String, NameSeparator, String, EndObject])]
#[case::two_members(
    &[StartObject, String, NameSeparator, Value, ValueSeparator,
      String, NameSeparator, Value, EndObject]
)]
#[case::array_elements(&[StartArray, Value, ValueSeparator, String, EndArray])]
#[case::nested(
    &[StartArray, StartObject, String, NameSeparator, StartArray, Value,
      ValueSeparator, Value, EndArray, EndObject, ValueSeparator, Value, EndArray]
)]
#[case::object_as_member_value(
    &[StartObject, String, NameSeparator, StartObject, EndObject, EndObject]
)]
#[case::bare_top_level_string(&[String])]
fn accepts(#[case] events: &[GrammarEvent]) {
    let grammar = run(events).unwrap();
    assert_eq!(grammar.depth(), 0);
}

#[rstest]
#[case::close_without_open(&[EndObject])]
#[case::array_close_without_open(&[EndArray])]
#[case::mismatched_close(&[StartObject, EndArray])]
#[case::mismatched_array_close(&[StartArray, Value, EndObject])]
#[case::colon_before_name(&[StartObject, NameSeparator])]
#[case::value_as_name(&[StartObject, Value])]
#[case::container_as_name(&[StartObject, StartObject])]
#[case::comma_at_start(&[ValueSeparator])]
#[case::double_comma(&[StartArray, Value, ValueSeparator, ValueSeparator])]
#[case::bare_top_level_number(&[Value])]
#[case::close_after_name(&[StartObject, String, EndObject])]
#[case::event_after_completion(&[StartObject, EndObject, StartArray])]
fn rejects(#[case] events: &[GrammarEvent]) {
    assert!(run(events).is_err());
}

#[rstest]
#[case::array(&[StartArray, Value, ValueSeparator, EndArray])]
#[case::array_after_container_element(
    &[StartArray, StartArray, EndArray, ValueSeparator, EndArray]
)]
#[case::object(
    &[StartObject, String, NameSeparator, Value, ValueSeparator, EndObject]
)]
fn rejects_dangling_separator(#[case] events: &[GrammarEvent]) {
    assert_eq!(run(events).unwrap_err(), StructureError::DanglingSeparator);
}

#[test]
fn completed_document_reports_no_state() {
    let grammar = run(&[StartObject, EndObject]).unwrap();
    assert_eq!(grammar.current(), None);
}

#[test]
fn bare_string_leaves_plain_value_state() {
    let grammar = run(&[String]).unwrap();
    assert_eq!(grammar.current(), Some(GrammarState::PlainValueRead));
}
