//! Property-based tests for the envelope codec
//!
//! These verify the round-trip guarantee and that decoding arbitrary
//! key-value payloads never panics and honors the required/optional fields.

use proptest::prelude::*;
use pubchat_core::{codec, DecodeError, EntryUpdate, DEFAULT_ENTRY};
use serde_json::{Map, Value};

/// Non-blank message text, including unicode and surrounding whitespace
fn arb_update() -> impl Strategy<Value = String> {
    prop::string::string_regex(r"[\PC]{1,200}")
        .unwrap()
        .prop_filter("text must not be blank", |text| !text.trim().is_empty())
}

/// Text made only of whitespace
fn arb_blank_update() -> impl Strategy<Value = String> {
    prop::string::string_regex(r"[ \t\n\r\x{3000}]{0,20}").unwrap()
}

/// Any sender name, empty included
fn arb_entry() -> impl Strategy<Value = String> {
    prop::string::string_regex(r"[\PC]{0,40}").unwrap()
}

/// Arbitrary JSON leaf values
fn arb_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        ".{0,20}".prop_map(Value::String),
    ]
}

/// Objects with random keys that never include `update`
fn arb_object_without_update() -> impl Strategy<Value = Map<String, Value>> {
    prop::collection::btree_map("[a-z]{1,8}", arb_leaf(), 0..6).prop_map(|fields| {
        fields
            .into_iter()
            .filter(|(key, _)| key != "update")
            .collect()
    })
}

proptest! {
    /// Property: decode(encode(e)) == e for every valid pair
    #[test]
    fn round_trip(update in arb_update(), entry in arb_entry()) {
        let envelope = EntryUpdate::with_entry(update, entry);
        let decoded = codec::decode(&codec::encode(&envelope)).expect("valid envelope decodes");
        prop_assert_eq!(decoded, envelope);
    }

    /// Property: a payload missing `update` is always a DecodeError
    #[test]
    fn missing_update_always_fails(fields in arb_object_without_update()) {
        let result = codec::decode(&Value::Object(fields));
        prop_assert_eq!(result, Err(DecodeError::MissingField { field: "update" }));
    }

    /// Property: a payload missing `entry` decodes to the placeholder
    #[test]
    fn missing_entry_defaults(update in arb_update()) {
        let mut fields = Map::new();
        fields.insert("update".into(), Value::String(update.clone()));

        let decoded = codec::decode(&Value::Object(fields)).expect("update alone is enough");
        prop_assert_eq!(decoded.update(), update.as_str());
        prop_assert_eq!(decoded.entry(), DEFAULT_ENTRY);
    }

    /// Property: blank text is rejected whatever the sender
    #[test]
    fn blank_update_always_fails(update in arb_blank_update(), entry in arb_entry()) {
        let envelope = EntryUpdate::with_entry(update, entry);
        prop_assert_eq!(codec::decode(&codec::encode(&envelope)), Err(DecodeError::EmptyUpdate));
    }

    /// Property: arbitrary leaves never panic and never decode
    #[test]
    fn non_objects_never_decode(value in arb_leaf()) {
        prop_assert_eq!(codec::decode(&value), Err(DecodeError::NotAnObject));
    }

    /// Property: arbitrary bytes never panic
    #[test]
    fn arbitrary_bytes_never_panic(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        let _ = codec::decode_slice(&bytes);
    }
}
