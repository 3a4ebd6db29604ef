//! Property-based test generators using proptest.
//!
//! Provides strategies for message ids (valid and invalid) and blob
//! payloads.

use proptest::prelude::*;
use retryspool_data::MAX_ID_LEN;
use std::collections::HashSet;

/// Strategy for generating valid message ids of two or more bytes.
pub fn message_id_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9_-][a-zA-Z0-9_.-]{1,63}")
        .expect("Invalid regex")
        .prop_filter("Message id must not contain '..'", |s| !s.contains(".."))
}

/// Strategy for generating valid single-byte ids (the `misc` shard).
pub fn short_id_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9_-]").expect("Invalid regex")
}

/// Strategy for generating ids every backend must reject.
pub fn invalid_id_strategy() -> impl Strategy<Value = String> {
    let fragment = || prop::string::string_regex("[a-z0-9]{0,8}").expect("Invalid regex");

    prop_oneof![
        Just(String::new()),
        (fragment(), fragment()).prop_map(|(a, b)| format!("{a}..{b}")),
        (fragment(), prop::sample::select(vec!['/', '\\']), fragment())
            .prop_map(|(a, sep, b)| format!("{a}{sep}{b}")),
        (MAX_ID_LEN + 1..MAX_ID_LEN + 64).prop_map(|len| "x".repeat(len)),
    ]
}

/// Strategy for generating blob payloads (arbitrary bytes).
pub fn blob_data_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..4096)
}

/// Strategy for generating a set of distinct valid ids.
pub fn distinct_ids_strategy(max: usize) -> impl Strategy<Value = Vec<String>> {
    prop::collection::hash_set(message_id_strategy(), 1..=max)
        .prop_map(|ids: HashSet<String>| ids.into_iter().collect())
}
