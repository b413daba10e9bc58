// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::collections::HashMap;

crate::define_id! {
    /// Test ID type for macro verification.
    pub struct TestId("tst-");
}

#[test]
fn define_id_hash_map_lookup() {
    let mut map = HashMap::new();
    map.insert(TestId::from_string("tst-k"), 42);
    assert_eq!(map.get("tst-k"), Some(&42));
}

#[test]
fn define_id_new_has_prefix_and_is_unique() {
    let a = TestId::new();
    let b = TestId::new();
    assert!(a.as_str().starts_with(TestId::PREFIX));
    assert_ne!(a, b);
}

#[test]
fn define_id_suffix_strips_prefix() {
    let id = TestId::from_string("tst-abcdefghijklmnop123");
    assert_eq!(id.suffix(), "abcdefghijklmnop123");
}

#[test]
fn define_id_short_truncates_suffix() {
    let id = TestId::from_string("tst-abcdefghijklmnop123");
    assert_eq!(id.short(4), "abcd");
}

#[test]
fn define_id_short_returns_full_when_shorter() {
    let id = TestId::from_string("tst-abc");
    assert_eq!(id.short(8), "abc");
}

#[test]
fn define_id_display_roundtrips_through_string() {
    let id = TestId::from_string("tst-xyz");
    let s = id.to_string();
    assert_eq!(s, "tst-xyz");
    assert_eq!(TestId::from_string(&s), id);
}

#[test]
fn define_id_eq_with_str() {
    let id = TestId::from_string("tst-abc");
    assert_eq!(id, "tst-abc");
}

// --- short() free function tests ---

#[test]
fn short_fn_on_str() {
    let s = "abcdefghijklmnop";
    assert_eq!(short(s, 8), "abcdefgh");
    assert_eq!(short(s, 100), s);
    assert_eq!(short("abc", 8), "abc");
}
