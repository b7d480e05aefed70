//! Tests for value rewrite rules

use std::borrow::Cow;

use httplog_config::ReplacementSpec;

use crate::error::SpecError;
use crate::replace::{apply_first, Replacement};

fn substring(pattern: &str, replacement: &str) -> Replacement {
    Replacement::compile(&ReplacementSpec {
        string: Some(pattern.into()),
        regexp: None,
        replacement: replacement.into(),
    })
    .unwrap()
}

fn pattern(regexp: &str, replacement: &str) -> Replacement {
    Replacement::compile(&ReplacementSpec {
        string: None,
        regexp: Some(regexp.into()),
        replacement: replacement.into(),
    })
    .unwrap()
}

#[test]
fn test_empty_list_is_identity() {
    assert_eq!(apply_first(&[], "anything"), "anything");
}

#[test]
fn test_no_match_passes_through() {
    let rules = vec![substring("xyz", "replaced")];
    assert_eq!(apply_first(&rules, "abc"), "abc");
    assert!(matches!(apply_first(&rules, "abc"), Cow::Borrowed(_)));
}

#[test]
fn test_substring_replaces_all_occurrences() {
    let rules = vec![substring("o", "0")];
    assert_eq!(apply_first(&rules, "foo bool"), "f00 b00l");
}

#[test]
fn test_regex_replaces_all_matches() {
    let rules = vec![pattern(r"\d+", "N")];
    assert_eq!(apply_first(&rules, "port 80 and 443"), "port N and N");
}

#[test]
fn test_regex_capture_groups() {
    let rules = vec![pattern(r"^/api/v(\d+)/.*$", "/api/v$1")];
    assert_eq!(apply_first(&rules, "/api/v2/users/123"), "/api/v2");
}

#[test]
fn test_regex_empty_match() {
    // The "ssl off" idiom: an empty field becomes a default value.
    let rules = vec![pattern("^$", "off")];
    assert_eq!(apply_first(&rules, ""), "off");
    assert_eq!(apply_first(&rules, "on"), "on");
}

#[test]
fn test_first_match_wins() {
    let rules = vec![
        substring("GET", "read"),
        substring("read", "never-applied"),
        pattern("G.T", "never-applied-either"),
    ];
    assert_eq!(apply_first(&rules, "GET"), "read");
}

#[test]
fn test_order_matters() {
    let first_regex = vec![pattern("G.T", "by-regex"), substring("GET", "by-substring")];
    assert_eq!(apply_first(&first_regex, "GET"), "by-regex");

    let first_substring = vec![substring("GET", "by-substring"), pattern("G.T", "by-regex")];
    assert_eq!(apply_first(&first_substring, "GET"), "by-substring");
}

#[test]
fn test_both_matchers_rejected() {
    let err = Replacement::compile(&ReplacementSpec {
        string: Some("a".into()),
        regexp: Some("b".into()),
        replacement: "c".into(),
    })
    .unwrap_err();
    assert!(matches!(err, SpecError::AmbiguousReplacement));
}

#[test]
fn test_neither_matcher_rejected() {
    let err = Replacement::compile(&ReplacementSpec {
        string: None,
        regexp: None,
        replacement: "c".into(),
    })
    .unwrap_err();
    assert!(matches!(err, SpecError::MissingMatcher));
}

#[test]
fn test_invalid_pattern_rejected() {
    let err = Replacement::compile(&ReplacementSpec {
        string: None,
        regexp: Some("(unclosed".into()),
        replacement: "c".into(),
    })
    .unwrap_err();
    assert!(matches!(err, SpecError::InvalidPattern { .. }));
}

#[test]
fn test_backreference_rejected() {
    // The linear-time engine has no backreferences; such patterns must
    // fail at compile time, not silently misbehave at parse time.
    let err = Replacement::compile(&ReplacementSpec {
        string: None,
        regexp: Some(r"(a)\1".into()),
        replacement: "c".into(),
    })
    .unwrap_err();
    assert!(matches!(err, SpecError::InvalidPattern { .. }));
}

#[test]
fn test_compile_all_preserves_order() {
    let specs = vec![
        ReplacementSpec {
            string: Some("a".into()),
            regexp: None,
            replacement: "1".into(),
        },
        ReplacementSpec {
            string: Some("b".into()),
            regexp: None,
            replacement: "2".into(),
        },
    ];
    let rules = Replacement::compile_all(&specs).unwrap();
    assert_eq!(rules.len(), 2);
    assert_eq!(apply_first(&rules, "b"), "2");
}
