use super::*;

#[test]
fn matches_known_transient_strings() {
    assert!(is_transient_error("Error: database is locked"));
    assert!(is_transient_error("dial tcp: connection refused"));
    assert!(is_transient_error("write: broken pipe"));
    assert!(is_transient_error("DATABASE IS LOCKED"));
}

#[test]
fn does_not_match_unrelated_errors() {
    assert!(!is_transient_error("validation failed: delay_hours out of range"));
    assert!(!is_transient_error("file not found"));
}
