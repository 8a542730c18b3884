use super::{interpret, DisplayText, StatusOutcome, BOOTSTRAP_DONE_MARKER, NOTICE_PREFIX};
use crate::bootstrap::PanelState;

#[test]
fn notice_prefix_is_stripped_and_reported_as_connecting() {
    let outcome = interpret(Some("NOTICE: Connected"));
    assert_eq!(outcome.state, Some(PanelState::Connecting));
    assert_eq!(outcome.text, Some(DisplayText::Notice("Connected".to_owned())));
    assert!(!outcome.completed);
}

#[test]
fn error_substring_matches_case_insensitively() {
    let outcome = interpret(Some("Some ERROR occurred"));
    assert_eq!(outcome.state, Some(PanelState::BootstrapError));
    assert_eq!(outcome.text, Some(DisplayText::ServiceError));

    let lower = interpret(Some("[warn] socks error: connection refused"));
    assert_eq!(lower.state, Some(PanelState::BootstrapError));
}

#[test]
fn notice_wins_over_error_heuristic() {
    let outcome = interpret(Some("NOTICE: recovered from error"));
    assert_eq!(outcome.state, Some(PanelState::Connecting));
    assert_eq!(
        outcome.text,
        Some(DisplayText::Notice("recovered from error".to_owned()))
    );
}

#[test]
fn empty_and_absent_lines_change_nothing() {
    assert!(interpret(Some("")).is_unchanged());
    assert!(interpret(None).is_unchanged());
    assert_eq!(interpret(None), StatusOutcome::default());
}

#[test]
fn unrelated_lines_change_nothing() {
    assert!(interpret(Some("[info] Opening Socks listener on 127.0.0.1:9050")).is_unchanged());
}

#[test]
fn completion_marker_reports_connected() {
    let outcome = interpret(Some(BOOTSTRAP_DONE_MARKER));
    assert_eq!(outcome.state, Some(PanelState::Connected));
    assert!(outcome.completed);
    assert_eq!(outcome.text, None);
}

#[test]
fn notice_with_completion_marker_keeps_text_and_connects() {
    let raw = format!("{NOTICE_PREFIX}{BOOTSTRAP_DONE_MARKER} (done): Done");
    let outcome = interpret(Some(&raw));
    assert_eq!(outcome.state, Some(PanelState::Connected));
    assert!(outcome.completed);
    assert_eq!(
        outcome.text,
        Some(DisplayText::Notice("Bootstrapped 100% (done): Done".to_owned()))
    );
}

#[test]
fn error_line_with_completion_marker_still_connects() {
    let outcome = interpret(Some("error ignored; Bootstrapped 100%"));
    assert_eq!(outcome.state, Some(PanelState::Connected));
    assert_eq!(outcome.text, Some(DisplayText::ServiceError));
    assert!(outcome.completed);
}

#[test]
fn prefix_match_is_exact() {
    assert!(interpret(Some("notice: lower case prefix")).is_unchanged());
    assert!(interpret(Some(" NOTICE: leading space")).is_unchanged());
}

#[test]
fn cleared_text_renders_empty() {
    assert!(DisplayText::Cleared.is_empty());
    assert_eq!(DisplayText::Cleared.to_string(), "");
    assert_eq!(DisplayText::Starting.to_string(), "Starting Tor...");
}
