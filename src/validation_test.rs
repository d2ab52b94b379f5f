use super::*;

// =============================================================
// contains_markup
// =============================================================

#[test]
fn contains_markup_detects_tags() {
    assert!(contains_markup("<script>x</script>"));
    assert!(contains_markup("hi <b>there</b>"));
    assert!(contains_markup("<>"));
}

#[test]
fn contains_markup_rejects_comparison_operators() {
    assert!(contains_markup("a<b and b>c"));
}

#[test]
fn contains_markup_requires_open_before_close() {
    assert!(!contains_markup("a > b"));
    assert!(!contains_markup("a < b"));
    assert!(!contains_markup("b > a < c"));
    assert!(!contains_markup("plain text"));
}

// =============================================================
// validate_message
// =============================================================

#[test]
fn validate_message_trims_valid_draft() {
    assert_eq!(validate_message("  Hello world \n"), Ok("Hello world"));
}

#[test]
fn validate_message_rejects_blank_drafts() {
    assert_eq!(validate_message(""), Err(ValidationError::EmptyMessage));
    assert_eq!(validate_message(" \t "), Err(ValidationError::EmptyMessage));
}

#[test]
fn validate_message_rejects_markup() {
    assert_eq!(
        validate_message("<script>alert(\"Hello\");</script>"),
        Err(ValidationError::MarkupInMessage)
    );
}

// =============================================================
// validate_display_name
// =============================================================

#[test]
fn validate_display_name_accepts_and_trims() {
    assert_eq!(validate_display_name("  Alice "), Ok("Alice"));
}

#[test]
fn validate_display_name_rejects_blank_and_markup() {
    assert_eq!(validate_display_name("   "), Err(ValidationError::EmptyName));
    assert_eq!(validate_display_name("<i>Eve</i>"), Err(ValidationError::MarkupInName));
}

#[test]
fn validation_errors_carry_alert_text() {
    assert_eq!(ValidationError::EmptyMessage.to_string(), "Message cannot be empty");
    assert_eq!(
        ValidationError::MarkupInMessage.to_string(),
        "Chat cannot contain HTML or script tags"
    );
    assert_eq!(ValidationError::EmptyName.to_string(), "Username cannot be empty");
    assert_eq!(
        ValidationError::MarkupInName.to_string(),
        "Username cannot contain HTML or script tags"
    );
}
