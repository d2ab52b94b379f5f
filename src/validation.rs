//! Input validation for display names and outbound chat text.
//!
//! The only rule beyond non-emptiness is a markup heuristic: any `<` that is
//! followed anywhere later by a `>` rejects the value. This also rejects
//! plain comparisons such as `"a<b and b>c"`. Inbound messages are never
//! checked here; the view renders them as text nodes.

#[cfg(test)]
#[path = "validation_test.rs"]
mod validation_test;

/// A rejected user input. `Display` is the alert text shown to the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Message cannot be empty")]
    EmptyMessage,
    #[error("Chat cannot contain HTML or script tags")]
    MarkupInMessage,
    #[error("Username cannot be empty")]
    EmptyName,
    #[error("Username cannot contain HTML or script tags")]
    MarkupInName,
}

/// True when `text` contains a `<` followed, at any distance, by a `>`.
#[must_use]
pub fn contains_markup(text: &str) -> bool {
    text.find('<')
        .is_some_and(|open| text[open + 1..].contains('>'))
}

/// Trim and validate a draft before it is sent.
///
/// # Errors
///
/// [`ValidationError::EmptyMessage`] for blank drafts and
/// [`ValidationError::MarkupInMessage`] for drafts containing markup.
pub fn validate_message(draft: &str) -> Result<&str, ValidationError> {
    let trimmed = draft.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyMessage);
    }
    if contains_markup(trimmed) {
        return Err(ValidationError::MarkupInMessage);
    }
    Ok(trimmed)
}

/// Trim and validate a display name during onboarding.
///
/// # Errors
///
/// [`ValidationError::EmptyName`] for blank names and
/// [`ValidationError::MarkupInName`] for names containing markup.
pub fn validate_display_name(name: &str) -> Result<&str, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if contains_markup(trimmed) {
        return Err(ValidationError::MarkupInName);
    }
    Ok(trimmed)
}
