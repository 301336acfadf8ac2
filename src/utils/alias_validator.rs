//! Validation of optional custom aliases.

use crate::utils::sanitizer::sanitize;
use regex::Regex;
use std::sync::LazyLock;

pub const MIN_ALIAS_LENGTH: usize = 3;
pub const MAX_ALIAS_LENGTH: usize = 20;

static ALIAS_CHARSET: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_\-]+$").unwrap());

/// The first rule an alias violates.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AliasValidationError {
    #[error("Alias contains invalid characters")]
    InvalidCharacters,

    #[error("Alias must be at least 3 characters long")]
    TooShort,

    #[error("Alias cannot be longer than 20 characters")]
    TooLong,

    #[error("Alias can only contain letters, numbers, hyphens, and underscores")]
    DisallowedCharacters,

    #[error("Alias cannot start or end with hyphens or underscores")]
    LeadingOrTrailingSpecial,

    #[error("Alias cannot contain consecutive special characters")]
    ConsecutiveSpecial,
}

/// Validates an optional alias.
///
/// `None`, empty and whitespace-only aliases are valid: the server then
/// generates a code.
///
/// # Rules (in order)
///
/// 1. Must survive sanitization
/// 2. 3-20 characters
/// 3. Letters, digits, `-` and `_` only
/// 4. Must not start or end with `-` or `_`
/// 5. No two adjacent characters from `{-, _}`
pub fn validate_alias(input: Option<&str>) -> Result<(), AliasValidationError> {
    let Some(raw) = input else {
        return Ok(());
    };

    if raw.trim().is_empty() {
        return Ok(());
    }

    let alias = sanitize(raw);
    if alias.is_empty() {
        return Err(AliasValidationError::InvalidCharacters);
    }

    let length = alias.chars().count();
    if length < MIN_ALIAS_LENGTH {
        return Err(AliasValidationError::TooShort);
    }
    if length > MAX_ALIAS_LENGTH {
        return Err(AliasValidationError::TooLong);
    }

    if !ALIAS_CHARSET.is_match(&alias) {
        return Err(AliasValidationError::DisallowedCharacters);
    }

    if alias.starts_with(is_special) || alias.ends_with(is_special) {
        return Err(AliasValidationError::LeadingOrTrailingSpecial);
    }

    let has_adjacent_specials = alias
        .as_bytes()
        .windows(2)
        .any(|pair| is_special(pair[0] as char) && is_special(pair[1] as char));
    if has_adjacent_specials {
        return Err(AliasValidationError::ConsecutiveSpecial);
    }

    Ok(())
}

/// The sanitized alias, or `None` when nothing usable remains.
pub fn sanitized_alias(input: Option<&str>) -> Option<String> {
    input.map(sanitize).filter(|alias| !alias.is_empty())
}

fn is_special(c: char) -> bool {
    c == '-' || c == '_'
}
