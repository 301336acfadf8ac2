//! Syntactic validation of long URLs.

use crate::utils::sanitizer::sanitize;
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

/// Maximum accepted URL length in characters.
pub const MAX_URL_LENGTH: usize = 2048;

static ACCEPTED_SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(https?|ftp)://").unwrap());

/// Hostname must contain a dot and end with an alphabetic TLD of 2+ letters.
static HOSTNAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}$").unwrap());

const PARSED_SCHEMES: [&str; 4] = ["https", "http", "ftp", "ftps"];

/// The first rule a URL violates.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UrlValidationError {
    #[error("URL is required")]
    Required,

    #[error("URL cannot be empty")]
    Empty,

    #[error("URL contains invalid characters")]
    InvalidCharacters,

    #[error("URL is too long (maximum 2048 characters)")]
    TooLong,

    #[error("URL must start with http://, https://, or ftp://")]
    MissingScheme,

    #[error("Please enter a valid URL format (e.g., https://example.com)")]
    InvalidFormat,
}

/// Validates a long URL, returning the first violated rule.
///
/// # Rules (in order)
///
/// 1. Input must not be empty
/// 2. Input must not be whitespace only
/// 3. Input must survive sanitization
/// 4. At most [`MAX_URL_LENGTH`] characters after sanitization
/// 5. Must start with `http://`, `https://` or `ftp://`
/// 6. Must parse, and its hostname must look like `name.tld`
///
/// # Examples
///
/// ```
/// use url_shortener_client::utils::url_validator::{validate_url, UrlValidationError};
///
/// assert!(validate_url("https://example.com").is_ok());
/// assert_eq!(validate_url("example.com"), Err(UrlValidationError::MissingScheme));
/// ```
pub fn validate_url(input: &str) -> Result<(), UrlValidationError> {
    if input.is_empty() {
        return Err(UrlValidationError::Required);
    }

    if input.trim().is_empty() {
        return Err(UrlValidationError::Empty);
    }

    let sanitized = sanitize(input);
    if sanitized.is_empty() {
        return Err(UrlValidationError::InvalidCharacters);
    }

    if sanitized.chars().count() > MAX_URL_LENGTH {
        return Err(UrlValidationError::TooLong);
    }

    if !ACCEPTED_SCHEME.is_match(&sanitized) {
        return Err(UrlValidationError::MissingScheme);
    }

    if !has_valid_structure(&sanitized) {
        return Err(UrlValidationError::InvalidFormat);
    }

    Ok(())
}

fn has_valid_structure(candidate: &str) -> bool {
    let Ok(url) = Url::parse(candidate) else {
        return false;
    };

    if !PARSED_SCHEMES.contains(&url.scheme()) {
        return false;
    }

    url.host_str()
        .is_some_and(|host| HOSTNAME_PATTERN.is_match(host))
}
