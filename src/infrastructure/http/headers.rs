//! Request hardening headers and rate-limit header parsing.

use crate::domain::entities::RateLimitStatus;
use crate::error::{ClientError, ClientResult};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use std::str::FromStr;

/// Header carrying the per-session anti-forgery token.
pub const CSRF_HEADER: &str = "x-csrf-token";

pub const RATE_LIMIT_REMAINING: &str = "x-ratelimit-remaining";
pub const RATE_LIMIT_RESET: &str = "x-ratelimit-reset";
pub const RETRY_AFTER: &str = "retry-after";

/// Fixed hardening headers sent with every request.
pub const SECURITY_HEADERS: [(&str, &str); 5] = [
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "DENY"),
    ("x-xss-protection", "1; mode=block"),
    ("referrer-policy", "strict-origin-when-cross-origin"),
    (
        "content-security-policy",
        "default-src 'self'; script-src 'self' 'unsafe-inline'; style-src 'self' 'unsafe-inline'; \
         img-src 'self' data: https:; connect-src 'self' https:; font-src 'self';",
    ),
];

/// Builds the default header set: JSON content type, hardening headers and
/// the anti-forgery token.
///
/// # Errors
///
/// Returns [`ClientError::Config`] if the token is not a valid header value.
pub fn default_headers(csrf_token: &str) -> ClientResult<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    for (name, value) in SECURITY_HEADERS {
        headers.insert(HeaderName::from_static(name), HeaderValue::from_static(value));
    }

    let token = HeaderValue::from_str(csrf_token)
        .map_err(|e| ClientError::Config(format!("Invalid anti-forgery token: {}", e)))?;
    headers.insert(HeaderName::from_static(CSRF_HEADER), token);

    Ok(headers)
}

/// Reads `x-ratelimit-remaining`, `x-ratelimit-reset` and `retry-after`.
///
/// Missing or non-numeric headers are ignored.
pub fn parse_rate_limit_headers(headers: &HeaderMap) -> RateLimitStatus {
    RateLimitStatus::from_headers_values(
        header_number(headers, RATE_LIMIT_REMAINING),
        header_number(headers, RATE_LIMIT_RESET),
        header_number(headers, RETRY_AFTER),
    )
}

fn header_number<T: FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for &(name, value) in pairs {
            map.insert(name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_default_headers_contents() {
        let map = default_headers("abc123").unwrap();

        assert_eq!(map[CONTENT_TYPE], "application/json");
        assert_eq!(map["x-content-type-options"], "nosniff");
        assert_eq!(map["x-frame-options"], "DENY");
        assert_eq!(map["referrer-policy"], "strict-origin-when-cross-origin");
        assert!(map.contains_key("content-security-policy"));
        assert_eq!(map[CSRF_HEADER], "abc123");
    }

    #[test]
    fn test_default_headers_rejects_bad_token() {
        assert!(default_headers("bad\ntoken").is_err());
    }

    #[test]
    fn test_no_rate_limit_headers() {
        let status = parse_rate_limit_headers(&HeaderMap::new());
        assert_eq!(status, RateLimitStatus::default());
    }

    #[test]
    fn test_retry_after_header() {
        let status = parse_rate_limit_headers(&headers(&[(RETRY_AFTER, "30")]));
        assert!(status.is_rate_limited);
        assert_eq!(status.retry_after, Some(30));
    }

    #[test]
    fn test_remaining_and_reset_headers() {
        let status = parse_rate_limit_headers(&headers(&[
            (RATE_LIMIT_REMAINING, "0"),
            (RATE_LIMIT_RESET, "1700000000"),
        ]));
        assert!(status.is_rate_limited);
        assert_eq!(status.remaining_requests, Some(0));
        assert_eq!(status.reset_time, Some(1_700_000_000));
    }

    #[test]
    fn test_remaining_requests_available() {
        let status = parse_rate_limit_headers(&headers(&[(RATE_LIMIT_REMAINING, "42")]));
        assert!(!status.is_rate_limited);
        assert_eq!(status.remaining_requests, Some(42));
    }

    #[test]
    fn test_non_numeric_headers_are_ignored() {
        let status = parse_rate_limit_headers(&headers(&[
            (RETRY_AFTER, "Wed, 21 Oct 2015 07:28:00 GMT"),
            (RATE_LIMIT_REMAINING, "many"),
        ]));
        assert_eq!(status, RateLimitStatus::default());
    }
}
