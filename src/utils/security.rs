//! Transport hardening helpers: anti-forgery tokens and HTTPS enforcement.

use std::net::IpAddr;
use url::{Host, Url};

/// Length of the raw anti-forgery token before hex encoding.
const CSRF_TOKEN_BYTES: usize = 32;

/// Generates a random anti-forgery token.
///
/// Uses `getrandom` for entropy and hex-encodes 32 bytes, producing a
/// 64-character lowercase token. One token is generated per client session.
///
/// # Errors
///
/// Returns an error if the operating system RNG is unavailable.
pub fn generate_csrf_token() -> Result<String, getrandom::Error> {
    let mut buffer = [0u8; CSRF_TOKEN_BYTES];
    getrandom::fill(&mut buffer)?;
    Ok(hex::encode(buffer))
}

/// Upgrades `http` URLs to `https`.
///
/// Loopback hosts (`localhost`, `127.0.0.0/8`, `::1`) are left untouched so
/// a local development server keeps working. Other schemes are returned
/// unchanged.
pub fn enforce_https(mut url: Url) -> Url {
    if url.scheme() == "http" && !is_loopback(&url) {
        // http -> https is always a valid scheme change for special URLs
        let _ = url.set_scheme("https");
    }
    url
}

/// Whether the URL points at the local machine.
pub fn is_loopback(url: &Url) -> bool {
    match url.host() {
        Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
        Some(Host::Ipv4(ip)) => IpAddr::V4(ip).is_loopback(),
        Some(Host::Ipv6(ip)) => IpAddr::V6(ip).is_loopback(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csrf_token_format() {
        let token = generate_csrf_token().unwrap();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_csrf_tokens_are_unique() {
        let first = generate_csrf_token().unwrap();
        let second = generate_csrf_token().unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_enforce_https_upgrades_http() {
        let url = enforce_https(Url::parse("http://api.example.com/v1").unwrap());
        assert_eq!(url.as_str(), "https://api.example.com/v1");
    }

    #[test]
    fn test_enforce_https_keeps_https() {
        let url = enforce_https(Url::parse("https://api.example.com").unwrap());
        assert_eq!(url.as_str(), "https://api.example.com/");
    }

    #[test]
    fn test_enforce_https_exempts_loopback() {
        for raw in ["http://localhost:3000/", "http://127.0.0.1:8080/", "http://[::1]:9000/"] {
            let url = enforce_https(Url::parse(raw).unwrap());
            assert_eq!(url.scheme(), "http", "{raw} should stay on http");
        }
    }
}
