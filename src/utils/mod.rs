//! Input handling and transport hardening helpers.
//!
//! - [`sanitizer`] - Neutralizes markup and script fragments
//! - [`url_validator`] - Long URL rules
//! - [`alias_validator`] - Custom alias rules
//! - [`security`] - Anti-forgery tokens and HTTPS enforcement
//!
//! Sanitization always runs before validation and before a value is sent
//! over the network.

pub mod alias_validator;
pub mod sanitizer;
pub mod security;
pub mod url_validator;

pub use alias_validator::{AliasValidationError, sanitized_alias, validate_alias};
pub use sanitizer::{sanitize, secure_url};
pub use url_validator::{UrlValidationError, validate_url};
