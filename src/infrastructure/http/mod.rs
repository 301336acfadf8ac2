//! HTTP access to the remote shortening API.
//!
//! - [`client`] - [`HttpShortenerApi`], the `reqwest` implementation of the port
//! - [`headers`] - Hardening headers and rate-limit header parsing
//! - [`dto`] - Request bodies and response envelopes

pub mod client;
pub mod dto;
pub mod headers;

pub use client::HttpShortenerApi;
pub use headers::parse_rate_limit_headers;
