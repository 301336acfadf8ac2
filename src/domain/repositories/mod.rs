//! Port trait definitions for the domain layer.
//!
//! The remote shortening service is the only repository this client has:
//! every link, history page and analytics summary lives there.
//!
//! - Traits define the contract for remote operations
//! - The HTTP implementation lives in `crate::infrastructure::http`
//! - Mock implementations are auto-generated via `mockall` for testing

pub mod shortener_api;

pub use shortener_api::{ApiReply, ShortenerApi};

#[cfg(test)]
pub use shortener_api::MockShortenerApi;
