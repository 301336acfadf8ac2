//! Domain layer: entities and the port to the remote service.
//!
//! # Architecture
//!
//! - [`entities`] - Data exchanged with the shortening API
//! - [`repositories`] - The [`repositories::ShortenerApi`] port
//!
//! The domain layer has no dependency on HTTP or presentation concerns;
//! services in [`crate::application::services`] depend only on the port.

pub mod entities;
pub mod repositories;
