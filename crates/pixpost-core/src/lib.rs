//! # Pixpost Core
//!
//! The domain layer of the Pixpost photo-sharing backend.
//! This crate contains the post lifecycle and the ports it depends on,
//! with zero infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use error::DomainError;
pub use service::{Caller, DeleteOutcome, PostService};
