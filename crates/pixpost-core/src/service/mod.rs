//! Application services - orchestration over the ports.

mod post_service;

pub use post_service::{Caller, DeleteOutcome, PostService};

#[cfg(test)]
mod tests;
