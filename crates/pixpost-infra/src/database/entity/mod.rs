//! SeaORM entities and their mapping to domain records.

pub mod post;
pub mod user;
