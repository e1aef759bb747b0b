//! Domain model module declarations.
//!
//! Wire shapes use the camelCase field names of the inbound notification
//! and of the two external services; canonical types are the ones the
//! pipeline stages hand to each other.

pub mod notification;
pub mod snapshot;
pub mod submission;
pub mod verdict;
