//! Document intermediate representation and read-only queries
//!
//! The types in this module are the sole artifact exchanged between the
//! markup side and the Word-document side of the engine.

pub mod models;
pub mod query;

pub use models::*;
pub use query::*;
