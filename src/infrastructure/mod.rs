//! Infrastructure layer: concrete store backends.
//!
//! - [`persistence`] - PostgreSQL and in-memory implementations of
//!   [`crate::domain::repositories::LinkRepository`]

pub mod persistence;
