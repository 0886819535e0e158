//! Core domain entities representing the business data model.
//!
//! The service has a single entity, [`Link`]: the persisted mapping between a
//! short code and the URL it redirects to. [`NewLink`] carries the input for
//! creating one.

pub mod link;

pub use link::{Link, NewLink};
