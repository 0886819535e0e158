//! Repository trait definitions for the domain layer.
//!
//! The store contract lives here as a trait so that the allocator and the
//! resolver never see a concrete backend. Implementations live in
//! `crate::infrastructure::persistence`.
//!
//! # Available Repositories
//!
//! - [`LinkRepository`] - Short link storage and click accounting
//!
//! # Testing
//!
//! Mock implementations are generated via `mockall` for unit tests. See
//! `tests/repository_*.rs` for backend tests.

pub mod link_repository;

pub use link_repository::LinkRepository;

#[cfg(test)]
pub use link_repository::MockLinkRepository;
