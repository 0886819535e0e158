//! Application layer services implementing business logic.
//!
//! Services consume the [`crate::domain::repositories::LinkRepository`]
//! contract and expose the two core operations to HTTP handlers and the
//! admin CLI.
//!
//! # Available Services
//!
//! - [`services::link_service::LinkService`] - Short code allocation (the allocator)
//! - [`services::redirect_service::RedirectService`] - Redirect resolution and click accounting

pub mod services;
