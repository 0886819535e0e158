//! Input helpers shared by the allocator and the resolver.
//!
//! - [`code_generator`] - Short code generation and validation
//! - [`url_validator`] - Target URL validation

pub mod code_generator;
pub mod url_validator;
