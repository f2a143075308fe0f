//! Application layer: services and use cases
//!
//! This layer orchestrates the taxonomy engine and depends on I/O boundary traits.

pub mod error;
pub mod error_ext;
pub mod services;

pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::IoResultExt;
