//! Shared types for the data-transfer client.

mod error;

pub use error::Error;

/// Result type for data-transfer operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;
