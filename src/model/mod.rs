//! Domain model types (pure).
//!
//! All types in this module are plain data owned by the upstream data
//! source; the engine treats them as read-only input.

pub mod error;
pub mod log_row;

// Re-export for convenience
pub use error::{AppError, InputError};
pub use log_row::{CoreApp, DedupStrategy, LogRow, SortOrder, UnknownVariant};
