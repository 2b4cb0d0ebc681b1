//! Discord command implementations organized by category.

#![allow(clippy::too_long_first_doc_paragraph)]

/// Catalog browsing and management commands
pub mod catalog;

/// General utility commands
pub mod general;

/// Purchase command
pub mod purchase;

/// Stock report command
pub mod report;

// Export commands
pub use catalog::*;
pub use general::*;
pub use purchase::*;
pub use report::*;
