//! Unified error type for the inventory.
//!
//! Remote-store failures are folded into the operation-level kinds
//! (`Fetch`, `Write`, `Delete`) by the catalog, so callers only have to
//! match on what the user was trying to do.

use std::fmt;
use thiserror::Error;

/// A single field that failed validation, named by its wire name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidField {
    /// Wire name of the field (e.g. `precio`)
    pub field: &'static str,
    /// Short human readable reason
    pub problem: &'static str,
}

impl fmt::Display for InvalidField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.problem)
    }
}

fn join_fields(fields: &[InvalidField]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    /// `config.toml` could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// One or more product fields are missing or invalid; nothing was written
    #[error("Invalid product: {}", join_fields(.fields))]
    Validation {
        /// Every invalid field, by wire name
        fields: Vec<InvalidField>,
    },

    /// Listing the collection failed, timed out, or returned a malformed document
    #[error("Failed to fetch products: {message}")]
    Fetch {
        /// Underlying cause
        message: String,
    },

    /// A create, update or stock write failed or timed out
    #[error("Failed to write product: {message}")]
    Write {
        /// Underlying cause
        message: String,
    },

    /// A delete failed or timed out
    #[error("Failed to delete product: {message}")]
    Delete {
        /// Underlying cause
        message: String,
    },

    /// Purchase attempted with zero stock
    #[error("'{name}' is out of stock")]
    NotAvailable {
        /// Product name
        name: String,
    },

    /// Another mutation of the same product is in flight
    #[error("Another change to product {id} is still in progress")]
    Busy {
        /// Product id
        id: String,
    },

    /// The remote stock no longer matches the stock a purchase was quoted at
    #[error("Stock of product {id} changed remotely (expected {expected}); reload and retry")]
    StockConflict {
        /// Product id
        id: String,
        /// Stock the purchase was quoted at
        expected: u32,
    },

    /// The id is not in the mirror
    #[error("Product not found: {id}")]
    ProductNotFound {
        /// Product id
        id: String,
    },

    /// The store has no document with this id
    #[error("Document {id} not found in collection '{collection}'")]
    DocumentNotFound {
        /// Collection searched
        collection: String,
        /// Document id
        id: String,
    },

    /// A stored document could not be read as a product
    #[error("Malformed document {id}: {message}")]
    Decode {
        /// Document id
        id: String,
        /// Decoder message
        message: String,
    },

    /// A value meant to become a document body did not serialize to a JSON object
    #[error("Cannot encode document body: {message}")]
    Encode {
        /// What was produced instead
        message: String,
    },

    /// Error from `SeaORM`
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Error from `serde_json`
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or invalid environment variable
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// Discord client or command framework error
    #[error("Serenity/Poise framework error: {0}")]
    Framework(Box<poise::serenity_prelude::Error>),
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::Framework(Box::new(value))
    }
}

impl Error {
    /// Whether this error is something the user can fix or retry, as opposed
    /// to an infrastructure failure worth logging at error level.
    #[must_use]
    pub const fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. }
                | Self::NotAvailable { .. }
                | Self::Busy { .. }
                | Self::StockConflict { .. }
                | Self::ProductNotFound { .. }
        )
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
