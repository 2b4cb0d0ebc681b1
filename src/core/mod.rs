//! Core business logic - framework-agnostic catalog, search, stock and reporting.
//!
//! Nothing in here knows about Discord; the bot layer only calls into these modules
//! and formats what they return.

/// Shared in-memory mirror of the remote product collection
pub mod catalog;
/// Case-insensitive search over catalog snapshots
pub mod filter;
/// Product model and wire format
pub mod product;
/// Stock chart and low-stock reporting
pub mod report;
/// Guarded stock decrements (purchases)
pub mod stock;

pub use catalog::{Catalog, Registered, Snapshot};
pub use product::{Category, Field, NewProduct, Product, ProductPatch};
pub use stock::{PurchaseQuote, Purchased, StockMutator};
