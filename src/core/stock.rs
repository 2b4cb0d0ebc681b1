//! Stock mutator - selling one unit of a product.
//!
//! A purchase is two-phase: [`StockMutator::prepare`] reads the mirror and returns a
//! [`PurchaseQuote`] to show the user, and [`StockMutator::confirm`] performs the write
//! once the user agrees. The quote's stock doubles as a concurrency token: the remote
//! write is a compare-and-set from `quote.stock` to `quote.stock - 1`, so two buyers
//! working from the same stale count cannot both succeed.

use crate::{
    core::{
        catalog::Catalog,
        product::{ProductPatch, wire},
    },
    errors::{Error, Result},
    store::DocumentStore,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// What the user is asked to confirm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseQuote {
    /// Product id
    pub id: String,
    /// Product name, for display
    pub name: String,
    /// Stock when the quote was prepared
    pub stock: u32,
}

/// A completed sale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Purchased {
    /// Product id
    pub id: String,
    /// Product name
    pub name: String,
    /// Stock after the sale, as written remotely and mirrored locally
    pub stock: u32,
}

/// Applies guarded stock decrements through a shared catalog.
pub struct StockMutator<S> {
    catalog: Arc<Catalog<S>>,
}

impl<S: DocumentStore> StockMutator<S> {
    /// Creates a mutator working on `catalog`.
    pub const fn new(catalog: Arc<Catalog<S>>) -> Self {
        Self { catalog }
    }

    /// The catalog this mutator writes through.
    pub const fn catalog(&self) -> &Arc<Catalog<S>> {
        &self.catalog
    }

    /// Reads the current stock from the mirror.
    ///
    /// # Errors
    /// - [`Error::ProductNotFound`] if the id is not mirrored
    /// - [`Error::NotAvailable`] if the stock is zero; nothing is written
    pub fn prepare(&self, id: &str) -> Result<PurchaseQuote> {
        let product = self
            .catalog
            .get(id)
            .ok_or_else(|| Error::ProductNotFound { id: id.to_string() })?;

        if !product.in_stock() {
            info!(%id, "Purchase refused, out of stock");
            return Err(Error::NotAvailable { name: product.name });
        }

        Ok(PurchaseQuote {
            id: product.id,
            name: product.name,
            stock: product.stock,
        })
    }

    /// Sells one unit against the stock captured in `quote`.
    ///
    /// # Errors
    /// - [`Error::NotAvailable`] if the quote has no stock
    /// - [`Error::Busy`] if another change to this product is in flight
    /// - [`Error::StockConflict`] if the remote stock no longer matches the quote
    /// - [`Error::Write`] if the remote write fails
    ///
    /// The mirror is only touched on success.
    #[instrument(skip(self, quote), fields(id = %quote.id, stock = quote.stock))]
    pub async fn confirm(&self, quote: &PurchaseQuote) -> Result<Purchased> {
        let Some(new_stock) = quote.stock.checked_sub(1) else {
            return Err(Error::NotAvailable {
                name: quote.name.clone(),
            });
        };

        let _guard = self.catalog.begin_mutation(&quote.id)?;
        let settings = self.catalog.settings();
        let swapped = self
            .catalog
            .remote(
                self.catalog.store().compare_and_set(
                    &settings.collection,
                    &quote.id,
                    wire::STOCK,
                    json!(quote.stock),
                    json!(new_stock),
                ),
                |message| Error::Write { message },
            )
            .await?;

        if !swapped {
            warn!("Remote stock changed since the quote was prepared");
            return Err(Error::StockConflict {
                id: quote.id.clone(),
                expected: quote.stock,
            });
        }

        self.catalog
            .apply_local_update(&quote.id, &ProductPatch::stock(new_stock));
        info!(new_stock, "Purchase recorded");

        Ok(Purchased {
            id: quote.id.clone(),
            name: quote.name.clone(),
            stock: new_stock,
        })
    }

    /// Prepares, asks `decide` for confirmation, and confirms if it agrees.
    /// Returns `None` when the purchase was declined.
    ///
    /// # Errors
    /// Any error from [`StockMutator::prepare`] or [`StockMutator::confirm`].
    pub async fn purchase<F>(&self, id: &str, decide: F) -> Result<Option<Purchased>>
    where
        F: FnOnce(&PurchaseQuote) -> bool + Send,
    {
        let quote = self.prepare(id)?;
        if !decide(&quote) {
            info!(%id, "Purchase declined");
            return Ok(None);
        }
        self.confirm(&quote).await.map(Some)
    }
}
