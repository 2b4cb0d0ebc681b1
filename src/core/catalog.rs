//! Catalog store - the single in-memory mirror of the remote product collection.
//!
//! Every screen (here: every bot command) reads from one shared [`Catalog`] instead of
//! fetching its own copy. The mirror only changes in two ways: a full [`Catalog::reload`]
//! that replaces it wholesale, or a local update/removal applied *after* the matching
//! remote write has succeeded. A failed remote call never touches the mirror.
//!
//! The mirror lives in a `tokio::sync::watch` channel, so all mutations are serialized
//! through its sender and consumers can [`Catalog::subscribe`] to be told when it changes.

use crate::{
    config::CatalogSettings,
    core::product::{NewProduct, Product, ProductPatch},
    errors::{Error, Result},
    store::{Document, DocumentStore},
};
use std::{
    collections::HashSet,
    future::Future,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};
use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};

/// Immutable view of the mirror at one point in time.
pub type Snapshot = Arc<Vec<Product>>;

/// Result of [`Catalog::register`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registered {
    /// Id assigned by the store
    pub id: String,
    /// Whether the mirror was reloaded afterwards
    pub refreshed: bool,
}

/// Shared catalog of products backed by a remote [`DocumentStore`].
pub struct Catalog<S> {
    store: S,
    settings: CatalogSettings,
    mirror: watch::Sender<Snapshot>,
    in_flight: Mutex<HashSet<String>>,
}

/// Marks a product id as having a remote mutation in progress; released on drop.
#[derive(Debug)]
pub struct MutationGuard<'a> {
    in_flight: &'a Mutex<HashSet<String>>,
    id: String,
}

impl Drop for MutationGuard<'_> {
    fn drop(&mut self) {
        lock(self.in_flight).remove(&self.id);
    }
}

fn lock(in_flight: &Mutex<HashSet<String>>) -> MutexGuard<'_, HashSet<String>> {
    // The set stays consistent even if a holder panicked.
    in_flight.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<S: DocumentStore> Catalog<S> {
    /// Creates an empty catalog. Call [`Catalog::reload`] to populate it.
    pub fn new(store: S, settings: CatalogSettings) -> Self {
        let (mirror, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            store,
            settings,
            mirror,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// The settings this catalog was built with.
    pub const fn settings(&self) -> &CatalogSettings {
        &self.settings
    }

    /// The remote store behind the mirror.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Current contents of the mirror.
    pub fn snapshot(&self) -> Snapshot {
        Arc::clone(&self.mirror.borrow())
    }

    /// Receiver that is notified every time the mirror changes.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.mirror.subscribe()
    }

    /// Mirrored product with the given id.
    pub fn get(&self, id: &str) -> Option<Product> {
        self.mirror.borrow().iter().find(|p| p.id == id).cloned()
    }

    /// First mirrored product whose name equals `name`, ignoring case.
    pub fn find_by_name(&self, name: &str) -> Option<Product> {
        let wanted = name.trim().to_lowercase();
        self.mirror
            .borrow()
            .iter()
            .find(|p| p.name.to_lowercase() == wanted)
            .cloned()
    }

    /// Replaces the whole mirror with what the remote collection holds now.
    ///
    /// A failed fetch is retried with exponential backoff up to
    /// `fetch_retries` extra times. Decoding is not retried: a malformed
    /// document fails the same way on every attempt. Returns the number of
    /// products loaded.
    ///
    /// # Errors
    /// Returns [`Error::Fetch`] when every attempt failed or a document could
    /// not be decoded. The previous mirror is kept in that case.
    #[instrument(skip(self), fields(collection = %self.settings.collection))]
    pub async fn reload(&self) -> Result<usize> {
        let documents = self.fetch_documents().await?;

        let products = documents
            .into_iter()
            .map(Product::from_document)
            .collect::<Result<Vec<_>>>()
            .map_err(|e| {
                error!("Decoding products failed: {e}");
                Error::Fetch {
                    message: e.to_string(),
                }
            })?;

        let count = products.len();
        self.mirror.send_replace(Arc::new(products));
        info!(count, "Catalog reloaded");
        Ok(count)
    }

    async fn fetch_documents(&self) -> Result<Vec<Document>> {
        let mut attempt = 0;
        loop {
            let fetched = self
                .remote(self.store.list_all(&self.settings.collection), |message| {
                    Error::Fetch { message }
                })
                .await;
            match fetched {
                Ok(documents) => return Ok(documents),
                Err(e) if attempt < self.settings.fetch_retries => {
                    attempt += 1;
                    let delay = self.settings.backoff(attempt);
                    warn!(attempt, ?delay, "Fetching products failed, retrying: {e}");
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    error!("Fetching products failed: {e}");
                    return Err(e);
                }
            }
        }
    }

    /// Merges `patch` into the mirrored record with this id. Does not touch
    /// the remote store. Returns whether a record was found.
    pub fn apply_local_update(&self, id: &str, patch: &ProductPatch) -> bool {
        self.mirror.send_if_modified(|products| {
            let Some(index) = products.iter().position(|p| p.id == id) else {
                debug!(%id, "Local update for a product that is not mirrored");
                return false;
            };
            patch.apply_to(&mut Arc::make_mut(products)[index]);
            true
        })
    }

    /// Drops the mirrored record with this id. Does not touch the remote
    /// store. Returns whether a record was found.
    pub fn apply_local_removal(&self, id: &str) -> bool {
        self.mirror.send_if_modified(|products| {
            let Some(index) = products.iter().position(|p| p.id == id) else {
                return false;
            };
            Arc::make_mut(products).remove(index);
            true
        })
    }

    /// Registers a new product remotely and returns its id.
    ///
    /// The mirror is not updated; reload, or build the record locally with
    /// [`NewProduct::into_product`].
    ///
    /// # Errors
    /// - [`Error::Validation`] before any remote call if a field is invalid
    /// - [`Error::Write`] if the remote create fails
    #[instrument(skip(self, product), fields(name = %product.name))]
    pub async fn create(&self, product: &NewProduct) -> Result<String> {
        product.validate()?;
        let fields = product.to_fields()?;

        let id = self
            .remote(
                self.store.create(&self.settings.collection, fields),
                |message| Error::Write { message },
            )
            .await?;

        info!(%id, "Product created");
        Ok(id)
    }

    /// Creates the product, then reloads so it appears in the mirror with the
    /// id the store assigned. The product is saved even if the reload fails;
    /// that case comes back as `refreshed: false`.
    ///
    /// # Errors
    /// Same as [`Catalog::create`]. Reload failures are not errors here.
    pub async fn register(&self, product: &NewProduct) -> Result<Registered> {
        let id = self.create(product).await?;
        let refreshed = match self.reload().await {
            Ok(_) => true,
            Err(e) => {
                warn!(%id, "Product saved but the catalog was not reloaded: {e}");
                false
            }
        };
        Ok(Registered { id, refreshed })
    }

    /// Writes the fields set in `patch` remotely, then mirrors them locally.
    /// Unset fields are left untouched on both sides. An empty patch is a no-op.
    ///
    /// # Errors
    /// - [`Error::Validation`] if a present field is invalid
    /// - [`Error::Busy`] if another change to this product is in flight
    /// - [`Error::Write`] if the remote update fails; the mirror is unchanged
    #[instrument(skip(self, patch))]
    pub async fn update(&self, id: &str, patch: &ProductPatch) -> Result<()> {
        patch.validate()?;
        if patch.is_empty() {
            debug!("Empty patch, nothing to write");
            return Ok(());
        }

        let _guard = self.begin_mutation(id)?;
        let fields = patch.to_fields()?;
        self.remote(
            self.store.update(&self.settings.collection, id, fields),
            |message| Error::Write { message },
        )
        .await?;

        self.apply_local_update(id, patch);
        info!("Product updated");
        Ok(())
    }

    /// Deletes the product remotely, then removes it from the mirror.
    ///
    /// # Errors
    /// - [`Error::Busy`] if another change to this product is in flight
    /// - [`Error::Delete`] if the remote delete fails; the mirror is unchanged
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<()> {
        let _guard = self.begin_mutation(id)?;
        self.remote(
            self.store.delete(&self.settings.collection, id),
            |message| Error::Delete { message },
        )
        .await?;

        self.apply_local_removal(id);
        info!("Product deleted");
        Ok(())
    }

    /// Claims `id` for a remote mutation.
    ///
    /// # Errors
    /// Returns [`Error::Busy`] if the id is already claimed.
    pub fn begin_mutation(&self, id: &str) -> Result<MutationGuard<'_>> {
        if !lock(&self.in_flight).insert(id.to_string()) {
            warn!(%id, "Rejected concurrent mutation");
            return Err(Error::Busy { id: id.to_string() });
        }
        Ok(MutationGuard {
            in_flight: &self.in_flight,
            id: id.to_string(),
        })
    }

    /// Runs a remote call under the configured timeout, folding any failure
    /// into the error kind built by `kind`.
    pub(crate) async fn remote<T>(
        &self,
        call: impl Future<Output = Result<T>>,
        kind: fn(String) -> Error,
    ) -> Result<T> {
        let timeout = self.settings.remote_timeout();
        match tokio::time::timeout(timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(kind(e.to_string())),
            Err(_) => Err(kind(format!("timed out after {timeout:?}"))),
        }
    }
}
