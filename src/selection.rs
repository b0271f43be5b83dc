//! Selected-product state
//!
//! An ordered, id-unique set of catalog products. Every mutation is mirrored
//! to the injected key-value store so the selection survives restarts. The
//! in-memory set is the only writer; the mirror is best-effort and a mirror
//! failure never blocks a selection edit.

use crate::catalog::{Product, ProductSummary};
use crate::store::KeyValueStore;

/// Storage key the selection is persisted under
pub const STORAGE_KEY: &str = "selectedProducts";

/// Selections above this size tend to produce cut-off replies; callers
/// should confirm before generating a routine for one.
pub const LARGE_SELECTION_THRESHOLD: usize = 8;

/// The user's current set of chosen catalog items
pub struct SelectionStore<S: KeyValueStore> {
    store: S,
    items: Vec<Product>,
}

impl<S: KeyValueStore> SelectionStore<S> {
    /// Restore the selection from the store.
    ///
    /// A missing or unparsable blob yields an empty selection; parse
    /// failures are logged, never propagated.
    pub fn load(store: S) -> Self {
        let items = match store.get(STORAGE_KEY) {
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(items) => items,
                Err(e) => {
                    tracing::warn!(error = %e, "discarding unreadable saved selection");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };
        Self { store, items }
    }

    /// Add a product. Returns false (and changes nothing) when a product
    /// with the same id is already selected.
    pub fn add(&mut self, product: Product) -> bool {
        if self.items.iter().any(|p| p.id == product.id) {
            return false;
        }
        self.items.push(product);
        self.persist();
        true
    }

    /// Remove the product with the given id. Returns false when it was not
    /// selected.
    pub fn remove(&mut self, id: u32) -> bool {
        let before = self.items.len();
        self.items.retain(|p| p.id != id);
        let changed = self.items.len() != before;
        if changed {
            self.persist();
        }
        changed
    }

    /// Empty the set and erase the persisted copy.
    ///
    /// Destructive: callers obtain user confirmation first, and must reset
    /// the conversation engine afterwards (the generated routine no longer
    /// matches the selection).
    pub fn clear(&mut self) {
        self.items.clear();
        if let Err(e) = self.store.remove(STORAGE_KEY) {
            tracing::error!(error = %e, "failed to erase saved selection");
        }
    }

    /// Project the selection for request construction, in insertion order
    pub fn to_prompt_payload(&self) -> Vec<ProductSummary> {
        self.items.iter().map(ProductSummary::from).collect()
    }

    pub fn items(&self) -> &[Product] {
        &self.items
    }

    pub fn contains(&self, id: u32) -> bool {
        self.items.iter().any(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// True when the selection is large enough to risk a cut-off reply
    pub fn is_large(&self) -> bool {
        self.items.len() > LARGE_SELECTION_THRESHOLD
    }

    fn persist(&mut self) {
        match serde_json::to_string(&self.items) {
            Ok(raw) => {
                if let Err(e) = self.store.set(STORAGE_KEY, &raw) {
                    tracing::error!(error = %e, "failed to save selection");
                }
            }
            Err(e) => tracing::error!(error = %e, "failed to serialize selection"),
        }
    }
}
