//! In-memory snapshot of category listings.
//!
//! Listings are loaded on first use and kept until invalidated, either by
//! hand or by a [`super::watch::ContentWatcher`]. Single-record lookups are
//! never cached.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::index::{ContentError, ContentIndex};
use super::record::ContentRecord;
use super::store::{ContentStore, FsStore};

/// Content index with cached listings
pub struct CachedIndex<S = FsStore> {
    index: ContentIndex<S>,
    state: RwLock<CacheState>,
}

/// Cached listings plus invalidation counters.
///
/// A scan only stores its result if no invalidation for its category
/// happened while it ran.
#[derive(Default)]
struct CacheState {
    listings: HashMap<String, Arc<Vec<ContentRecord>>>,
    generations: HashMap<String, u64>,
    epoch: u64,
}

impl CacheState {
    fn generation(&self, category: &str) -> (u64, u64) {
        (self.epoch, self.generations.get(category).copied().unwrap_or(0))
    }
}

impl<S: ContentStore> CachedIndex<S> {
    pub fn new(index: ContentIndex<S>) -> Self {
        Self {
            index,
            state: RwLock::new(CacheState::default()),
        }
    }

    /// The uncached index underneath
    pub fn inner(&self) -> &ContentIndex<S> {
        &self.index
    }

    /// Cached equivalent of [`ContentIndex::list_all`]
    pub async fn list_all(&self, category: &str) -> Arc<Vec<ContentRecord>> {
        let started = {
            let state = self.state.read().await;
            if let Some(listing) = state.listings.get(category) {
                return Arc::clone(listing);
            }
            state.generation(category)
        };

        let listing = Arc::new(self.index.list_all(category).await);

        let mut state = self.state.write().await;
        if state.generation(category) != started {
            tracing::debug!("Listing for '{}' changed during scan, not caching", category);
            return listing;
        }
        // Another task may have filled the slot while we were scanning
        let entry = state
            .listings
            .entry(category.to_string())
            .or_insert_with(|| Arc::clone(&listing));
        Arc::clone(entry)
    }

    /// Always reads through to the store
    pub async fn get_one(
        &self,
        category: &str,
        slug: &str,
    ) -> Result<Option<ContentRecord>, ContentError> {
        self.index.get_one(category, slug).await
    }

    /// Drop the cached listing for one category
    pub async fn invalidate(&self, category: &str) {
        let mut state = self.state.write().await;
        *state.generations.entry(category.to_string()).or_default() += 1;
        if state.listings.remove(category).is_some() {
            tracing::debug!("Invalidated cached listing for '{}'", category);
        }
    }

    /// Drop every cached listing
    pub async fn invalidate_all(&self) {
        let mut state = self.state.write().await;
        state.epoch += 1;
        state.listings.clear();
    }

    /// Whether a listing is currently cached
    pub async fn is_cached(&self, category: &str) -> bool {
        self.state.read().await.listings.contains_key(category)
    }
}
