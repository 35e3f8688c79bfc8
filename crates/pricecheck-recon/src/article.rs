//! The configurator seam: catalog search, article insertion and the live
//! article handle the walk mutates.

use async_trait::async_trait;
use pricecheck_core::{ArticleData, Choice, CoreError, FamilyHint, ItemProperties};
use thiserror::Error;
use tokio::sync::{Mutex, MutexGuard};

#[derive(Debug, Error)]
pub enum ArticleError {
    #[error("property {key} is not present on the article")]
    PropertyMissing { key: String },

    #[error("value {value:?} is not a valid choice for {key}")]
    InvalidChoice { key: String, value: String },

    #[error("catalog item {name} is not an article")]
    NotAnArticle { name: String },

    #[error("article snapshot is incomplete: {0}")]
    Snapshot(#[from] CoreError),

    #[error("article provider error: {0}")]
    Provider(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Article,
    Folder,
}

/// One search hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogItem {
    /// Article number as known to the catalog.
    pub name: String,
    pub label: String,
    pub kind: ItemKind,
    pub score: u32,
    pub family: Option<FamilyHint>,
}

/// A property as currently exposed by the article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigProperty {
    pub key: String,
    pub value: String,
}

/// A live, mutable configured article.
///
/// The property set depends on the current values, so callers re-read
/// [`ArticleHandle::properties`] after every [`ArticleHandle::set_value`].
#[async_trait]
pub trait ArticleHandle: Send + Sync {
    async fn properties(&self) -> Result<Vec<ConfigProperty>, ArticleError>;

    async fn choices(&self, key: &str) -> Result<Vec<Choice>, ArticleError>;

    async fn set_value(&mut self, key: &str, value: &str) -> Result<(), ArticleError>;

    async fn article_data(&self) -> Result<ArticleData, ArticleError>;

    async fn item_properties(&self) -> Result<ItemProperties, ArticleError>;
}

#[async_trait]
pub trait Catalog: Send + Sync {
    /// Up to `max_hits` items matching `query`, best first.
    async fn search(&self, query: &str, max_hits: usize)
        -> Result<Vec<CatalogItem>, ArticleError>;

    /// Inserts `item` into the scene and returns its handle.
    async fn insert(&self, item: &CatalogItem) -> Result<Box<dyn ArticleHandle>, ArticleError>;
}

/// Exclusive access to one inserted article.
///
/// Every set/read/emit sequence for the article runs under the guard returned
/// by [`ArticleSession::lock`], so no second combination can start configuring
/// the article while another one is still being priced.
pub struct ArticleSession {
    item: CatalogItem,
    handle: Mutex<Box<dyn ArticleHandle>>,
}

impl ArticleSession {
    #[must_use]
    pub fn new(item: CatalogItem, handle: Box<dyn ArticleHandle>) -> Self {
        Self {
            item,
            handle: Mutex::new(handle),
        }
    }

    #[must_use]
    pub fn item(&self) -> &CatalogItem {
        &self.item
    }

    pub async fn lock(&self) -> MutexGuard<'_, Box<dyn ArticleHandle>> {
        self.handle.lock().await
    }
}
