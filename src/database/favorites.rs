use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

use super::database::DatabaseError;
use crate::food::models::RecipeDetail;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Database(#[from] DatabaseError),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Per-user favorites, one document per uid.
///
/// `append` has array-union semantics: the snapshot is added unless the
/// document already holds a structurally equal one (same JSON value,
/// key order irrelevant). Snapshots of the same recipe that differ in any
/// field, such as refreshed nutrition data, are kept side by side.
#[async_trait]
pub trait FavoritesStore: Send + Sync {
    /// Returns `true` when the snapshot was added, `false` when an equal
    /// one was already stored.
    async fn append(&self, uid: &str, recipe: &RecipeDetail) -> Result<bool, StoreError>;

    /// A user without a document has no favorites; that is not an error.
    async fn list(&self, uid: &str) -> Result<Vec<RecipeDetail>, StoreError>;
}

/// Stored shape of a favorites document.
#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct FavoritesDocument {
    #[serde(default)]
    pub favorites: Vec<Value>,
}

pub(crate) fn array_union(items: &mut Vec<Value>, element: Value) -> bool {
    if items.contains(&element) {
        false
    } else {
        items.push(element);
        true
    }
}

pub(crate) fn decode_favorites(items: Vec<Value>) -> Result<Vec<RecipeDetail>, serde_json::Error> {
    items.into_iter().map(serde_json::from_value).collect()
}

#[derive(Default)]
pub struct MemoryFavoritesStore {
    documents: Mutex<HashMap<String, FavoritesDocument>>,
}

impl MemoryFavoritesStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FavoritesStore for MemoryFavoritesStore {
    async fn append(&self, uid: &str, recipe: &RecipeDetail) -> Result<bool, StoreError> {
        let element = serde_json::to_value(recipe)?;
        let mut documents = self.documents.lock();
        let document = documents.entry(uid.to_string()).or_default();
        Ok(array_union(&mut document.favorites, element))
    }

    async fn list(&self, uid: &str) -> Result<Vec<RecipeDetail>, StoreError> {
        let items = self
            .documents
            .lock()
            .get(uid)
            .map(|doc| doc.favorites.clone())
            .unwrap_or_default();
        Ok(decode_favorites(items)?)
    }
}
