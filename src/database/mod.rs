pub mod database;
pub mod favorites;
pub mod identity;

use std::sync::Arc;

pub use database::Database;
pub use database::DatabaseError;
pub use favorites::{FavoritesStore, MemoryFavoritesStore, StoreError};
pub use identity::{Credentials, IdentityError, IdentityProvider};

/// Identity service and favorites store, shared by every session.
#[derive(Clone)]
pub struct Accounts {
    pub identity: Arc<dyn IdentityProvider>,
    pub favorites: Arc<dyn FavoritesStore>,
}

impl Accounts {
    pub fn new(identity: Arc<dyn IdentityProvider>, favorites: Arc<dyn FavoritesStore>) -> Self {
        Self { identity, favorites }
    }

    pub fn from_database(db: Database) -> Self {
        let db = Arc::new(db);
        Self::new(db.clone(), db)
    }
}
