pub mod api;
pub mod commands;
pub mod config;
pub mod database;
pub mod food;
pub mod session;

// Re-export commonly used items
pub use database::{Accounts, Database, FavoritesStore, IdentityProvider, MemoryFavoritesStore};
pub use food::{Diet, IngredientQuery, RecipeDetail, RecipeFinder, RecipeSummary};
pub use session::{Notice, NoticeLevel, Notices, Session, UserSession};
