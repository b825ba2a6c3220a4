pub mod spoonacular;

use async_trait::async_trait;
use thiserror::Error;

use crate::food::ingredients::IngredientQuery;
use crate::food::models::RecipeSummary;

// Re-export common types
pub use spoonacular::{RecipeInformation, SpoonacularClient};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Failed to send request: {0}")]
    Request(#[from] reqwest::Error),
    #[error("API request to {endpoint} failed with status: {status}")]
    Status {
        endpoint: String,
        status: reqwest::StatusCode,
    },
    #[error("Failed to parse response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
}

/// The three recipe endpoints the finder depends on.
#[async_trait]
pub trait RecipeApi: Send + Sync {
    async fn autocomplete_ingredients(
        &self,
        partial: &str,
        limit: u32,
    ) -> Result<Vec<String>, ApiError>;

    async fn find_by_ingredients(
        &self,
        query: &IngredientQuery,
        limit: u32,
    ) -> Result<Vec<RecipeSummary>, ApiError>;

    async fn recipe_information(&self, id: i64) -> Result<RecipeInformation, ApiError>;
}
