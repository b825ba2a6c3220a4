pub mod api;
pub mod config;
pub mod ingredients;
pub mod models;
pub mod recipes;
pub mod render;

pub use ingredients::{normalize, Diet, IngredientQuery};
pub use models::{Nutrient, RecipeDetail, RecipeSummary};
pub use recipes::{RecipeError, RecipeFinder};
