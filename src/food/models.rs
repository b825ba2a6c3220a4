use serde::{Deserialize, Serialize};

use crate::food::api::spoonacular::RecipeInformation;
use crate::food::recipes::RecipeError;

pub const SHARE_BASE_URL: &str = "https://www.spoonacular.com/recipes";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeSummary {
    pub id: i64,
    pub title: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Nutrient {
    pub name: String,
    pub amount: Option<f64>,
    pub unit: String,
}

/// A fully hydrated recipe: the search summary merged with the
/// information endpoint's payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeDetail {
    pub id: i64,
    pub title: String,
    pub image: Option<String>,
    pub ready_in_minutes: Option<u32>,
    pub servings: Option<u32>,
    #[serde(default)]
    pub ingredients: Vec<String>,
    pub instructions: Option<String>,
    pub nutrition: Option<Vec<Nutrient>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
}

impl RecipeDetail {
    /// Merges a detail payload onto the summary it was requested for.
    /// The payload must describe the same recipe.
    pub fn merge(summary: &RecipeSummary, info: RecipeInformation) -> Result<Self, RecipeError> {
        if info.id != summary.id {
            return Err(RecipeError::IdMismatch {
                requested: summary.id,
                received: info.id,
            });
        }

        let title = info
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| summary.title.clone());

        let ingredients = info
            .extended_ingredients
            .unwrap_or_default()
            .into_iter()
            .filter_map(|ingredient| ingredient.description())
            .collect();

        let nutrition = info.nutrition.and_then(|n| n.nutrients).map(|nutrients| {
            nutrients
                .into_iter()
                .map(|entry| Nutrient {
                    name: entry
                        .title
                        .or(entry.name)
                        .unwrap_or_else(|| "Unknown Nutrient".to_string()),
                    amount: entry.amount,
                    unit: entry.unit.unwrap_or_default(),
                })
                .collect()
        });

        Ok(Self {
            id: summary.id,
            title,
            image: info.image.or_else(|| summary.image.clone()),
            ready_in_minutes: info.ready_in_minutes,
            servings: info.servings,
            ingredients,
            instructions: info.instructions.filter(|i| !i.trim().is_empty()),
            nutrition,
            source_url: info.source_url,
        })
    }

    pub fn share_link(&self) -> String {
        share_link(self.id, &self.title)
    }

    pub fn instructions_html(&self) -> Option<String> {
        self.instructions.as_deref().map(instructions_html)
    }
}

/// Cosmetic vendor link; the slug is not checked against the vendor's scheme.
pub fn share_link(id: i64, title: &str) -> String {
    format!("{}/{}/{}", SHARE_BASE_URL, id, title.replace(' ', "-"))
}

pub fn instructions_html(instructions: &str) -> String {
    instructions.replace("\r\n", "\n").replace('\n', "<br>")
}
