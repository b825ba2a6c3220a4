use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{ApiError, RecipeApi};
use crate::food::config::FoodConfig;
use crate::food::ingredients::IngredientQuery;
use crate::food::models::RecipeSummary;

#[derive(Debug, Deserialize)]
struct SearchHit {
    id: i64,
    title: String,
    image: Option<String>,
}

impl From<SearchHit> for RecipeSummary {
    fn from(hit: SearchHit) -> Self {
        Self {
            id: hit.id,
            title: hit.title,
            image: hit.image,
        }
    }
}

#[derive(Debug, Deserialize)]
struct AutocompleteHit {
    name: String,
}

/// Payload of `/recipes/{id}/information`. Every field past `id` may be
/// missing from the response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeInformation {
    pub id: i64,
    pub title: Option<String>,
    pub image: Option<String>,
    pub ready_in_minutes: Option<u32>,
    pub servings: Option<u32>,
    pub source_url: Option<String>,
    pub extended_ingredients: Option<Vec<ExtendedIngredient>>,
    pub instructions: Option<String>,
    pub nutrition: Option<NutritionInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtendedIngredient {
    pub original: Option<String>,
    pub name: Option<String>,
}

impl ExtendedIngredient {
    /// Prefers the original recipe line, falling back to the bare name.
    pub fn description(self) -> Option<String> {
        self.original
            .filter(|o| !o.trim().is_empty())
            .or(self.name.filter(|n| !n.trim().is_empty()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NutritionInfo {
    pub nutrients: Option<Vec<NutrientEntry>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NutrientEntry {
    pub title: Option<String>,
    pub name: Option<String>,
    pub amount: Option<f64>,
    pub unit: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SpoonacularClient {
    api_key: String,
    base_url: String,
    client: Client,
}

impl SpoonacularClient {
    pub fn new(config: &FoodConfig) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            api_key: config.spoonacular_api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!("GET {} {:?}", url, params);

        let response = self
            .client
            .get(&url)
            .query(params)
            .query(&[("apiKey", self.api_key.as_str())])
            .send()
            .await?;

        let response = check_status(endpoint, response)?;

        response.json::<T>().await.map_err(|source| ApiError::Decode {
            endpoint: endpoint.to_string(),
            source,
        })
    }
}

fn check_status(endpoint: &str, response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if !status.is_success() {
        warn!("{} returned status {}", endpoint, status);
        return Err(ApiError::Status {
            endpoint: endpoint.to_string(),
            status,
        });
    }
    Ok(response)
}

#[async_trait]
impl RecipeApi for SpoonacularClient {
    async fn autocomplete_ingredients(
        &self,
        partial: &str,
        limit: u32,
    ) -> Result<Vec<String>, ApiError> {
        let hits: Vec<AutocompleteHit> = self
            .get_json(
                "/food/ingredients/autocomplete",
                &[("query", partial.to_string()), ("number", limit.to_string())],
            )
            .await?;

        Ok(hits.into_iter().map(|hit| hit.name).collect())
    }

    async fn find_by_ingredients(
        &self,
        query: &IngredientQuery,
        limit: u32,
    ) -> Result<Vec<RecipeSummary>, ApiError> {
        let hits: Vec<SearchHit> = self
            .get_json(
                "/recipes/findByIngredients",
                &[
                    ("ingredients", query.joined()),
                    ("diet", query.diet().as_query_value().to_string()),
                    ("number", limit.to_string()),
                ],
            )
            .await?;

        Ok(hits.into_iter().map(RecipeSummary::from).collect())
    }

    async fn recipe_information(&self, id: i64) -> Result<RecipeInformation, ApiError> {
        self.get_json(
            &format!("/recipes/{}/information", id),
            &[("includeNutrition", "true".to_string())],
        )
        .await
    }
}
