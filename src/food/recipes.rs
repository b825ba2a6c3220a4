use futures::stream::{self, StreamExt};
use log::{error, info, warn};
use std::sync::Arc;
use thiserror::Error;

use crate::food::api::{ApiError, RecipeApi, SpoonacularClient};
use crate::food::config::{FoodConfig, DEFAULT_DETAIL_CONCURRENCY};
use crate::food::ingredients::{Diet, IngredientQuery};
use crate::food::models::{RecipeDetail, RecipeSummary};
use crate::session::{Notices, Session};

/// Result cap for the find-by-ingredients request.
pub const SEARCH_LIMIT: u32 = 5;
/// Result cap for ingredient autocomplete.
pub const SUGGESTION_LIMIT: u32 = 5;

#[derive(Error, Debug)]
pub enum RecipeError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("Recipe detail mismatch: requested {requested}, received {received}")]
    IdMismatch { requested: i64, received: i64 },
}

/// Runs the lookup flow against a [`RecipeApi`]. Failures never escape:
/// they become notices and the affected items are left out.
#[derive(Clone)]
pub struct RecipeFinder {
    api: Arc<dyn RecipeApi>,
    detail_concurrency: usize,
}

impl RecipeFinder {
    pub fn new(api: Arc<dyn RecipeApi>) -> Self {
        Self {
            api,
            detail_concurrency: DEFAULT_DETAIL_CONCURRENCY,
        }
    }

    pub fn from_config(config: &FoodConfig) -> Result<Self, ApiError> {
        let client = SpoonacularClient::new(config)?;
        Ok(Self::new(Arc::new(client)).with_detail_concurrency(config.detail_concurrency))
    }

    pub fn with_detail_concurrency(mut self, limit: usize) -> Self {
        self.detail_concurrency = limit.max(1);
        self
    }

    pub async fn suggest(&self, notices: &mut Notices, partial: &str, limit: u32) -> Vec<String> {
        let partial = partial.trim();
        if partial.is_empty() {
            return Vec::new();
        }

        match self.api.autocomplete_ingredients(partial, limit).await {
            Ok(suggestions) => suggestions,
            Err(e) => {
                warn!("Ingredient autocomplete for '{}' failed: {}", partial, e);
                notices.warning("Error fetching ingredient suggestions.");
                Vec::new()
            }
        }
    }

    /// An empty result means either no matches or a failed request; the
    /// notice tells them apart for the user.
    pub async fn search(&self, notices: &mut Notices, query: &IngredientQuery) -> Vec<RecipeSummary> {
        match self.api.find_by_ingredients(query, SEARCH_LIMIT).await {
            Ok(summaries) => {
                info!(
                    "Found {} recipes for [{}] (diet: {})",
                    summaries.len(),
                    query.joined(),
                    query.diet()
                );
                summaries
            }
            Err(e) => {
                error!("Recipe search failed: {}", e);
                notices.error("Error fetching data from Spoonacular API. Please try again later.");
                Vec::new()
            }
        }
    }

    pub async fn try_fetch_detail(&self, summary: &RecipeSummary) -> Result<RecipeDetail, RecipeError> {
        let info = self.api.recipe_information(summary.id).await?;
        RecipeDetail::merge(summary, info)
    }

    pub async fn fetch_detail(
        &self,
        notices: &mut Notices,
        summary: &RecipeSummary,
    ) -> Option<RecipeDetail> {
        match self.try_fetch_detail(summary).await {
            Ok(detail) => Some(detail),
            Err(e) => {
                report_detail_failure(notices, summary.id, &e);
                None
            }
        }
    }

    /// Fetches details for every summary, at most `detail_concurrency` at a
    /// time. Output keeps input order; failed items are omitted.
    pub async fn fetch_details(
        &self,
        notices: &mut Notices,
        summaries: &[RecipeSummary],
    ) -> Vec<RecipeDetail> {
        let results: Vec<(i64, Result<RecipeDetail, RecipeError>)> = stream::iter(summaries.to_vec())
            .map(|summary| async move {
                let result = self.try_fetch_detail(&summary).await;
                (summary.id, result)
            })
            .buffered(self.detail_concurrency)
            .collect()
            .await;

        let mut details = Vec::with_capacity(results.len());
        for (id, result) in results {
            match result {
                Ok(detail) => details.push(detail),
                Err(e) => report_detail_failure(notices, id, &e),
            }
        }
        details
    }

    /// Full lookup for one submission: normalize, search, hydrate. The
    /// hydrated batch replaces the session's current results.
    pub async fn find_recipes(&self, session: &mut Session, raw_ingredients: &str) -> Vec<RecipeDetail> {
        let diet = session.diet;
        let details = self.find(&mut session.notices, raw_ingredients, diet).await;
        session.results = details.clone();
        details
    }

    pub async fn find(&self, notices: &mut Notices, raw_ingredients: &str, diet: Diet) -> Vec<RecipeDetail> {
        let Some(query) = IngredientQuery::new(raw_ingredients, diet) else {
            notices.info("Please enter ingredients to get recipe suggestions.");
            return Vec::new();
        };

        let summaries = self.search(notices, &query).await;
        if summaries.is_empty() {
            notices.info("No recipes found for the given ingredients.");
            return Vec::new();
        }

        self.fetch_details(notices, &summaries).await
    }
}

fn report_detail_failure(notices: &mut Notices, id: i64, e: &RecipeError) {
    error!("Detail fetch for recipe {} failed: {}", id, e);
    notices.error(format!("Failed to fetch detailed information for recipe ID {}.", id));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::food::api::RecipeInformation;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Canned API: five summaries, with details failing for `failing` ids.
    struct FakeApi {
        failing: HashSet<i64>,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        queries: Mutex<Vec<String>>,
    }

    impl FakeApi {
        fn new(failing: &[i64]) -> Self {
            Self {
                failing: failing.iter().copied().collect(),
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
                queries: Mutex::new(Vec::new()),
            }
        }
    }

    fn status_error() -> ApiError {
        ApiError::Status {
            endpoint: "/test".to_string(),
            status: reqwest::StatusCode::NOT_FOUND,
        }
    }

    #[async_trait]
    impl RecipeApi for FakeApi {
        async fn autocomplete_ingredients(&self, partial: &str, _limit: u32) -> Result<Vec<String>, ApiError> {
            if partial == "fail" {
                return Err(status_error());
            }
            Ok(vec![format!("{} sauce", partial)])
        }

        async fn find_by_ingredients(
            &self,
            query: &IngredientQuery,
            limit: u32,
        ) -> Result<Vec<RecipeSummary>, ApiError> {
            self.queries.lock().push(format!("{}|{}", query.joined(), query.diet().as_query_value()));
            Ok((1..=limit as i64)
                .map(|id| RecipeSummary {
                    id,
                    title: format!("Recipe {}", id),
                    image: None,
                })
                .collect())
        }

        async fn recipe_information(&self, id: i64) -> Result<RecipeInformation, ApiError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.failing.contains(&id) {
                return Err(status_error());
            }
            Ok(serde_json::from_value(serde_json::json!({ "id": id, "title": format!("Recipe {}", id) }))
                .unwrap())
        }
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_siblings_in_order() {
        let api = Arc::new(FakeApi::new(&[3]));
        let finder = RecipeFinder::new(api.clone());
        let mut session = Session::new();

        let details = finder.find_recipes(&mut session, "chicken, rice").await;

        let ids: Vec<i64> = details.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![1, 2, 4, 5]);
        assert_eq!(session.results.len(), 4);
        assert!(session
            .notices
            .iter()
            .any(|n| n.message == "Failed to fetch detailed information for recipe ID 3."));
        assert_eq!(api.queries.lock().as_slice(), ["chicken,rice|"]);
    }

    #[tokio::test]
    async fn test_detail_fan_out_is_bounded() {
        let api = Arc::new(FakeApi::new(&[]));
        let finder = RecipeFinder::new(api.clone()).with_detail_concurrency(2);
        let mut notices = Notices::default();

        let details = finder.find(&mut notices, "egg", Diet::Vegan).await;

        assert_eq!(details.len(), 5);
        let peak = api.peak.load(Ordering::SeqCst);
        assert!(peak <= 2 && peak >= 1, "peak concurrency was {}", peak);
        assert_eq!(api.queries.lock().as_slice(), ["egg|vegan"]);
    }

    #[tokio::test]
    async fn test_fetch_details_runs_on_spawned_task() {
        let finder = RecipeFinder::new(Arc::new(FakeApi::new(&[2])));
        let summaries: Vec<RecipeSummary> = (1..=3)
            .map(|id| RecipeSummary {
                id,
                title: format!("Recipe {}", id),
                image: None,
            })
            .collect();

        let handle = tokio::spawn(async move {
            let mut notices = Notices::default();
            let details = finder.fetch_details(&mut notices, &summaries).await;
            (details, notices)
        });
        let (details, notices) = handle.await.unwrap();

        assert_eq!(details.iter().map(|d| d.id).collect::<Vec<_>>(), vec![1, 3]);
        assert!(notices.has_errors());
    }

    #[tokio::test]
    async fn test_empty_input_makes_no_request() {
        let api = Arc::new(FakeApi::new(&[]));
        let finder = RecipeFinder::new(api.clone());
        let mut notices = Notices::default();

        assert!(finder.find(&mut notices, " , ", Diet::None).await.is_empty());
        assert!(api.queries.lock().is_empty());
        assert_eq!(notices.len(), 1);
    }

    #[tokio::test]
    async fn test_suggest_failure_is_a_warning() {
        let finder = RecipeFinder::new(Arc::new(FakeApi::new(&[])));
        let mut notices = Notices::default();

        assert_eq!(finder.suggest(&mut notices, "soy", SUGGESTION_LIMIT).await, vec!["soy sauce"]);
        assert!(finder.suggest(&mut notices, "fail", SUGGESTION_LIMIT).await.is_empty());
        assert!(finder.suggest(&mut notices, "   ", SUGGESTION_LIMIT).await.is_empty());
        assert_eq!(notices.len(), 1);
    }
}
