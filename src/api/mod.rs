use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use log::{error, info, warn};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use validator::Validate;

use crate::database::{Accounts, Credentials, IdentityError};
use crate::food::ingredients::Diet;
use crate::food::models::RecipeDetail;
use crate::food::recipes::{RecipeFinder, SUGGESTION_LIMIT};
use crate::session::{Notices, UserSession};

const MAX_IN_FLIGHT_REQUESTS: usize = 64;

#[derive(Clone)]
pub struct AppState {
    finder: RecipeFinder,
    accounts: Option<Accounts>,
    /// Bearer tokens issued by signup/login, keyed to the signed-in user.
    sessions: Arc<RwLock<HashMap<String, UserSession>>>,
}

impl AppState {
    pub fn new(finder: RecipeFinder, accounts: Option<Accounts>) -> Self {
        Self {
            finder,
            accounts,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    fn issue_token(&self, user: &UserSession) -> String {
        let token = uuid::Uuid::new_v4().to_string();
        self.sessions.write().insert(token.clone(), user.clone());
        token
    }

    fn session_for(&self, token: &str) -> Option<UserSession> {
        self.sessions.read().get(token).cloned()
    }
}

#[derive(Debug, Deserialize)]
pub struct SuggestParams {
    query: String,
    number: Option<u32>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SearchRequest {
    #[validate(length(min = 1, max = 1000))]
    ingredients: String,
    #[serde(default)]
    diet: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SaveFavoriteRequest {
    recipe: RecipeDetail,
}

/// A recipe as served to clients, with the derived presentation fields.
#[derive(Debug, Serialize)]
pub struct RecipeView {
    #[serde(flatten)]
    recipe: RecipeDetail,
    share_link: String,
    instructions_html: Option<String>,
}

impl From<RecipeDetail> for RecipeView {
    fn from(recipe: RecipeDetail) -> Self {
        Self {
            share_link: recipe.share_link(),
            instructions_html: recipe.instructions_html(),
            recipe,
        }
    }
}

#[derive(Serialize)]
pub struct SuggestResponse {
    suggestions: Vec<String>,
    notices: Notices,
}

#[derive(Serialize)]
pub struct RecipesResponse {
    recipes: Vec<RecipeView>,
    notices: Notices,
}

#[derive(Serialize)]
pub struct UserResponse {
    user: UserSession,
    token: String,
}

#[derive(Serialize)]
pub struct FavoritesResponse {
    favorites: Vec<RecipeView>,
}

#[derive(Serialize)]
pub struct SaveResponse {
    added: bool,
}

#[derive(Serialize)]
struct ApiResponse {
    status: String,
}

fn status_response(code: StatusCode, status: impl Into<String>) -> Response {
    (code, Json(ApiResponse { status: status.into() })).into_response()
}

/// Create and configure the API router
pub fn create_api(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(3600));

    Router::new()
        .route("/health", get(health_check))
        .route("/ingredients/suggest", get(suggest_handler))
        .route("/recipes/search", post(search_handler))
        .route("/auth/signup", post(signup_handler))
        .route("/auth/login", post(login_handler))
        .route("/favorites/:uid", get(list_favorites_handler).post(save_favorite_handler))
        .layer(ConcurrencyLimitLayer::new(MAX_IN_FLIGHT_REQUESTS))
        .layer(cors)
        .with_state(state)
}

async fn health_check() -> Response {
    Json(ApiResponse {
        status: "Server is running and healthy".to_string(),
    })
    .into_response()
}

async fn suggest_handler(State(state): State<AppState>, Query(params): Query<SuggestParams>) -> Response {
    let mut notices = Notices::default();
    let limit = params.number.unwrap_or(SUGGESTION_LIMIT).clamp(1, 25);
    let suggestions = state.finder.suggest(&mut notices, &params.query, limit).await;

    Json(SuggestResponse { suggestions, notices }).into_response()
}

async fn search_handler(State(state): State<AppState>, Json(request): Json<SearchRequest>) -> Response {
    if let Err(e) = request.validate() {
        return status_response(StatusCode::BAD_REQUEST, format!("Invalid request: {}", e));
    }

    let diet: Diet = match request.diet.as_deref().unwrap_or_default().parse() {
        Ok(diet) => diet,
        Err(e) => return status_response(StatusCode::BAD_REQUEST, e.to_string()),
    };

    let mut notices = Notices::default();
    let recipes = state.finder.find(&mut notices, &request.ingredients, diet).await;
    info!("Search for '{}' returned {} recipes", request.ingredients, recipes.len());

    Json(RecipesResponse {
        recipes: recipes.into_iter().map(RecipeView::from).collect(),
        notices,
    })
    .into_response()
}

fn accounts_or_unavailable(state: &AppState) -> Result<&Accounts, Response> {
    state.accounts.as_ref().ok_or_else(|| {
        status_response(StatusCode::SERVICE_UNAVAILABLE, "Accounts are unavailable")
    })
}

fn identity_error_response(e: IdentityError) -> Response {
    let code = match &e {
        IdentityError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        IdentityError::DuplicateEmail(_) => StatusCode::CONFLICT,
        IdentityError::UserNotFound(_) | IdentityError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        _ => {
            error!("Identity service error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    status_response(code, e.to_string())
}

async fn signup_handler(State(state): State<AppState>, Json(request): Json<Credentials>) -> Response {
    let accounts = match accounts_or_unavailable(&state) {
        Ok(accounts) => accounts,
        Err(response) => return response,
    };

    match accounts.identity.create_user(&request.email, &request.password).await {
        Ok(user) => {
            let token = state.issue_token(&user);
            (StatusCode::CREATED, Json(UserResponse { user, token })).into_response()
        }
        Err(e) => identity_error_response(e),
    }
}

async fn login_handler(State(state): State<AppState>, Json(request): Json<Credentials>) -> Response {
    let accounts = match accounts_or_unavailable(&state) {
        Ok(accounts) => accounts,
        Err(response) => return response,
    };

    match accounts.identity.authenticate(&request.email, &request.password).await {
        Ok(user) => {
            let token = state.issue_token(&user);
            Json(UserResponse { user, token }).into_response()
        }
        Err(e) => identity_error_response(e),
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// The caller must hold a token for `uid`, and the account behind it must
/// still exist.
async fn authorize(state: &AppState, accounts: &Accounts, headers: &HeaderMap, uid: &str) -> Result<(), Response> {
    let unauthorized = || status_response(StatusCode::UNAUTHORIZED, "Log in to access favorites");

    let user = bearer_token(headers)
        .and_then(|token| state.session_for(token))
        .ok_or_else(unauthorized)?;
    if user.uid != uid {
        warn!("User {} attempted to access favorites of {}", user.uid, uid);
        return Err(unauthorized());
    }

    match accounts.identity.get_user_by_email(&user.email).await {
        Ok(found) if found.uid == uid => Ok(()),
        Ok(_) | Err(IdentityError::UserNotFound(_)) => Err(unauthorized()),
        Err(e) => Err(identity_error_response(e)),
    }
}

async fn list_favorites_handler(
    State(state): State<AppState>,
    Path(uid): Path<String>,
    headers: HeaderMap,
) -> Response {
    let accounts = match accounts_or_unavailable(&state) {
        Ok(accounts) => accounts,
        Err(response) => return response,
    };
    if let Err(response) = authorize(&state, accounts, &headers, &uid).await {
        return response;
    }

    match accounts.favorites.list(&uid).await {
        Ok(favorites) => Json(FavoritesResponse {
            favorites: favorites.into_iter().map(RecipeView::from).collect(),
        })
        .into_response(),
        Err(e) => {
            error!("Loading favorites for {} failed: {}", uid, e);
            status_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to load favorites")
        }
    }
}

async fn save_favorite_handler(
    State(state): State<AppState>,
    Path(uid): Path<String>,
    headers: HeaderMap,
    Json(request): Json<SaveFavoriteRequest>,
) -> Response {
    let accounts = match accounts_or_unavailable(&state) {
        Ok(accounts) => accounts,
        Err(response) => return response,
    };
    if let Err(response) = authorize(&state, accounts, &headers, &uid).await {
        return response;
    }

    match accounts.favorites.append(&uid, &request.recipe).await {
        Ok(added) => Json(SaveResponse { added }).into_response(),
        Err(e) => {
            error!("Saving recipe {} for {} failed: {}", request.recipe.id, uid, e);
            status_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to save favorite")
        }
    }
}
