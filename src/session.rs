use log::{error, info};
use serde::Serialize;

use crate::database::{FavoritesStore, IdentityProvider};
use crate::food::ingredients::Diet;
use crate::food::models::RecipeDetail;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A message meant for the user, as opposed to the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Notices(Vec<Notice>);

impl Notices {
    pub fn push(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.0.push(Notice {
            level,
            message: message.into(),
        });
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(NoticeLevel::Info, message);
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(NoticeLevel::Success, message);
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(NoticeLevel::Warning, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(NoticeLevel::Error, message);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notice> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.0.iter().any(|n| n.level == NoticeLevel::Error)
    }

    pub fn take(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.0)
    }
}

/// An authenticated identity. Lives only as long as the session holding it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSession {
    pub email: String,
    pub uid: String,
}

/// Per-user interaction state, handed explicitly to every handler.
#[derive(Debug, Default)]
pub struct Session {
    pub user: Option<UserSession>,
    pub show_favorites: bool,
    pub diet: Diet,
    pub results: Vec<RecipeDetail>,
    pub notices: Notices,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    /// On failure the current user, if any, stays logged in.
    pub async fn login(&mut self, identity: &dyn IdentityProvider, email: &str, password: &str) -> bool {
        match identity.authenticate(email, password).await {
            Ok(user) => {
                info!("User {} logged in", user.uid);
                self.notices.success(format!("Welcome, {}", user.email));
                self.user = Some(user);
                true
            }
            Err(e) => {
                error!("Login failed for {}: {}", email, e);
                self.notices.error(format!("Login failed: {}", e));
                false
            }
        }
    }

    pub async fn signup(&mut self, identity: &dyn IdentityProvider, email: &str, password: &str) -> bool {
        match identity.create_user(email, password).await {
            Ok(user) => {
                info!("Created user {}", user.uid);
                self.notices
                    .success(format!("Account created successfully! Welcome, {}", user.email));
                self.user = Some(user);
                true
            }
            Err(e) => {
                error!("Signup failed for {}: {}", email, e);
                self.notices.error(format!("Signup failed: {}", e));
                false
            }
        }
    }

    pub fn logout(&mut self) {
        if self.user.take().is_some() {
            self.show_favorites = false;
            self.notices.success("Logged out successfully");
        }
    }

    /// Saves the result at `index` (zero-based) to the user's favorites.
    pub async fn save_favorite(&mut self, store: &dyn FavoritesStore, index: usize) -> bool {
        let Some(user) = self.user.clone() else {
            self.notices.warning("Log in to save favorites.");
            return false;
        };
        let Some(recipe) = self.results.get(index).cloned() else {
            self.notices
                .warning(format!("No recipe #{} in the current results.", index + 1));
            return false;
        };

        match store.append(&user.uid, &recipe).await {
            Ok(_) => {
                self.notices
                    .success(format!("Saved {} to favorites!", recipe.title));
                true
            }
            Err(e) => {
                error!("Saving recipe {} for {} failed: {}", recipe.id, user.uid, e);
                self.notices
                    .error(format!("Failed to save {} to favorites.", recipe.title));
                false
            }
        }
    }

    /// Turns on the favorites view and returns the stored recipes.
    pub async fn favorites(&mut self, store: &dyn FavoritesStore) -> Vec<RecipeDetail> {
        let Some(user) = self.user.clone() else {
            self.notices.warning("Log in to view favorites.");
            return Vec::new();
        };
        self.show_favorites = true;

        match store.list(&user.uid).await {
            Ok(favorites) => {
                if favorites.is_empty() {
                    self.notices.info("You have no favorite recipes.");
                }
                favorites
            }
            Err(e) => {
                error!("Loading favorites for {} failed: {}", user.uid, e);
                self.notices.error("Failed to load favorites.");
                Vec::new()
            }
        }
    }
}
