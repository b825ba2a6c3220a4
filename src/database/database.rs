use async_trait::async_trait;
use chrono::Utc;
use log::info;
use rusqlite::OptionalExtension;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tokio_rusqlite::Connection;
use uuid::Uuid;

use super::favorites::{array_union, decode_favorites, FavoritesDocument, FavoritesStore, StoreError};
use super::identity::{normalize_email, Credentials, IdentityError, IdentityProvider};
use crate::food::models::RecipeDetail;
use crate::session::UserSession;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] tokio_rusqlite::Error),
    #[error("Database connection error: {0}")]
    Connection(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// SQLite stand-in for the hosted identity service and document store.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Connection>,
    password_cost: u32,
}

impl Database {
    pub async fn new<P: AsRef<Path>>(path: P) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path.as_ref().to_path_buf())
            .await
            .map_err(|e| DatabaseError::Connection(e.to_string()))?;

        Self::with_connection(conn).await
    }

    pub async fn open_in_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| DatabaseError::Connection(e.to_string()))?;

        Self::with_connection(conn).await
    }

    async fn with_connection(conn: Connection) -> Result<Self, DatabaseError> {
        let db = Self {
            conn: Arc::new(conn),
            password_cost: bcrypt::DEFAULT_COST,
        };
        db.initialize().await?;
        Ok(db)
    }

    /// Lower costs are only meant for tests.
    pub fn with_password_cost(mut self, cost: u32) -> Self {
        self.password_cost = cost;
        self
    }

    async fn initialize(&self) -> Result<(), DatabaseError> {
        // Create tables if they don't exist
        self.conn
            .call(|conn| {
                conn.execute_batch(
                    "CREATE TABLE IF NOT EXISTS users (
                        uid TEXT PRIMARY KEY,
                        email TEXT UNIQUE NOT NULL,
                        password_hash TEXT NOT NULL,
                        created_at TEXT NOT NULL
                    );
                    CREATE TABLE IF NOT EXISTS favorites (
                        uid TEXT PRIMARY KEY,
                        document TEXT NOT NULL,
                        updated_at TEXT NOT NULL
                    );",
                )?;
                Ok(())
            })
            .await?;

        info!("Database initialized successfully");
        Ok(())
    }

    async fn find_user(&self, email: String) -> Result<Option<(String, String, String)>, DatabaseError> {
        let row = self
            .conn
            .call(move |conn| {
                let row: Option<(String, String, String)> = conn
                    .query_row(
                        "SELECT uid, email, password_hash FROM users WHERE email = ?1",
                        [&email],
                        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
                    )
                    .optional()?;
                Ok(row)
            })
            .await?;

        Ok(row)
    }
}

#[async_trait]
impl IdentityProvider for Database {
    async fn create_user(&self, email: &str, password: &str) -> Result<UserSession, IdentityError> {
        let credentials = Credentials::new(email, password);
        credentials.check()?;

        let cost = self.password_cost;
        let password = credentials.password.clone();
        let password_hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| IdentityError::Task(e.to_string()))??;

        let user = UserSession {
            email: credentials.email,
            uid: Uuid::new_v4().to_string(),
        };
        let (uid, email) = (user.uid.clone(), user.email.clone());
        let created_at = Utc::now().to_rfc3339();

        let inserted = self
            .conn
            .call(move |conn| {
                let tx = conn.unchecked_transaction()?;
                let exists = tx
                    .query_row("SELECT 1 FROM users WHERE email = ?1", [&email], |_| Ok(()))
                    .optional()?
                    .is_some();
                if exists {
                    return Ok(false);
                }
                tx.execute(
                    "INSERT INTO users (uid, email, password_hash, created_at) VALUES (?1, ?2, ?3, ?4)",
                    [&uid, &email, &password_hash, &created_at],
                )?;
                tx.commit()?;
                Ok(true)
            })
            .await
            .map_err(DatabaseError::from)?;

        if !inserted {
            return Err(IdentityError::DuplicateEmail(user.email));
        }
        Ok(user)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<UserSession, IdentityError> {
        let email = normalize_email(email);
        match self.find_user(email.clone()).await? {
            Some((uid, email, _)) => Ok(UserSession { email, uid }),
            None => Err(IdentityError::UserNotFound(email)),
        }
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<UserSession, IdentityError> {
        let Some((uid, email, hash)) = self.find_user(normalize_email(email)).await? else {
            return Err(IdentityError::InvalidCredentials);
        };

        let password = password.to_string();
        let verified = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash).unwrap_or(false))
            .await
            .map_err(|e| IdentityError::Task(e.to_string()))?;

        if verified {
            Ok(UserSession { email, uid })
        } else {
            Err(IdentityError::InvalidCredentials)
        }
    }
}

#[async_trait]
impl FavoritesStore for Database {
    async fn append(&self, uid: &str, recipe: &RecipeDetail) -> Result<bool, StoreError> {
        let element = serde_json::to_value(recipe)?;
        let uid = uid.to_string();
        let updated_at = Utc::now().to_rfc3339();

        // Read, union and write back inside one transaction.
        let added = self
            .conn
            .call(move |conn| {
                let tx = conn.unchecked_transaction()?;
                let existing: Option<String> = tx
                    .query_row("SELECT document FROM favorites WHERE uid = ?1", [&uid], |row| row.get(0))
                    .optional()?;

                let mut document = match existing {
                    Some(text) => serde_json::from_str::<FavoritesDocument>(&text).map_err(json_to_sql)?,
                    None => FavoritesDocument::default(),
                };

                if !array_union(&mut document.favorites, element) {
                    return Ok(false);
                }

                let text = serde_json::to_string(&document).map_err(json_to_sql)?;
                tx.execute(
                    "INSERT INTO favorites (uid, document, updated_at) VALUES (?1, ?2, ?3)
                     ON CONFLICT(uid) DO UPDATE SET document = excluded.document, updated_at = excluded.updated_at",
                    [&uid, &text, &updated_at],
                )?;
                tx.commit()?;
                Ok(true)
            })
            .await
            .map_err(DatabaseError::from)?;

        Ok(added)
    }

    async fn list(&self, uid: &str) -> Result<Vec<RecipeDetail>, StoreError> {
        let uid = uid.to_string();
        let existing: Option<String> = self
            .conn
            .call(move |conn| {
                let document = conn
                    .query_row("SELECT document FROM favorites WHERE uid = ?1", [&uid], |row| row.get(0))
                    .optional()?;
                Ok(document)
            })
            .await
            .map_err(DatabaseError::from)?;

        let Some(text) = existing else {
            return Ok(Vec::new());
        };
        let document: FavoritesDocument = serde_json::from_str(&text)?;
        Ok(decode_favorites(document.favorites)?)
    }
}

fn json_to_sql(e: serde_json::Error) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn db() -> Database {
        Database::open_in_memory().await.unwrap().with_password_cost(4)
    }

    fn recipe(id: i64, calories: f64) -> RecipeDetail {
        RecipeDetail {
            id,
            title: "Chicken and Rice".to_string(),
            image: Some("https://img.spoonacular.com/recipes/1.jpg".to_string()),
            ready_in_minutes: Some(45),
            servings: Some(4),
            ingredients: vec!["1 lb chicken".to_string(), "1 cup rice".to_string()],
            instructions: Some("Brown chicken.\nAdd rice.".to_string()),
            nutrition: Some(vec![crate::food::models::Nutrient {
                name: "Calories".to_string(),
                amount: Some(calories),
                unit: "kcal".to_string(),
            }]),
            source_url: None,
        }
    }

    #[tokio::test]
    async fn test_signup_then_lookup() {
        let db = db().await;
        let created = db.create_user("Cook@Example.com", "secret123").await.unwrap();
        assert_eq!(created.email, "cook@example.com");

        let found = db.get_user_by_email("cook@example.com").await.unwrap();
        assert_eq!(found, created);
        assert!(matches!(
            db.get_user_by_email("other@example.com").await,
            Err(IdentityError::UserNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_duplicate_signup_is_rejected() {
        let db = db().await;
        db.create_user("cook@example.com", "secret123").await.unwrap();
        assert!(matches!(
            db.create_user("COOK@example.com", "another1").await,
            Err(IdentityError::DuplicateEmail(_))
        ));
    }

    #[tokio::test]
    async fn test_authenticate_checks_password() {
        let db = db().await;
        let user = db.create_user("cook@example.com", "secret123").await.unwrap();

        assert_eq!(db.authenticate("cook@example.com", "secret123").await.unwrap(), user);
        assert!(matches!(
            db.authenticate("cook@example.com", "nope").await,
            Err(IdentityError::InvalidCredentials)
        ));
        assert!(matches!(
            db.authenticate("ghost@example.com", "secret123").await,
            Err(IdentityError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_favorites_union() {
        let db = db().await;
        assert!(db.list("u1").await.unwrap().is_empty());

        assert!(db.append("u1", &recipe(1, 500.0)).await.unwrap());
        assert!(!db.append("u1", &recipe(1, 500.0)).await.unwrap());
        assert!(db.append("u1", &recipe(1, 510.0)).await.unwrap());

        let favorites = db.list("u1").await.unwrap();
        assert_eq!(favorites, vec![recipe(1, 500.0), recipe(1, 510.0)]);
        assert!(db.list("u2").await.unwrap().is_empty());
    }
}
