use serde::Deserialize;
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

use crate::food::config::FoodConfig;

pub const API_KEY_ENV: &str = "SPOONACULAR_API_KEY";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read credentials file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse credentials file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{0} environment variable not set")]
    MissingEnv(&'static str),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Where the Spoonacular API key comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialsSource {
    /// A local JSON file holding `spoonacular_api_key`.
    File(PathBuf),
    /// A secret injected into the process environment.
    ManagedSecret,
}

#[derive(Debug, Deserialize)]
struct CredentialsFile {
    spoonacular_api_key: String,
}

impl CredentialsSource {
    pub fn spoonacular_api_key(&self) -> Result<String, ConfigError> {
        let key = match self {
            CredentialsSource::File(path) => read_credentials_file(path)?.spoonacular_api_key,
            CredentialsSource::ManagedSecret => {
                env::var(API_KEY_ENV).map_err(|_| ConfigError::MissingEnv(API_KEY_ENV))?
            }
        };

        let key = key.trim().to_string();
        if key.is_empty() {
            return Err(ConfigError::Invalid("Spoonacular API key is empty".to_string()));
        }
        Ok(key)
    }
}

fn read_credentials_file(path: &Path) -> Result<CredentialsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialsKind {
    File,
    Managed,
}

impl FromStr for CredentialsKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "file" => Ok(CredentialsKind::File),
            "managed" | "managed-secret" | "env" => Ok(CredentialsKind::Managed),
            other => Err(format!("Unknown credentials source: {} (expected file or managed)", other)),
        }
    }
}

impl fmt::Display for CredentialsKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialsKind::File => write!(f, "file"),
            CredentialsKind::Managed => write!(f, "managed"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub credentials: CredentialsSource,
    pub database_path: PathBuf,
}

impl AppConfig {
    pub fn new(kind: CredentialsKind, credentials_file: PathBuf, database_path: PathBuf) -> Self {
        let credentials = match kind {
            CredentialsKind::File => CredentialsSource::File(credentials_file),
            CredentialsKind::Managed => CredentialsSource::ManagedSecret,
        };
        Self {
            credentials,
            database_path,
        }
    }

    pub fn food(&self) -> Result<FoodConfig, ConfigError> {
        FoodConfig::from_source(&self.credentials)
    }
}
