/**
 * Server Configuration
 *
 * Loads the server settings from an optional TOML file and environment
 * variables, and opens the optional PostgreSQL pool.
 *
 * # Configuration Sources
 *
 * 1. Defaults (`ServerConfig::default()`)
 * 2. The TOML file named by `COLLAB_CONFIG`, if set
 * 3. Environment overrides: `SERVER_PORT`, `JWT_SECRET`, `DATABASE_URL`,
 *    `CLIENT_URL`, `COLLAB_TYPING_TIMEOUT_SECS`, `COLLAB_MAX_MESSAGE_LEN`
 *
 * # Example file
 *
 * ```toml
 * port = 3001
 *
 * [collab]
 * typing_timeout_secs = 8
 *
 * [[workspaces]]
 * id = "design"
 * members = [{ user = "6f1c2b8e-3d4a-4f1b-9c2d-0a1b2c3d4e5f", role = "owner" }]
 * ```
 *
 * # Error Handling
 *
 * Leaving `DATABASE_URL` unset runs the server on the in-memory ledger and
 * membership oracle. A configured database that cannot be reached or
 * migrated is a startup error.
 */

use serde::Deserialize;
use sqlx::PgPool;
use std::path::Path;
use thiserror::Error;
use uuid::Uuid;

use crate::backend::workspace::WorkspaceRole;
use crate::shared::{CollabSettings, ConfigError, WorkspaceId};

pub const DEFAULT_PORT: u16 = 3001;

/// Used only when `JWT_SECRET` is absent; a warning is logged at startup
const DEV_JWT_SECRET: &str = "collab-dev-secret-change-me";

/// A workspace and its members, applied to the membership store at startup
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorkspaceSeed {
    pub id: WorkspaceId,
    #[serde(default)]
    pub members: Vec<MemberSeed>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct MemberSeed {
    pub user: Uuid,
    #[serde(default = "default_role")]
    pub role: WorkspaceRole,
}

fn default_role() -> WorkspaceRole {
    WorkspaceRole::Member
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub jwt_secret: String,
    pub database_url: Option<String>,
    /// Allowed CORS origin; any origin when unset
    pub client_url: Option<String>,
    pub collab: CollabSettings,
    pub workspaces: Vec<WorkspaceSeed>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            database_url: None,
            client_url: None,
            collab: CollabSettings::default(),
            workspaces: Vec::new(),
        }
    }
}

/// On-disk shape; every key is optional
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    port: Option<u16>,
    jwt_secret: Option<String>,
    database_url: Option<String>,
    client_url: Option<String>,
    collab: CollabSettings,
    workspaces: Vec<WorkspaceSeed>,
}

impl ServerConfig {
    /// Load from `COLLAB_CONFIG` (if set) and the process environment
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var("COLLAB_CONFIG") {
            Ok(path) if !path.trim().is_empty() => Self::from_file(path.trim())?,
            _ => Self::default(),
        };

        if std::env::var("JWT_SECRET").is_err() {
            tracing::warn!("[Server] JWT_SECRET not set, using the development secret");
        }

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        tracing::info!("[Server] Loaded configuration from {}", path.display());
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let file: FileConfig = toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        let defaults = Self::default();

        let config = Self {
            port: file.port.unwrap_or(defaults.port),
            jwt_secret: file.jwt_secret.unwrap_or(defaults.jwt_secret),
            database_url: file.database_url.filter(|url| !url.trim().is_empty()),
            client_url: file.client_url.filter(|url| !url.trim().is_empty()),
            collab: file.collab,
            workspaces: file.workspaces,
        };
        config.validate()?;
        Ok(config)
    }

    /// Apply environment-style overrides from `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("SERVER_PORT") {
            self.port = port.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "SERVER_PORT",
                message: format!("'{port}' is not a valid port"),
            })?;
        }
        if let Some(secret) = lookup("JWT_SECRET") {
            self.jwt_secret = secret;
        }
        if let Some(url) = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()) {
            self.database_url = Some(url);
        }
        if let Some(url) = lookup("CLIENT_URL").filter(|url| !url.trim().is_empty()) {
            self.client_url = Some(url);
        }
        if let Some(secs) = lookup("COLLAB_TYPING_TIMEOUT_SECS") {
            self.collab.typing_timeout_secs =
                secs.trim().parse().map_err(|_| ConfigError::InvalidValue {
                    key: "COLLAB_TYPING_TIMEOUT_SECS",
                    message: format!("'{secs}' is not a number of seconds"),
                })?;
        }
        if let Some(len) = lookup("COLLAB_MAX_MESSAGE_LEN") {
            self.collab.max_message_len =
                len.trim().parse().map_err(|_| ConfigError::InvalidValue {
                    key: "COLLAB_MAX_MESSAGE_LEN",
                    message: format!("'{len}' is not a length"),
                })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.is_empty() {
            return Err(ConfigError::MissingValue("JWT_SECRET"));
        }
        if let Some(seed) = self.workspaces.iter().find(|seed| seed.id.is_blank()) {
            return Err(ConfigError::InvalidValue {
                key: "workspaces",
                message: format!("workspace id '{}' is blank", seed.id),
            });
        }
        self.collab.validate()
    }
}

/// Startup failures of a configured database
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("failed to connect to database: {0}")]
    Connect(#[from] sqlx::Error),
    #[error("failed to run database migrations: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

/// Connect to PostgreSQL and run the embedded migrations
///
/// `Ok(None)` when no URL is configured; the server then runs on the
/// in-memory stores.
pub async fn load_database(database_url: Option<&str>) -> Result<Option<PgPool>, DatabaseError> {
    let Some(database_url) = database_url else {
        tracing::warn!("[Server] DATABASE_URL not set. Using in-memory storage.");
        return Ok(None);
    };

    tracing::info!("[Server] Connecting to database...");
    let pool = PgPool::connect(database_url).await.map_err(|e| {
        tracing::error!("[Server] Failed to create database connection pool: {:?}", e);
        e
    })?;

    tracing::info!("[Server] Running database migrations...");
    sqlx::migrate!().run(&pool).await.map_err(|e| {
        tracing::error!("[Server] Failed to run database migrations: {}", e);
        e
    })?;
    tracing::info!("[Server] Database migrations completed successfully");

    Ok(Some(pool))
}
