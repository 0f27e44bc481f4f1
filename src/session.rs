//! Persisted client state: the logged-in `user` blob and the token pair,
//! kept in a small SQLite key/value table.

use chrono::Utc;
use serde_json::Value;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use tracing::info;

use crate::client::TokenPair;
use crate::error::AppError;

pub const USER_KEY: &str = "user";
pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoredSession {
    pub user: Option<Value>,
    pub tokens: TokenPair,
}

impl StoredSession {
    pub fn is_authenticated(&self) -> bool {
        self.tokens.access.is_some()
    }
}

#[derive(Clone)]
pub struct SessionStore {
    db: SqlitePool,
}

impl SessionStore {
    pub async fn connect(database_url: &str) -> Result<Self, AppError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(database_url)
            .await?;
        Self::from_pool(pool).await
    }

    pub async fn from_pool(db: SqlitePool) -> Result<Self, AppError> {
        sqlx::migrate!("./migrations").run(&db).await?;
        Ok(Self { db })
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        let value = sqlx::query_scalar::<_, String>("SELECT value FROM local_storage WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.db)
            .await?;
        Ok(value)
    }

    pub async fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO local_storage (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.db)
        .await?;
        Ok(())
    }

    pub async fn remove(&self, key: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM local_storage WHERE key = ?1")
            .bind(key)
            .execute(&self.db)
            .await?;
        Ok(())
    }

    pub async fn load(&self) -> Result<StoredSession, AppError> {
        let user = match self.get(USER_KEY).await? {
            Some(raw) => Some(serde_json::from_str(&raw)?),
            None => None,
        };
        Ok(StoredSession {
            user,
            tokens: TokenPair {
                access: self.get(ACCESS_TOKEN_KEY).await?,
                refresh: self.get(REFRESH_TOKEN_KEY).await?,
            },
        })
    }

    pub async fn save(&self, session: &StoredSession) -> Result<(), AppError> {
        match &session.user {
            Some(user) => self.set(USER_KEY, &user.to_string()).await?,
            None => self.remove(USER_KEY).await?,
        }
        match &session.tokens.access {
            Some(token) => self.set(ACCESS_TOKEN_KEY, token).await?,
            None => self.remove(ACCESS_TOKEN_KEY).await?,
        }
        match &session.tokens.refresh {
            Some(token) => self.set(REFRESH_TOKEN_KEY, token).await?,
            None => self.remove(REFRESH_TOKEN_KEY).await?,
        }
        info!("Session saved");
        Ok(())
    }

    pub async fn clear(&self) -> Result<(), AppError> {
        for key in [USER_KEY, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY] {
            self.remove(key).await?;
        }
        info!("Session cleared");
        Ok(())
    }
}
