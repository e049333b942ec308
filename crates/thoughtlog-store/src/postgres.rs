//! PostgreSQL journal store
//!
//! Users, thoughts and revoked tokens each get a table. Reasons stay
//! embedded in their thought as a JSONB array, so they are never
//! addressable outside it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::types::Json;
use sqlx::FromRow;
use thoughtlog_core::{
    JournalStore, NewReason, NewThought, NewUser, Reason, StoreError, StoreResult, Thought,
    ThoughtUpdate, User,
};
use uuid::Uuid;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        admin BOOLEAN NOT NULL DEFAULT FALSE,
        date_created TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS thoughts (
        id UUID PRIMARY KEY,
        user_id UUID NOT NULL,
        feeling TEXT NOT NULL,
        cause TEXT NOT NULL,
        justified BOOLEAN NOT NULL DEFAULT FALSE,
        reasons JSONB NOT NULL DEFAULT '[]'::jsonb,
        date_created TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_thoughts_user_id ON thoughts (user_id)",
    r#"
    CREATE TABLE IF NOT EXISTS revoked_tokens (
        token TEXT PRIMARY KEY,
        revoked_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
];

const USER_COLUMNS: &str = "id, name, email, password_hash, admin, date_created";
const THOUGHT_COLUMNS: &str = "id, user_id, feeling, cause, justified, reasons, date_created";

/// PostgreSQL store
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Open a connection pool
    pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| StoreError::Unavailable(format!("PostgreSQL connection failed: {e}")))?;

        Ok(Self { pool })
    }

    /// Create from an existing pool
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create tables and indexes if they do not exist
    pub async fn migrate(&self) -> StoreResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| StoreError::Database(format!("Schema init failed: {e}")))?;
        }
        Ok(())
    }
}

/// User row from database
#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    admin: bool,
    date_created: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            admin: row.admin,
            date_created: row.date_created,
        }
    }
}

/// Thought row from database
#[derive(Debug, FromRow)]
struct ThoughtRow {
    id: Uuid,
    user_id: Uuid,
    feeling: String,
    cause: String,
    justified: bool,
    reasons: Json<Vec<Reason>>,
    date_created: DateTime<Utc>,
}

impl From<ThoughtRow> for Thought {
    fn from(row: ThoughtRow) -> Self {
        Thought {
            id: row.id,
            feeling: row.feeling,
            cause: row.cause,
            justified: row.justified,
            reasons: row.reasons.0,
            user: row.user_id,
            date_created: row.date_created,
        }
    }
}

fn db_error(context: &str, err: sqlx::Error) -> StoreError {
    StoreError::Database(format!("{context}: {err}"))
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[async_trait]
impl JournalStore for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(())
    }

    fn name(&self) -> &str {
        "postgres"
    }

    async fn close(&self) {
        self.pool.close().await;
    }

    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let query = format!(
            "INSERT INTO users (id, name, email, password_hash) VALUES ($1, $2, $3, $4) RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(Uuid::new_v4())
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    StoreError::DuplicateEmail(user.email.clone())
                } else {
                    db_error("Failed to create user", e)
                }
            })?;

        Ok(row.into())
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to fetch user", e))?;

        Ok(row.map(Into::into))
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to fetch user", e))?;

        Ok(row.map(Into::into))
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users ORDER BY date_created, id");
        let rows = sqlx::query_as::<_, UserRow>(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("Failed to list users", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        let query = format!("DELETE FROM users WHERE id = $1 RETURNING {USER_COLUMNS}");
        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to delete user", e))?;

        Ok(row.map(Into::into))
    }

    async fn update_user_name(&self, id: Uuid, name: &str) -> StoreResult<Option<User>> {
        let query = format!("UPDATE users SET name = $2 WHERE id = $1 RETURNING {USER_COLUMNS}");
        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(id)
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to update name", e))?;

        Ok(row.map(Into::into))
    }

    async fn update_user_password(
        &self,
        id: Uuid,
        password_hash: &str,
    ) -> StoreResult<Option<User>> {
        let query =
            format!("UPDATE users SET password_hash = $2 WHERE id = $1 RETURNING {USER_COLUMNS}");
        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(id)
            .bind(password_hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to update password", e))?;

        Ok(row.map(Into::into))
    }

    async fn update_user_email(&self, id: Uuid, email: &str) -> StoreResult<Option<User>> {
        let query = format!("UPDATE users SET email = $2 WHERE id = $1 RETURNING {USER_COLUMNS}");
        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(id)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    StoreError::DuplicateEmail(email.to_string())
                } else {
                    db_error("Failed to update email", e)
                }
            })?;

        Ok(row.map(Into::into))
    }

    async fn set_user_admin(&self, id: Uuid, admin: bool) -> StoreResult<Option<User>> {
        let query = format!("UPDATE users SET admin = $2 WHERE id = $1 RETURNING {USER_COLUMNS}");
        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(id)
            .bind(admin)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to update admin flag", e))?;

        Ok(row.map(Into::into))
    }

    async fn create_thought(&self, thought: NewThought) -> StoreResult<Thought> {
        let query = format!(
            "INSERT INTO thoughts (id, user_id, feeling, cause, justified) VALUES ($1, $2, $3, $4, $5) RETURNING {THOUGHT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ThoughtRow>(&query)
            .bind(Uuid::new_v4())
            .bind(thought.user_id)
            .bind(&thought.feeling)
            .bind(&thought.cause)
            .bind(thought.justified)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| db_error("Failed to create thought", e))?;

        Ok(row.into())
    }

    async fn list_thoughts(&self, user_id: Uuid) -> StoreResult<Vec<Thought>> {
        let query = format!(
            "SELECT {THOUGHT_COLUMNS} FROM thoughts WHERE user_id = $1 ORDER BY date_created, id"
        );
        let rows = sqlx::query_as::<_, ThoughtRow>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("Failed to list thoughts", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_thought(&self, user_id: Uuid, thought_id: Uuid) -> StoreResult<Option<Thought>> {
        let query =
            format!("SELECT {THOUGHT_COLUMNS} FROM thoughts WHERE id = $1 AND user_id = $2");
        let row = sqlx::query_as::<_, ThoughtRow>(&query)
            .bind(thought_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to fetch thought", e))?;

        Ok(row.map(Into::into))
    }

    async fn update_thought(
        &self,
        user_id: Uuid,
        thought_id: Uuid,
        update: ThoughtUpdate,
    ) -> StoreResult<Option<Thought>> {
        let query = format!(
            r#"
            UPDATE thoughts
            SET feeling = $3, cause = $4, justified = COALESCE($5, justified)
            WHERE id = $1 AND user_id = $2
            RETURNING {THOUGHT_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, ThoughtRow>(&query)
            .bind(thought_id)
            .bind(user_id)
            .bind(&update.feeling)
            .bind(&update.cause)
            .bind(update.justified)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to update thought", e))?;

        Ok(row.map(Into::into))
    }

    async fn delete_thought(
        &self,
        user_id: Uuid,
        thought_id: Uuid,
    ) -> StoreResult<Option<Thought>> {
        let query = format!(
            "DELETE FROM thoughts WHERE id = $1 AND user_id = $2 RETURNING {THOUGHT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ThoughtRow>(&query)
            .bind(thought_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to delete thought", e))?;

        Ok(row.map(Into::into))
    }

    async fn delete_thoughts_for_user(&self, user_id: Uuid) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM thoughts WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to delete thoughts", e))?;

        Ok(result.rows_affected())
    }

    async fn add_reason(
        &self,
        user_id: Uuid,
        thought_id: Uuid,
        reason: NewReason,
    ) -> StoreResult<Option<Reason>> {
        let reason = Reason::new(reason);
        let result = sqlx::query(
            "UPDATE thoughts SET reasons = reasons || $3 WHERE id = $1 AND user_id = $2",
        )
        .bind(thought_id)
        .bind(user_id)
        .bind(Json(vec![reason.clone()]))
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to add reason", e))?;

        Ok((result.rows_affected() > 0).then_some(reason))
    }

    async fn remove_reason(
        &self,
        user_id: Uuid,
        thought_id: Uuid,
        reason_id: Uuid,
    ) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE thoughts
            SET reasons = COALESCE(
                (SELECT jsonb_agg(r) FROM jsonb_array_elements(reasons) AS r WHERE r->>'_id' <> $3),
                '[]'::jsonb
            )
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(thought_id)
        .bind(user_id)
        .bind(reason_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to remove reason", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn clear_reasons(&self, user_id: Uuid, thought_id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE thoughts SET reasons = '[]'::jsonb WHERE id = $1 AND user_id = $2",
        )
        .bind(thought_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to clear reasons", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn revoke_token(&self, token: &str) -> StoreResult<()> {
        sqlx::query("INSERT INTO revoked_tokens (token) VALUES ($1) ON CONFLICT (token) DO NOTHING")
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to revoke token", e))?;

        Ok(())
    }

    async fn is_token_revoked(&self, token: &str) -> StoreResult<bool> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM revoked_tokens WHERE token = $1")
                .bind(token)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| db_error("Failed to check revoked tokens", e))?;

        Ok(count > 0)
    }

    async fn count_revoked_tokens(&self) -> StoreResult<u64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM revoked_tokens")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| db_error("Failed to count revoked tokens", e))?;

        Ok(count as u64)
    }
}
