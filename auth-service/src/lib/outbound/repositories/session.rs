use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::models::NewSession;
use crate::domain::auth::models::Session;
use crate::domain::auth::models::UserId;
use crate::domain::auth::ports::SessionStore;

pub struct PostgresSessionStore {
    pool: PgPool,
}

impl PostgresSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    id: i64,
    user_id: i64,
    refresh_token: String,
    expires_at: DateTime<Utc>,
    ip_address: Option<String>,
    user_agent: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<SessionRow> for Session {
    type Error = AuthError;

    fn try_from(row: SessionRow) -> Result<Self, Self::Error> {
        Ok(Session {
            id: row.id,
            user_id: UserId::try_from(row.user_id)?,
            refresh_token: row.refresh_token,
            expires_at: row.expires_at,
            ip_address: row.ip_address,
            user_agent: row.user_agent,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl SessionStore for PostgresSessionStore {
    async fn create(&self, session: NewSession) -> Result<i64, AuthError> {
        sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO user_sessions (user_id, refresh_token, expires_at, ip_address, user_agent)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(session.user_id.as_i64())
        .bind(&session.refresh_token)
        .bind(session.expires_at)
        .bind(session.provenance.ip_address.as_deref())
        .bind(session.provenance.user_agent.as_deref())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))
    }

    async fn find_by_token(&self, refresh_token: &str) -> Result<Option<Session>, AuthError> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT id, user_id, refresh_token, expires_at, ip_address, user_agent, created_at
            FROM user_sessions
            WHERE refresh_token = $1 AND expires_at > NOW()
            "#,
        )
        .bind(refresh_token)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        row.map(Session::try_from).transpose()
    }

    async fn delete(&self, refresh_token: &str) -> Result<bool, AuthError> {
        let result = sqlx::query("DELETE FROM user_sessions WHERE refresh_token = $1")
            .bind(refresh_token)
            .execute(&self.pool)
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_all_for_user(&self, user_id: UserId) -> Result<u64, AuthError> {
        let result = sqlx::query("DELETE FROM user_sessions WHERE user_id = $1")
            .bind(user_id.as_i64())
            .execute(&self.pool)
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        Ok(result.rows_affected())
    }
}
