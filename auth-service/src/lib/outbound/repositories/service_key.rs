use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::models::ServiceKey;
use crate::domain::auth::ports::ServiceKeyStore;

pub struct PostgresServiceKeyStore {
    pool: PgPool,
}

impl PostgresServiceKeyStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ServiceKeyStore for PostgresServiceKeyStore {
    async fn find_by_service(&self, service_name: &str) -> Result<Option<ServiceKey>, AuthError> {
        let row = sqlx::query_as::<_, (String, String)>(
            "SELECT service_name, key_hash FROM service_keys WHERE service_name = $1",
        )
        .bind(service_name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        Ok(row.map(|(service_name, key_hash)| ServiceKey {
            service_name,
            key_hash,
        }))
    }
}
