use async_trait::async_trait;
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, PgPool, Row};
use tracing::info;
use uuid::Uuid;

use super::{Document, DocumentStore, StoreError};

/// Postgres-backed document store. Each collection is a table of
/// `(id UUID PRIMARY KEY, doc JSONB NOT NULL)`; merge-update maps onto the
/// JSONB `||` operator so a replace of named fields stays a single atomic
/// statement.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        info!("connected to document store");
        Ok(Self { pool })
    }

    /// Creates the backing table for each collection if it does not exist.
    pub async fn init_collections(&self, collections: &[&str]) -> Result<(), StoreError> {
        for collection in collections {
            let sql = format!(
                "CREATE TABLE IF NOT EXISTS {} (id UUID PRIMARY KEY, doc JSONB NOT NULL)",
                quote_identifier(collection)
            );
            sqlx::query(&sql).execute(&self.pool).await?;
        }
        Ok(())
    }
}

/// Quote SQL identifier to prevent injection
fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn row_doc(value: Value) -> Result<Document, StoreError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::Query(format!(
            "expected JSON object document, got {}",
            other
        ))),
    }
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn find_all(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        let sql = format!("SELECT doc FROM {} ORDER BY id", quote_identifier(collection));
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        rows.into_iter()
            .map(|row| row_doc(row.try_get::<Value, _>("doc")?))
            .collect()
    }

    async fn find_by_id(
        &self,
        collection: &str,
        id: Uuid,
    ) -> Result<Option<Document>, StoreError> {
        let sql = format!("SELECT doc FROM {} WHERE id = $1", quote_identifier(collection));
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;

        row.map(|r| row_doc(r.try_get::<Value, _>("doc")?)).transpose()
    }

    async fn insert(&self, collection: &str, mut doc: Document) -> Result<Document, StoreError> {
        let id = Uuid::new_v4();
        doc.insert("id".to_string(), Value::String(id.to_string()));

        let sql = format!(
            "INSERT INTO {} (id, doc) VALUES ($1, $2)",
            quote_identifier(collection)
        );
        sqlx::query(&sql)
            .bind(id)
            .bind(Value::Object(doc.clone()))
            .execute(&self.pool)
            .await?;

        Ok(doc)
    }

    async fn update(
        &self,
        collection: &str,
        id: Uuid,
        fields: Document,
    ) -> Result<Option<Document>, StoreError> {
        let sql = format!(
            "UPDATE {} SET doc = doc || $2 WHERE id = $1 RETURNING doc",
            quote_identifier(collection)
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(Value::Object(fields))
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| row_doc(r.try_get::<Value, _>("doc")?)).transpose()
    }

    async fn delete(&self, collection: &str, id: Uuid) -> Result<bool, StoreError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", quote_identifier(collection));
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_identifiers() {
        assert_eq!(quote_identifier("games"), "\"games\"");
        assert_eq!(quote_identifier("ga\"mes"), "\"ga\"\"mes\"");
    }
}
