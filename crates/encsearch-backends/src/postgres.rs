//! Secondary relational store client.
//!
//! Full customer records live in PostgreSQL with the sensitive columns
//! symmetrically encrypted; decryption happens inside the database so both
//! stores pay their crypto cost server-side. The decryption key is opaque
//! pass-through material supplied by configuration.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use tracing::debug;

use encsearch_core::{Error, SecondaryStore};

use crate::config::PostgresSettings;

const FETCH_BY_IDS_SQL: &str = r#"
SELECT
    id::text AS customer_id,
    pgp_sym_decrypt(full_name_encrypted, $1) AS full_name,
    pgp_sym_decrypt(email_encrypted, $1) AS email,
    pgp_sym_decrypt(phone_encrypted, $1) AS phone,
    pgp_sym_decrypt(address_encrypted, $1) AS address,
    pgp_sym_decrypt(preferences_encrypted, $1) AS preferences,
    tier,
    loyalty_points::bigint AS loyalty_points,
    last_purchase_date::text AS last_purchase_date,
    lifetime_value::float8 AS lifetime_value
FROM customers
WHERE id = ANY($2::uuid[])
"#;

/// Relational store backed by a sqlx connection pool.
pub struct RelationalStore {
    pool: PgPool,
    decrypt_key: String,
    timeout: Duration,
}

impl RelationalStore {
    /// Connect using the given settings.
    pub async fn connect(settings: &PostgresSettings) -> Result<Self, Error> {
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .connect(&settings.uri)
            .await
            .map_err(|e| Error::Secondary(e.to_string()))?;

        Ok(Self {
            pool,
            decrypt_key: settings.decrypt_key.clone(),
            timeout: settings.timeout,
        })
    }

    async fn fetch_rows(&self, ids: &[String]) -> Result<Vec<Value>, Error> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| Error::Secondary(e.to_string()))?;

        let fetched = sqlx::query(FETCH_BY_IDS_SQL)
            .bind(&self.decrypt_key)
            .bind(ids)
            .fetch_all(&mut *tx)
            .await;

        match fetched {
            Ok(rows) => {
                tx.commit()
                    .await
                    .map_err(|e| Error::Secondary(e.to_string()))?;
                Ok(rows.iter().map(row_to_value).collect())
            }
            Err(e) => {
                // No partial state may survive a failed batch fetch.
                let _ = tx.rollback().await;
                Err(Error::Secondary(e.to_string()))
            }
        }
    }
}

fn row_to_value(row: &sqlx::postgres::PgRow) -> Value {
    json!({
        "customer_id": row.try_get::<Option<String>, _>("customer_id").ok().flatten(),
        "full_name": row.try_get::<Option<String>, _>("full_name").ok().flatten(),
        "email": row.try_get::<Option<String>, _>("email").ok().flatten(),
        "phone": row.try_get::<Option<String>, _>("phone").ok().flatten(),
        "address": row.try_get::<Option<String>, _>("address").ok().flatten(),
        "preferences": row.try_get::<Option<String>, _>("preferences").ok().flatten(),
        "tier": row.try_get::<Option<String>, _>("tier").ok().flatten(),
        "loyalty_points": row.try_get::<Option<i64>, _>("loyalty_points").ok().flatten(),
        "last_purchase_date": row.try_get::<Option<String>, _>("last_purchase_date").ok().flatten(),
        "lifetime_value": row.try_get::<Option<f64>, _>("lifetime_value").ok().flatten(),
    })
}

#[async_trait]
impl SecondaryStore for RelationalStore {
    async fn fetch_by_ids(&self, ids: &[String]) -> Result<Vec<Value>, Error> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        debug!(ids = ids.len(), "batch record fetch");

        tokio::time::timeout(self.timeout, self.fetch_rows(ids))
            .await
            .map_err(|_| Error::Timeout(self.timeout))?
    }

    async fn ping(&self) -> Result<(), Error> {
        tokio::time::timeout(self.timeout, async {
            sqlx::query("SELECT 1")
                .execute(&self.pool)
                .await
                .map(|_| ())
                .map_err(|e| Error::Secondary(e.to_string()))
        })
        .await
        .map_err(|_| Error::Timeout(self.timeout))?
    }
}
