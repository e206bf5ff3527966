//! Primary encrypted document store client.
//!
//! The driver performs automatic field-level encryption: queries carry
//! plaintext predicates and results arrive decrypted. This client only
//! translates [`BackendQuery`] fragments into the store's native predicate
//! form; key lifecycle is provisioned out of band.

use std::time::Duration;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::{Client, Collection};
use serde_json::Value;
use tracing::debug;

use encsearch_core::normalize::DOCUMENT_ID_FIELD;
use encsearch_core::{BackendQuery, Error, PrimaryStore};

use crate::config::MongoSettings;

/// Encrypted document store backed by the MongoDB driver.
pub struct MongoStore {
    client: Client,
    collection: Collection<Document>,
    timeout: Duration,
}

impl MongoStore {
    /// Connect using the given settings.
    pub async fn connect(settings: &MongoSettings) -> Result<Self, Error> {
        let client = Client::with_uri_str(&settings.uri)
            .await
            .map_err(|e| Error::Primary(e.to_string()))?;
        let collection = client
            .database(&settings.database)
            .collection::<Document>(&settings.collection);

        Ok(Self {
            client,
            collection,
            timeout: settings.timeout,
        })
    }

    async fn timed<F, T>(&self, fut: F) -> Result<T, Error>
    where
        F: std::future::Future<Output = Result<T, Error>>,
    {
        tokio::time::timeout(self.timeout, fut)
            .await
            .map_err(|_| Error::Timeout(self.timeout))?
    }
}

/// Translate a backend query fragment into the store's filter document.
///
/// Prefix/suffix/substring predicates use the encrypted string-query
/// expression operators; equality uses a plain field match, which the
/// driver rewrites into an encrypted equality probe.
pub fn filter_for(query: &BackendQuery) -> Document {
    match query {
        BackendQuery::Equality { path, value } => doc! { *path: value },
        BackendQuery::StartsWith { path, prefix } => doc! {
            "$expr": {
                "$encStrStartsWith": {
                    "input": format!("${path}"),
                    "prefix": prefix,
                }
            }
        },
        BackendQuery::EndsWith { path, suffix } => doc! {
            "$expr": {
                "$encStrEndsWith": {
                    "input": format!("${path}"),
                    "suffix": suffix,
                }
            }
        },
        BackendQuery::Contains { path, substring } => doc! {
            "$expr": {
                "$encStrContains": {
                    "input": format!("${path}"),
                    "substring": substring,
                }
            }
        },
    }
}

#[async_trait]
impl PrimaryStore for MongoStore {
    async fn search_ids(&self, query: &BackendQuery, limit: usize) -> Result<Vec<String>, Error> {
        let filter = filter_for(query);
        debug!(?filter, limit, "identifier search");

        let docs: Vec<Document> = self
            .timed(async {
                self.collection
                    .find(filter)
                    .projection(doc! { DOCUMENT_ID_FIELD: 1, "_id": 0 })
                    .limit(limit as i64)
                    .await
                    .map_err(|e| Error::Primary(e.to_string()))?
                    .try_collect()
                    .await
                    .map_err(|e| Error::Primary(e.to_string()))
            })
            .await?;

        Ok(docs
            .iter()
            .filter_map(|d| d.get_str(DOCUMENT_ID_FIELD).ok().map(str::to_string))
            .collect())
    }

    async fn search_records(
        &self,
        query: &BackendQuery,
        limit: usize,
    ) -> Result<Vec<Value>, Error> {
        let filter = filter_for(query);
        debug!(?filter, limit, "full-record search");

        let docs: Vec<Document> = self
            .timed(async {
                self.collection
                    .find(filter)
                    .limit(limit as i64)
                    .await
                    .map_err(|e| Error::Primary(e.to_string()))?
                    .try_collect()
                    .await
                    .map_err(|e| Error::Primary(e.to_string()))
            })
            .await?;

        docs.into_iter()
            .map(|doc| serde_json::to_value(doc).map_err(|e| Error::Primary(e.to_string())))
            .collect()
    }

    async fn ping(&self) -> Result<(), Error> {
        self.timed(async {
            self.client
                .database("admin")
                .run_command(doc! { "ping": 1 })
                .await
                .map(|_| ())
                .map_err(|e| Error::Primary(e.to_string()))
        })
        .await
    }

    async fn count(&self) -> Result<u64, Error> {
        self.timed(async {
            self.collection
                .count_documents(doc! {})
                .await
                .map_err(|e| Error::Primary(e.to_string()))
        })
        .await
    }
}
