use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use tracing::{debug, info};

use crate::config::RealtimeConfig;
use crate::db::auth::{ServiceAccountAuth, ServiceAccountKey};
use crate::db::models::ChatRecord;
use crate::db::store::TranscriptBackend;
use crate::db::StoreError;

#[derive(Debug, Deserialize)]
struct PushResponse {
    name: String,
}

/// Transcript collection in a realtime database, spoken to over its REST API.
pub struct RealtimeDbBackend {
    client: Client,
    database_url: String,
    collection: String,
    auth: ServiceAccountAuth,
}

impl RealtimeDbBackend {
    pub fn new(database_url: &str, collection: &str, auth: ServiceAccountAuth) -> Self {
        Self {
            client: Client::new(),
            database_url: database_url.trim_end_matches('/').to_string(),
            collection: collection.trim_matches('/').to_string(),
            auth,
        }
    }

    pub fn from_config(config: &RealtimeConfig, collection: &str) -> Result<Self, StoreError> {
        if config.database_url.is_empty() {
            return Err(StoreError::Config("store.realtime.database_url is empty".to_string()));
        }
        let key = ServiceAccountKey::from_file(&config.credential_file)?;
        info!("Using realtime database {} as {}", config.database_url, key.client_email);
        Ok(Self::new(&config.database_url, collection, ServiceAccountAuth::new(key)?))
    }

    fn collection_url(&self) -> String {
        format!("{}/{}.json", self.database_url, self.collection)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, StoreError> {
        let token = self.auth.access_token().await?;
        let response = request
            .query(&[("access_token", token.as_str())])
            .send()
            .await
            .map_err(|e| StoreError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Backend { status, body });
        }
        Ok(response)
    }
}

#[async_trait]
impl TranscriptBackend for RealtimeDbBackend {
    fn name(&self) -> &str {
        "realtime"
    }

    async fn push(&self, record: &ChatRecord) -> Result<String, StoreError> {
        let request = self.client.post(self.collection_url()).json(record);
        let pushed: PushResponse = self
            .send(request)
            .await?
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;

        debug!("Pushed transcript {}", pushed.name);
        Ok(pushed.name)
    }

    async fn latest(&self) -> Result<Option<ChatRecord>, StoreError> {
        let request = self
            .client
            .get(self.collection_url())
            .query(&[("orderBy", "\"$key\""), ("limitToLast", "1")]);

        // An empty collection reads back as `null`.
        let found: Option<BTreeMap<String, ChatRecord>> = self
            .send(request)
            .await?
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;

        Ok(found.and_then(|records| records.into_values().next_back()))
    }
}
