//! HTTP transport for the sync client.
//!
//! Implements [`RecordStore`] against the REST surface so a
//! [`crate::sync::SyncClient`] runs identically over the network or over
//! the local fallback store. Identity travels in the same header the
//! server resolves; error bodies are folded back into the error taxonomy
//! (404 -> NotFound, 400 -> Validation, anything else -> Store).

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Error, JsonError, Result};
use crate::identity::DEFAULT_USER_HEADER;
use crate::model::{Kind, Resource};
use crate::store::RecordStore;

pub struct ApiRemote {
    base_url: String,
    header: String,
    client: reqwest::Client,
}

impl ApiRemote {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            header: DEFAULT_USER_HEADER.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Override the identity header name (must match the server config)
    pub fn with_identity_header(mut self, header: impl Into<String>) -> Self {
        self.header = header.into();
        self
    }

    fn collection_url(&self, kind: Kind) -> String {
        format!("{}/api/{}", self.base_url, kind.path())
    }

    fn record_url(&self, kind: Kind, id: &str) -> String {
        format!("{}/api/{}/{}", self.base_url, kind.path(), id)
    }

    async fn decode<R: DeserializeOwned>(
        kind: Kind,
        id: &str,
        response: reqwest::Response,
    ) -> Result<R> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<R>().await?);
        }

        let message = match response.json::<JsonError>().await {
            Ok(body) => body.error,
            Err(_) => format!("API error: {status}"),
        };

        match status {
            StatusCode::NOT_FOUND => Err(Error::not_found(kind.path(), id)),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                Err(Error::Validation(message))
            }
            StatusCode::UNAUTHORIZED => Err(Error::IdentityRequired(message)),
            _ => Err(Error::Store(message)),
        }
    }
}

#[async_trait]
impl<T: Resource> RecordStore<T> for ApiRemote {
    async fn list(&self, user: &str) -> Result<Vec<T>> {
        let response = self
            .client
            .get(self.collection_url(T::KIND))
            .header(&self.header, user)
            .send()
            .await?;
        Self::decode(T::KIND, "", response).await
    }

    async fn create(&self, user: &str, record: T) -> Result<T> {
        let response = self
            .client
            .post(self.collection_url(T::KIND))
            .header(&self.header, user)
            .json(&record)
            .send()
            .await?;
        Self::decode(T::KIND, record.id(), response).await
    }

    async fn update(&self, user: &str, id: &str, patch: &Value) -> Result<T> {
        let response = self
            .client
            .put(self.record_url(T::KIND, id))
            .header(&self.header, user)
            .json(patch)
            .send()
            .await?;
        Self::decode(T::KIND, id, response).await
    }

    async fn delete(&self, user: &str, id: &str) -> Result<()> {
        let response = self
            .client
            .delete(self.record_url(T::KIND, id))
            .header(&self.header, user)
            .send()
            .await?;
        let _: Value = Self::decode(T::KIND, id, response).await?;
        Ok(())
    }
}
