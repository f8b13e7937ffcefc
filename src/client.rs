//! REST client for the upstream HR API.
//!
//! Every collection is exposed as `GET /{entity}?limit=&page=` and
//! `GET /{entity}/{id}`. Rows are handed back as raw JSON and decoded by the caller.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use tracing::debug;

use crate::config::Config;
use crate::error::FetchError;
use crate::model::{EntityKind, Page};

#[async_trait]
pub trait RecordSource: Send + Sync {
    /// One page of a collection, 1-based.
    async fn fetch_page(
        &self,
        kind: EntityKind,
        page: u32,
        limit: u32,
    ) -> Result<Page<Value>, FetchError>;

    /// A single record; `Ok(None)` when the API reports it missing.
    async fn fetch_one(&self, kind: EntityKind, id: &str) -> Result<Option<Value>, FetchError>;
}

pub struct HttpRecordSource {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpRecordSource {
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn from_config(config: &Config) -> reqwest::Result<Self> {
        Self::new(
            &config.api_base_url,
            config.api_token.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    async fn get(&self, url: String) -> Result<Option<Value>, FetchError> {
        let mut req = self.client.get(&url);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }

        let resp = req.send().await.map_err(|source| FetchError::Request {
            url: url.clone(),
            source,
        })?;

        let status = resp.status();
        debug!(%url, status = status.as_u16(), "upstream response");

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                url,
                status: status.as_u16(),
            });
        }

        resp.json::<Value>()
            .await
            .map(Some)
            .map_err(|source| FetchError::Request { url, source })
    }
}

#[async_trait]
impl RecordSource for HttpRecordSource {
    async fn fetch_page(
        &self,
        kind: EntityKind,
        page: u32,
        limit: u32,
    ) -> Result<Page<Value>, FetchError> {
        let url = format!("{}/{}?limit={}&page={}", self.base_url, kind, limit, page);

        // A missing collection is an upstream fault, not an empty page.
        let body = self.get(url.clone()).await?.ok_or(FetchError::Status {
            url,
            status: StatusCode::NOT_FOUND.as_u16(),
        })?;

        serde_json::from_value(body).map_err(|source| FetchError::Decode { kind, source })
    }

    async fn fetch_one(&self, kind: EntityKind, id: &str) -> Result<Option<Value>, FetchError> {
        let url = format!("{}/{}/{}", self.base_url, kind, id);
        self.get(url).await
    }
}
