//! Ledger store backed by a PostgREST-style table API.

use std::time::Duration;

use async_trait::async_trait;
use debtbook_core::ledger::{Entry, EntryPatch, LedgerStore, NewEntry, StoreError};
use debtbook_shared::Session;
use debtbook_shared::config::StoreConfig;
use debtbook_shared::types::EntryId;
use reqwest::header::HeaderValue;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{API_KEY_HEADER, endpoint, error_message, http_client};

/// Ledger store talking to `{url}/rest/v1/{table}`.
///
/// Row ownership is enforced server-side by row-level security on the
/// caller's access token; the owner filter on select only narrows the query.
#[derive(Debug, Clone)]
pub struct RestLedgerStore {
    http: Client,
    table_url: String,
    anon_key: String,
    timeout: Duration,
}

impl RestLedgerStore {
    /// Creates a store for the configured project and table.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Transport` if the HTTP client cannot be built.
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let timeout = config.request_timeout();
        let http = http_client(timeout).map_err(|e| StoreError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            table_url: endpoint(&config.url, &format!("rest/v1/{}", config.table)),
            anon_key: config.anon_key.clone(),
            timeout,
        })
    }

    fn request(&self, method: Method, session: &Session) -> RequestBuilder {
        debug!(%method, url = %self.table_url, owner = %session.owner, "Ledger store request");
        self.http
            .request(method, &self.table_url)
            .header(API_KEY_HEADER, &self.anon_key)
            .bearer_auth(&session.access_token)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, StoreError> {
        let response = request.send().await.map_err(|e| self.transport(&e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(StoreError::Rejected {
            status: status.as_u16(),
            message: error_message(&body),
        })
    }

    async fn decode<T: DeserializeOwned>(&self, response: Response) -> Result<T, StoreError> {
        let body = response.text().await.map_err(|e| self.transport(&e))?;
        serde_json::from_str(&body).map_err(|e| StoreError::Decode(e.to_string()))
    }

    fn transport(&self, err: &reqwest::Error) -> StoreError {
        if err.is_timeout() {
            StoreError::Timeout(self.timeout)
        } else {
            StoreError::Transport(err.to_string())
        }
    }
}

fn id_filter(id: EntryId) -> [(&'static str, String); 1] {
    [("id", format!("eq.{id}"))]
}

#[async_trait]
impl LedgerStore for RestLedgerStore {
    async fn select(&self, session: &Session) -> Result<Vec<Entry>, StoreError> {
        let request = self.request(Method::GET, session).query(&[
            ("select", "*".to_string()),
            ("user_id", format!("eq.{}", session.owner)),
            ("order", "created_at.desc".to_string()),
        ]);
        let response = self.send(request).await?;
        self.decode(response).await
    }

    async fn insert(&self, session: &Session, entry: &NewEntry) -> Result<Entry, StoreError> {
        let request = self
            .request(Method::POST, session)
            .header("Prefer", HeaderValue::from_static("return=representation"))
            .json(entry);
        let response = self.send(request).await?;

        let rows: Vec<Entry> = self.decode(response).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| StoreError::Decode("insert returned no rows".to_string()))
    }

    async fn update(
        &self,
        session: &Session,
        id: EntryId,
        patch: &EntryPatch,
    ) -> Result<(), StoreError> {
        let request = self
            .request(Method::PATCH, session)
            .query(&id_filter(id))
            .json(patch);
        self.send(request).await?;
        Ok(())
    }

    async fn delete(&self, session: &Session, id: EntryId) -> Result<(), StoreError> {
        let request = self.request(Method::DELETE, session).query(&id_filter(id));
        self.send(request).await?;
        Ok(())
    }
}
