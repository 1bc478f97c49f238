use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

use crate::models::{NewSession, SessionPatch, SessionRecord, StatsSummary, TaskPatch, TaskRecord};

use super::SessionStore;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("NotFound")]
    NotFound,
    #[error("Status {0}: {1}")]
    Status(u16, String),
    #[error("ResponseError: {0}")]
    Response(String),
    #[error("ParsingError: {0}")]
    Parsing(String),
}

/// HTTP client for the session/task API. Stateless apart from the connection
/// pool; cheap to clone.
#[derive(Clone)]
pub struct HttpSessionStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSessionStore {
    /// `base_url` is the API root, e.g. `http://localhost:3000/api`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> super::Result<T> {
        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(StoreError::Status(status.as_u16(), body));
        }

        resp.json::<T>().await.map_err(|e| {
            StoreError::Parsing(format!("Failed to parse response as JSON: {}", e))
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> super::Result<T> {
        let resp = self
            .client
            .get(self.url(path))
            .send()
            .await
            .map_err(|e| StoreError::Response(e.to_string()))?;
        Self::decode(resp).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> super::Result<T> {
        let resp = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| StoreError::Response(e.to_string()))?;
        Self::decode(resp).await
    }

    async fn put<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> super::Result<T> {
        let resp = self
            .client
            .put(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| StoreError::Response(e.to_string()))?;
        Self::decode(resp).await
    }

    async fn delete(&self, path: &str) -> super::Result<()> {
        let resp = self
            .client
            .delete(self.url(path))
            .send()
            .await
            .map_err(|e| StoreError::Response(e.to_string()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(StoreError::Status(status.as_u16(), body));
        }
        Ok(())
    }
}

#[async_trait]
impl SessionStore for HttpSessionStore {
    async fn create_session(&self, session: &NewSession) -> super::Result<SessionRecord> {
        self.post("/sessions", session).await
    }

    async fn update_session(&self, id: &str, patch: &SessionPatch) -> super::Result<SessionRecord> {
        self.put(&format!("/sessions/{}", id), patch).await
    }

    async fn delete_session(&self, id: &str) -> super::Result<()> {
        self.delete(&format!("/sessions/{}", id)).await
    }

    async fn update_task(&self, id: &str, patch: &TaskPatch) -> super::Result<TaskRecord> {
        self.put(&format!("/tasks/{}", id), patch).await
    }

    async fn fetch_sessions(&self) -> super::Result<Vec<SessionRecord>> {
        self.get("/sessions").await
    }

    async fn fetch_stats(&self) -> super::Result<StatsSummary> {
        self.get("/sessions/stats/summary").await
    }
}
