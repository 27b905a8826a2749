use async_trait::async_trait;
use futures_util::future::join_all;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use uuid::Uuid;

use herald_types::api::{MarkAllReadRequest, MarkAllReadResponse, PageQuery, PageResponse};
use herald_types::models::Notification;

use crate::error::RemoteError;

/// One page as returned by the remote store, already normalised.
#[derive(Debug, Clone)]
pub struct RemotePage {
    pub items: Vec<Notification>,
    pub total: u64,
}

/// Per-id result of a batch mark-read. Ids not listed in `failed` succeeded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOutcome {
    pub failed: Vec<Uuid>,
}

/// The remote source of truth the store reads from and writes through.
#[async_trait]
pub trait NotificationRemote: Send + Sync {
    async fn fetch_page(&self, page: u32, limit: u32) -> Result<RemotePage, RemoteError>;

    async fn mark_read(&self, id: Uuid) -> Result<(), RemoteError>;

    async fn mark_all_read(&self, ids: &[Uuid]) -> Result<BatchOutcome, RemoteError>;

    async fn delete(&self, id: Uuid) -> Result<(), RemoteError>;
}

/// HTTP client for the notification endpoints of one user.
#[derive(Clone)]
pub struct HttpRemote {
    client: Client,
    base_url: String,
    user_id: Uuid,
    token: Option<String>,
}

impl HttpRemote {
    pub fn new(base_url: impl Into<String>, user_id: Uuid) -> Self {
        Self::with_client(Client::new(), base_url, user_id)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>, user_id: Uuid) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url, user_id, token: None }
    }

    /// Send `Authorization: Bearer <token>` with every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/users/{}/notifications{}", self.base_url, self.user_id, path)
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn send(&self, req: RequestBuilder) -> Result<Response, RemoteError> {
        let resp = self.authorize(req).send().await?;
        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        Err(RemoteError::Status { status, body })
    }
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, RemoteError> {
    let body = resp.text().await?;
    serde_json::from_str(&body).map_err(|e| RemoteError::Decode(e.to_string()))
}

#[async_trait]
impl NotificationRemote for HttpRemote {
    async fn fetch_page(&self, page: u32, limit: u32) -> Result<RemotePage, RemoteError> {
        let req = self
            .client
            .get(self.url(""))
            .query(&PageQuery { page, limit });
        let resp: PageResponse = decode(self.send(req).await?).await?;

        debug!("Fetched page {} ({} items, total {})", page, resp.items.len(), resp.total);
        Ok(RemotePage {
            items: resp.items.into_iter().map(Notification::from).collect(),
            total: resp.total,
        })
    }

    async fn mark_read(&self, id: Uuid) -> Result<(), RemoteError> {
        let req = self.client.post(self.url(&format!("/{}/read", id)));
        self.send(req).await?;
        Ok(())
    }

    async fn mark_all_read(&self, ids: &[Uuid]) -> Result<BatchOutcome, RemoteError> {
        let req = self
            .client
            .post(self.url("/read-all"))
            .json(&MarkAllReadRequest { ids: ids.to_vec() });

        match self.send(req).await {
            Ok(resp) => {
                let resp: MarkAllReadResponse = decode(resp).await?;
                Ok(BatchOutcome { failed: resp.failed })
            }
            Err(RemoteError::Status { status, .. })
                if status == StatusCode::NOT_FOUND.as_u16()
                    || status == StatusCode::METHOD_NOT_ALLOWED.as_u16() =>
            {
                // No batch endpoint on this server: one call per id.
                warn!("read-all endpoint unavailable ({}), marking {} ids one by one", status, ids.len());
                let results = join_all(ids.iter().map(|&id| async move {
                    (id, self.mark_read(id).await)
                }))
                .await;

                let failed = results
                    .into_iter()
                    .filter_map(|(id, r)| r.err().map(|_| id))
                    .collect();
                Ok(BatchOutcome { failed })
            }
            Err(e) => Err(e),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<(), RemoteError> {
        let req = self.client.delete(self.url(&format!("/{}", id)));
        self.send(req).await?;
        Ok(())
    }
}
