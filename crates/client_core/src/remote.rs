use std::{marker::PhantomData, sync::Arc};

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use shared::{
    domain::Record,
    error::{ApiError, ErrorCode},
    resource::{DeleteMode, Resource},
};
use thiserror::Error;
use tracing::debug;
use url::Url;

pub type RecordOf<S> = <<S as RemoteStore>::Resource as Resource>::Record;
pub type DraftOf<S> = <<S as RemoteStore>::Resource as Resource>::Draft;
pub type IdOf<S> = <RecordOf<S> as Record>::Id;

/// Partial update carrying a new value for the collection's title field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitlePatch {
    pub title: String,
}

impl TitlePatch {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }
}

/// One remote collection. Each call is an independent round trip that may fail.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    type Resource: Resource;

    async fn list(&self) -> Result<Vec<<Self::Resource as Resource>::Record>>;

    /// Inserts a row; the store assigns its id and creation time.
    async fn create(
        &self,
        draft: &<Self::Resource as Resource>::Draft,
    ) -> Result<<Self::Resource as Resource>::Record>;

    /// Fails when no row has `id`.
    async fn update(
        &self,
        id: &<<Self::Resource as Resource>::Record as Record>::Id,
        patch: &TitlePatch,
    ) -> Result<<Self::Resource as Resource>::Record>;

    /// Hard or soft delete, depending on the collection's `DeleteMode`.
    async fn remove(&self, id: &<<Self::Resource as Resource>::Record as Record>::Id)
        -> Result<()>;
}

#[async_trait]
impl<S> RemoteStore for Arc<S>
where
    S: RemoteStore + ?Sized,
{
    type Resource = S::Resource;

    async fn list(&self) -> Result<Vec<RecordOf<S>>> {
        (**self).list().await
    }

    async fn create(&self, draft: &DraftOf<S>) -> Result<RecordOf<S>> {
        (**self).create(draft).await
    }

    async fn update(&self, id: &IdOf<S>, patch: &TitlePatch) -> Result<RecordOf<S>> {
        (**self).update(id, patch).await
    }

    async fn remove(&self, id: &IdOf<S>) -> Result<()> {
        (**self).remove(id).await
    }
}

/// Non-success response from the resource API.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct RemoteStatusError {
    pub status: StatusCode,
    pub code: Option<ErrorCode>,
    pub message: String,
}

/// Talks to the server's REST routes for one collection.
pub struct HttpRemoteStore<R: Resource> {
    http: Client,
    base_url: Url,
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> Clone for HttpRemoteStore<R> {
    fn clone(&self) -> Self {
        Self {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            _resource: PhantomData,
        }
    }
}

impl<R: Resource> HttpRemoteStore<R> {
    pub fn new(server_url: &str) -> Result<Self> {
        Self::with_client(Client::new(), server_url)
    }

    pub fn with_client(http: Client, server_url: &str) -> Result<Self> {
        let mut base_url =
            Url::parse(server_url).with_context(|| format!("invalid server url '{server_url}'"))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            http,
            base_url,
            _resource: PhantomData,
        })
    }

    pub fn collection_url(&self) -> Result<Url> {
        self.base_url
            .join(R::COLLECTION)
            .with_context(|| format!("failed to build url for collection '{}'", R::COLLECTION))
    }

    pub fn record_url(&self, id: &<R::Record as Record>::Id) -> Result<Url> {
        self.base_url
            .join(&format!("{}/{id}", R::COLLECTION))
            .with_context(|| format!("failed to build url for {} {id}", R::COLLECTION))
    }

    fn title_body(patch: &TitlePatch) -> serde_json::Value {
        let mut body = serde_json::Map::new();
        body.insert(
            R::TITLE_FIELD.to_string(),
            serde_json::Value::String(patch.title.clone()),
        );
        serde_json::Value::Object(body)
    }
}

#[async_trait]
impl<R: Resource> RemoteStore for HttpRemoteStore<R> {
    type Resource = R;

    async fn list(&self) -> Result<Vec<R::Record>> {
        let url = self.collection_url()?;
        debug!(%url, "listing collection");
        let response = self.http.get(url).send().await?;
        decode(response).await
    }

    async fn create(&self, draft: &R::Draft) -> Result<R::Record> {
        let url = self.collection_url()?;
        debug!(%url, "creating record");
        let response = self.http.post(url).json(draft).send().await?;
        decode(response).await
    }

    async fn update(&self, id: &<R::Record as Record>::Id, patch: &TitlePatch) -> Result<R::Record> {
        let url = self.record_url(id)?;
        debug!(%url, "updating record");
        let response = self
            .http
            .patch(url)
            .json(&Self::title_body(patch))
            .send()
            .await?;
        decode(response).await
    }

    async fn remove(&self, id: &<R::Record as Record>::Id) -> Result<()> {
        let url = self.record_url(id)?;
        let response = match R::DELETE_MODE {
            DeleteMode::Hard => {
                debug!(%url, "deleting record");
                self.http.delete(url).send().await?
            }
            DeleteMode::Soft => {
                debug!(%url, "soft-deleting record");
                self.http
                    .patch(url)
                    .json(&serde_json::json!({ "deleted": true }))
                    .send()
                    .await?
            }
        };
        ensure_success(response).await?;
        Ok(())
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let response = ensure_success(response).await?;
    response
        .json::<T>()
        .await
        .context("failed to decode response body")
}

async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let err = match serde_json::from_str::<ApiError>(&body) {
        Ok(api_error) => RemoteStatusError {
            status,
            code: Some(api_error.code),
            message: api_error.message,
        },
        Err(_) if body.trim().is_empty() => RemoteStatusError {
            status,
            code: None,
            message: status.to_string(),
        },
        Err(_) => RemoteStatusError {
            status,
            code: None,
            message: body.trim().to_string(),
        },
    };
    Err(err.into())
}

#[cfg(test)]
#[path = "tests/remote_tests.rs"]
mod tests;
