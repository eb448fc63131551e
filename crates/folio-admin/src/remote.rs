//! Remote content persistence.
//!
//! The admin context writes every mutation through a [`ContentRemote`].
//! [`HttpRemote`] talks to the folio content API; [`StoreRemote`] goes
//! straight to an in-process [`ContentStore`] for hosts that embed it.

use std::time::Duration;

use async_trait::async_trait;
use folio_core::{ApiResponse, ContentMap, DeleteContentRequest, SetContentRequest};
use folio_state::ContentStore;
use reqwest::{StatusCode, Url};
use thiserror::Error;

use crate::cookie::CookieJar;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("write rejected: unlock cookie missing or expired")]
    Unauthorized,

    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("store error: {0}")]
    Store(#[from] folio_state::StateError),

    #[error("write task failed: {0}")]
    Task(String),

    #[error("invalid base url: {0}")]
    InvalidUrl(String),
}

/// The authoritative override store as seen from the client.
#[async_trait]
pub trait ContentRemote: Send + Sync {
    async fn get_all(&self) -> Result<ContentMap, RemoteError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), RemoteError>;
    async fn delete(&self, key: &str) -> Result<(), RemoteError>;
}

/// Client for the folio content API (`/api/content`).
pub struct HttpRemote {
    client: reqwest::Client,
    endpoint: Url,
    jar: CookieJar,
}

impl HttpRemote {
    /// `base_url` is the site origin, e.g. `https://example.com`.
    pub fn new(base_url: &str, jar: CookieJar) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        let mut base = Url::parse(base_url).map_err(|e| RemoteError::InvalidUrl(e.to_string()))?;
        // A base without a trailing slash would lose its last path segment on join.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let endpoint = base
            .join("api/content")
            .map_err(|e| RemoteError::InvalidUrl(e.to_string()))?;
        Ok(Self {
            client,
            endpoint,
            jar,
        })
    }

    fn with_cookie(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.jar.header_value() {
            Some(cookie) => req.header(reqwest::header::COOKIE, cookie),
            None => req,
        }
    }

    async fn check(resp: reqwest::Response) -> Result<(), RemoteError> {
        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(RemoteError::Unauthorized);
        }
        if !status.is_success() {
            let message = resp
                .json::<ApiResponse<()>>()
                .await
                .ok()
                .and_then(|body| body.error)
                .unwrap_or_default();
            return Err(RemoteError::Status {
                status: status.as_u16(),
                message,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ContentRemote for HttpRemote {
    async fn get_all(&self) -> Result<ContentMap, RemoteError> {
        let resp = self.client.get(self.endpoint.clone()).send().await?;
        let body: ApiResponse<ContentMap> = resp.error_for_status()?.json().await?;
        Ok(body.data.unwrap_or_default())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), RemoteError> {
        let body = SetContentRequest {
            key: key.to_string(),
            value: value.to_string(),
        };
        let req = self.with_cookie(self.client.put(self.endpoint.clone()).json(&body));
        Self::check(req.send().await?).await
    }

    async fn delete(&self, key: &str) -> Result<(), RemoteError> {
        let body = DeleteContentRequest {
            key: key.to_string(),
        };
        let req = self.with_cookie(self.client.delete(self.endpoint.clone()).json(&body));
        Self::check(req.send().await?).await
    }
}

/// Direct access to an in-process store.
pub struct StoreRemote {
    store: ContentStore,
}

impl StoreRemote {
    pub fn new(store: ContentStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ContentRemote for StoreRemote {
    async fn get_all(&self) -> Result<ContentMap, RemoteError> {
        Ok(self.store.try_get_all()?)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), RemoteError> {
        self.store.set(key, value)?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), RemoteError> {
        self.store.delete(key)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn store_remote_round_trip() {
        let store = ContentStore::open_in_memory().unwrap();
        let remote = StoreRemote::new(store.clone());

        remote.set("hero.title", "Hello").await.unwrap();
        assert_eq!(remote.get_all().await.unwrap()["hero.title"], "Hello");

        remote.delete("hero.title").await.unwrap();
        remote.delete("hero.title").await.unwrap();
        assert!(store.get_all().is_empty());
    }

    #[test]
    fn http_remote_normalizes_endpoint() {
        let remote = HttpRemote::new("http://localhost:8080/", CookieJar::new("folio_admin"))
            .unwrap();
        assert_eq!(remote.endpoint.as_str(), "http://localhost:8080/api/content");

        let remote = HttpRemote::new("http://localhost:8080", CookieJar::new("folio_admin"))
            .unwrap();
        assert_eq!(remote.endpoint.as_str(), "http://localhost:8080/api/content");
    }

    #[test]
    fn http_remote_keeps_base_path() {
        let remote = HttpRemote::new("https://example.com/site", CookieJar::new("folio_admin"))
            .unwrap();
        assert_eq!(remote.endpoint.as_str(), "https://example.com/site/api/content");
    }

    #[test]
    fn http_remote_rejects_bad_base() {
        let result = HttpRemote::new("not a url", CookieJar::new("folio_admin"));
        assert!(matches!(result, Err(RemoteError::InvalidUrl(_))));
    }
}
