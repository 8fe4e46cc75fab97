//! Read-only access to the remote catalog API.
//!
//! The API exposes three collections: users, albums filtered by owning user
//! and photos filtered by owning album. Everything above this module only sees
//! the `DataSource` trait, so views can be driven by a mock in tests.

use crate::api_client::FetchError;
use crate::configuration::ApiSettings;
use crate::foundation::database::{Album, AlbumId, Photo, User, UserId};
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Queries the catalog collections.
///
/// Implementations run on a single thread, so the returned futures are not
/// required to be `Send`.
#[cfg_attr(test, automock)]
#[async_trait(?Send)]
pub trait DataSource {
    /// Users that have a non-empty name, in source order.
    async fn users(&self) -> Result<Vec<User>, FetchError>;
    async fn albums(&self, user_id: UserId) -> Result<Vec<Album>, FetchError>;
    async fn photos(&self, album_id: AlbumId) -> Result<Vec<Photo>, FetchError>;
}

/// A user as it comes over the wire, name possibly missing.
#[derive(Debug, Deserialize)]
struct RawUser {
    id: UserId,
    name: Option<String>,
}

/// Keeps the users that have a non-empty name, preserving their order.
fn named_users(raw: Vec<RawUser>) -> Vec<User> {
    raw.into_iter()
        .filter_map(|user| match user.name {
            Some(name) if !name.is_empty() => Some(User { id: user.id, name }),
            _ => None,
        })
        .collect()
}

/// `DataSource` backed by the JSON API over HTTP.
pub struct HttpDataSource {
    client: Client,
    base_url: String,
}

impl HttpDataSource {
    pub fn new(settings: &ApiSettings) -> Result<Self, FetchError> {
        let base_url = settings.api_base_url.trim().trim_end_matches('/');
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(FetchError::Other(format!(
                "api_base_url must be an http(s) URL, got '{}'",
                settings.api_base_url
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Fetches `path` with an optional filter and decodes the JSON body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        filter: Option<(&str, u64)>,
    ) -> Result<T, FetchError> {
        let url = self.endpoint(path);
        let mut request = self.client.get(&url);
        if let Some((key, value)) = filter {
            request = request.query(&[(key, value)]);
        }

        debug!(url = %url, ?filter, "fetching");
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::StatusError {
                code: status.as_u16(),
                url,
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait(?Send)]
impl DataSource for HttpDataSource {
    async fn users(&self) -> Result<Vec<User>, FetchError> {
        let raw: Vec<RawUser> = self.get_json("users/", None).await?;
        Ok(named_users(raw))
    }

    async fn albums(&self, user_id: UserId) -> Result<Vec<Album>, FetchError> {
        self.get_json("albums", Some(("userId", user_id))).await
    }

    async fn photos(&self, album_id: AlbumId) -> Result<Vec<Photo>, FetchError> {
        self.get_json("photos", Some(("albumId", album_id))).await
    }
}
