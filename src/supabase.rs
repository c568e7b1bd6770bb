//! Supabase REST client
//!
//! Thin wrapper over the PostgREST (`/rest/v1`) and Storage (`/storage/v1`) endpoints of
//! a hosted Supabase project, shared by the catalog and the orders repository.

use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::SupabaseConfig;

/// Errors that can occur when talking to Supabase.
#[derive(Debug, Error)]
pub enum SupabaseError {
    /// An HTTP transport or serialization error occurred.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Supabase returned a non-2xx response or an unexpected body.
    #[error("unexpected response from Supabase: {0}")]
    UnexpectedResponse(String),

    /// The project URL cannot be used as a base URL.
    #[error("invalid Supabase URL: {0}")]
    InvalidUrl(String),

    /// No project URL or key is configured.
    #[error("Supabase is not configured; set SUPABASE_URL and SUPABASE_KEY")]
    NotConfigured,
}

/// HTTP client for one Supabase project.
#[derive(Debug, Clone)]
pub struct SupabaseClient {
    base_url: Url,
    key: String,
    http: Client,
}

impl SupabaseClient {
    /// Creates a client for the project at `url`, authenticating with the public `key`.
    ///
    /// # Errors
    ///
    /// Returns [`SupabaseError::InvalidUrl`] if `url` is not an absolute http(s) URL.
    pub fn new(url: &str, key: impl Into<String>) -> Result<Self, SupabaseError> {
        let base_url = Url::parse(url).map_err(|error| {
            SupabaseError::InvalidUrl(format!("{url}: {error}"))
        })?;

        if base_url.cannot_be_a_base() {
            return Err(SupabaseError::InvalidUrl(url.to_string()));
        }

        Ok(Self {
            base_url,
            key: key.into(),
            http: Client::new(),
        })
    }

    /// Creates a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SupabaseError::NotConfigured`] if the URL or key is missing, or
    /// [`SupabaseError::InvalidUrl`] if the configured URL is invalid.
    pub fn from_config(config: &SupabaseConfig) -> Result<Self, SupabaseError> {
        let (Some(url), Some(key)) = (&config.supabase_url, &config.supabase_key) else {
            return Err(SupabaseError::NotConfigured);
        };

        Self::new(url, key.clone())
    }

    /// Public URL of an object in a public storage bucket.
    ///
    /// # Errors
    ///
    /// Returns [`SupabaseError::InvalidUrl`] if the URL cannot be built.
    pub fn public_url(&self, bucket: &str, name: &str) -> Result<Url, SupabaseError> {
        self.endpoint(&["storage", "v1", "object", "public", bucket, name])
    }

    pub(crate) fn table(
        &self,
        method: Method,
        table: &str,
    ) -> Result<RequestBuilder, SupabaseError> {
        let url = self.endpoint(&["rest", "v1", table])?;

        Ok(self.authorized(method, url))
    }

    pub(crate) fn storage_list(&self, bucket: &str) -> Result<RequestBuilder, SupabaseError> {
        let url = self.endpoint(&["storage", "v1", "object", "list", bucket])?;

        Ok(self.authorized(Method::POST, url))
    }

    pub(crate) async fn send_json<T: DeserializeOwned>(
        request: RequestBuilder,
    ) -> Result<T, SupabaseError> {
        let response = Self::send(request).await?;

        Ok(response.json().await?)
    }

    pub(crate) async fn send(request: RequestBuilder) -> Result<reqwest::Response, SupabaseError> {
        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();

            return Err(SupabaseError::UnexpectedResponse(format!(
                "request failed with status {status}: {text}"
            )));
        }

        Ok(response)
    }

    fn authorized(&self, method: Method, url: Url) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, SupabaseError> {
        let mut url = self.base_url.clone();

        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| SupabaseError::InvalidUrl(self.base_url.to_string()))?;

            path.pop_if_empty().extend(segments);
        }

        Ok(url)
    }
}
