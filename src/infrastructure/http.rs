//! HTTP adapter for the GoREST v2 API
//!
//! Implements both fetch ports for any deserializable item. The resource of
//! the request picks the path:
//!
//! - `GET {base}/posts?page=P&per_page=S`
//! - `GET {base}/posts/{post_id}/comments?page=P&per_page=S`
//! - `GET {base}/{resource}/{id}`

use std::{future::Future, time::Duration};

use futures::FutureExt;
use reqwest::{
    header::{self, HeaderMap, HeaderValue, InvalidHeaderValue},
    StatusCode,
};
use secrecy::{ExposeSecret, SecretBox};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::{
    core::{cancel::FetchToken, error::TransportFailure},
    domain::{EntityRequest, Page, PageRequest, ResourceKind},
    infrastructure::{
        config::Config,
        port::{EntityPort, FetchFuture, PagePort},
    },
};

/// Response header carrying the size of the whole collection
pub const TOTAL_HEADER: &str = "x-pagination-total";

#[derive(Debug, Error)]
pub enum HttpError {
    /// A non-success response, containing the response text.
    #[error("{0}: {1}")]
    Status(StatusCode, String),
    #[error("Network error. Please check your connection.")]
    Network(#[from] reqwest::Error),
    #[error("Unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Invalid access token")]
    InvalidToken(#[from] InvalidHeaderValue),
    #[error("A {0} page needs a parent id")]
    MissingParent(ResourceKind),
}

impl From<HttpError> for TransportFailure {
    fn from(error: HttpError) -> Self {
        match error {
            HttpError::Status(status, text) => {
                let failure = TransportFailure::status(status.as_u16());
                match serde_json::from_str(&text) {
                    Ok(body) => failure.with_body(body),
                    Err(_) => failure,
                }
            }
            HttpError::Network(e) => TransportFailure {
                status: e.status().map(|s| s.as_u16()),
                ..TransportFailure::network()
            },
            HttpError::Decode(_) | HttpError::InvalidToken(_) | HttpError::MissingParent(_) => {
                TransportFailure::network()
            }
        }
    }
}

/// An API client for the posts service.
#[derive(Debug, Clone)]
pub struct HttpClient {
    base_url: String,
    inner_client: reqwest::Client,
}

impl HttpClient {
    pub fn new(
        base_url: impl Into<String>,
        access_token: Option<&SecretBox<String>>,
        timeout: Duration,
    ) -> Result<Self, HttpError> {
        let mut headers = HeaderMap::new();
        if let Some(token) = access_token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))?;
            value.set_sensitive(true);
            headers.insert(header::AUTHORIZATION, value);
        }
        let inner_client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            inner_client,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, HttpError> {
        Self::new(
            config.base_api_url.as_str(),
            config.access_token.as_ref(),
            config.request_timeout(),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn format_url(&self, path: &str) -> String {
        format!("{}/{path}", &self.base_url)
    }

    async fn get(
        &self,
        path: &str,
        query: &[(&str, u32)],
    ) -> Result<reqwest::Response, HttpError> {
        let url = self.format_url(path);
        log::debug!("GET {url} {query:?}");
        let response = self.inner_client.get(url).query(query).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(HttpError::Status(status, response.text().await?));
        }
        Ok(response)
    }

    /// Fetch one page of a collection.
    pub async fn get_page<T: DeserializeOwned>(
        &self,
        request: &PageRequest,
    ) -> Result<Page<T>, HttpError> {
        let path = page_path(request)?;
        let response = self
            .get(
                &path,
                &[("page", request.page), ("per_page", request.page_size)],
            )
            .await?;
        let header_total = total_from_headers(response.headers());
        let items: Vec<T> = ok_body(response).await?;

        let total_count = header_total.unwrap_or_else(|| {
            let estimate = estimated_total(request, items.len());
            log::warn!("{path}: missing {TOTAL_HEADER} header, assuming {estimate} items in total");
            estimate
        });
        Ok(Page::new(items, total_count))
    }

    /// Fetch one entity by id.
    pub async fn get_entity<T: DeserializeOwned>(
        &self,
        request: &EntityRequest,
    ) -> Result<T, HttpError> {
        let response = self
            .get(&format!("{}/{}", request.resource, request.id), &[])
            .await?;
        ok_body(response).await
    }
}

fn page_path(request: &PageRequest) -> Result<String, HttpError> {
    match (request.resource, request.parent) {
        (ResourceKind::Comments, Some(post_id)) => Ok(format!("posts/{post_id}/comments")),
        (ResourceKind::Comments, None) => Err(HttpError::MissingParent(request.resource)),
        (resource, _) => Ok(resource.to_string()),
    }
}

fn total_from_headers(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(TOTAL_HEADER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

/// Total to report when the server omits it: everything seen so far, plus
/// one more item after a full page so the next page stays reachable.
fn estimated_total(request: &PageRequest, received: usize) -> u64 {
    let seen = u64::from(request.page.saturating_sub(1)) * u64::from(request.page_size)
        + received as u64;
    if received as u64 >= u64::from(request.page_size) {
        seen + 1
    } else {
        seen
    }
}

/// Deserialize a successful response into the desired type.
async fn ok_body<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, HttpError> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Run `call` until it finishes or `token` is cancelled.
async fn cancellable<O>(
    token: &FetchToken,
    call: impl Future<Output = Result<O, HttpError>>,
) -> Result<O, TransportFailure> {
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(TransportFailure::cancelled()),
        result = call => result.map_err(|e| {
            log::debug!("request for {} failed: {e}", token.attempt());
            TransportFailure::from(e)
        }),
    }
}

impl<T> PagePort<T> for HttpClient
where
    T: DeserializeOwned + Send + 'static,
{
    fn fetch_page(&self, request: PageRequest, token: FetchToken) -> FetchFuture<Page<T>> {
        let client = self.clone();
        async move { cancellable(&token, client.get_page(&request)).await }.boxed()
    }
}

impl<T> EntityPort<T> for HttpClient
where
    T: DeserializeOwned + Send + 'static,
{
    fn fetch_entity(&self, request: EntityRequest, token: FetchToken) -> FetchFuture<T> {
        let client = self.clone();
        async move { cancellable(&token, client.get_entity(&request)).await }.boxed()
    }
}
