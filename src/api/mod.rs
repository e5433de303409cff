use reqwest::Url;
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::error::ClientError;

pub mod models;

/// Endpoint paths relative to the service root.
pub mod endpoints {
    pub const SEARCH: &str = "search/";
    pub const DOC: &str = "doc/";
}

/// Shared HTTP plumbing for the search and document clients.
#[derive(Debug, Clone)]
pub struct Backend {
    http: reqwest::Client,
    base: Url,
}

impl Backend {
    pub fn new(config: &Config) -> Result<Self, ClientError> {
        let base = parse_base(&config.base_url)?;
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            base,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub fn search_url(&self) -> Result<Url, ClientError> {
        self.base
            .join(endpoints::SEARCH)
            .map_err(|e| ClientError::InvalidUrl(e.to_string()))
    }

    /// `{base}/doc/{id}/` with the id escaped as a single path segment.
    pub fn document_url(&self, id: &str) -> Result<Url, ClientError> {
        let mut url = self
            .base
            .join(endpoints::DOC)
            .map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .push(id)
            .push("");
        Ok(url)
    }

    /// POSTs `body` as JSON (or an empty JSON-typed request) and decodes the reply.
    pub async fn post_json<B, R>(&self, url: Url, body: Option<&B>) -> Result<R, ClientError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let request = self
            .http
            .post(url.clone())
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let request = match body {
            Some(body) => request.json(body),
            None => request,
        };

        log::debug!("POST {url}");
        let res = request.send().await?;
        let status = res.status();
        if !status.is_success() {
            return Err(ClientError::Status(status));
        }
        let bytes = res.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Join semantics drop the last path segment unless it ends in `/`.
fn parse_base(raw: &str) -> Result<Url, ClientError> {
    let raw = raw.trim();
    let with_slash = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    let url = Url::parse(&with_slash).map_err(|e| ClientError::InvalidUrl(format!("{raw}: {e}")))?;
    if url.cannot_be_a_base() {
        return Err(ClientError::InvalidUrl(raw.to_string()));
    }
    Ok(url)
}
