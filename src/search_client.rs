use crate::api::Backend;
use crate::api::models::SearchRequest;
use crate::config::Config;
use crate::data_models::{Query, SearchResponse};
use crate::error::ClientError;

/// Issues search and pagination requests. Holds no page state of its own;
/// the controller decides which page to ask for.
#[derive(Debug, Clone)]
pub struct SearchClient {
    backend: Backend,
}

impl SearchClient {
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }

    pub fn from_config(config: &Config) -> Result<Self, ClientError> {
        Ok(Self::new(Backend::new(config)?))
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    /// First page of results for a new query.
    pub async fn search(&self, text: &str) -> Result<SearchResponse, ClientError> {
        self.fetch(&Query::new(text, 0)?).await
    }

    pub async fn paginate(&self, text: &str, page: u32) -> Result<SearchResponse, ClientError> {
        self.fetch(&Query::new(text, page)?).await
    }

    pub async fn fetch(&self, query: &Query) -> Result<SearchResponse, ClientError> {
        let body = SearchRequest {
            form_input: query.text().to_string(),
            pagenum: query.page,
        };
        let url = self.backend.search_url()?;
        let response: SearchResponse = self.backend.post_json(url, Some(&body)).await?;
        log::info!(
            "search {:?} page {} returned {} docs",
            query.text(),
            query.page,
            response.len()
        );
        Ok(response)
    }
}
