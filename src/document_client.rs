use crate::api::Backend;
use crate::api::models::DocumentPayload;
use crate::config::Config;
use crate::data_models::DocumentDetail;
use crate::error::ClientError;

#[derive(Debug, Clone)]
pub struct DocumentClient {
    backend: Backend,
}

impl DocumentClient {
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }

    pub fn from_config(config: &Config) -> Result<Self, ClientError> {
        Ok(Self::new(Backend::new(config)?))
    }

    /// A reply without a non-empty `doc` field counts as a failure even when
    /// the HTTP exchange itself succeeded.
    pub async fn fetch_document(&self, id: &str) -> Result<DocumentDetail, ClientError> {
        let url = self.backend.document_url(id)?;
        let payload: DocumentPayload = self.backend.post_json::<(), _>(url, None).await?;

        match payload.doc {
            Some(content) if !content.is_empty() => Ok(DocumentDetail {
                tid: id.to_string(),
                title: payload.title.filter(|t| !t.trim().is_empty()),
                content,
            }),
            _ => Err(ClientError::MissingContent(id.to_string())),
        }
    }
}
