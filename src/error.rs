use thiserror::Error;

/// Everything that can go wrong while talking to the search service.
///
/// Callers surface these as one generic message per action; the variants
/// only exist so the logs say what actually happened.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("search query is empty")]
    EmptyQuery,

    #[error("invalid backend url: {0}")]
    InvalidUrl(String),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP error! status: {0}")]
    Status(reqwest::StatusCode),

    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Document content is incomplete or missing (id: {0})")]
    MissingContent(String),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("pdf assembly failed: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("could not extract text from document markup: {0}")]
    Text(#[from] html2text::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no open document at index {0}")]
    NoSuchModal(usize),

    #[error("pdf renderer failed: {0}")]
    Renderer(String),
}
