use serde::{Deserialize, Serialize};

/// Body of `POST /search/`. Field names are fixed by the service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchRequest {
    #[serde(rename = "formInput")]
    pub form_input: String,
    pub pagenum: u32,
}

/// Body of a `POST /doc/{id}/` reply.
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct DocumentPayload {
    #[serde(default)]
    pub doc: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}
