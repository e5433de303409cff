use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ClientError;

/// Free text plus a zero-based page number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    text: String,
    pub page: u32,
}

impl Query {
    /// Trims the input and rejects it if nothing is left.
    pub fn new(text: &str, page: u32) -> Result<Query, ClientError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ClientError::EmptyQuery);
        }
        Ok(Query {
            text: text.to_string(),
            page,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SearchResultItem {
    #[serde(default)]
    pub title: Option<String>,
    /// Snippet with the matched terms highlighted; may hold markup.
    #[serde(default)]
    pub headline: Option<String>,
    #[serde(default)]
    pub docsource: Option<String>,
    #[serde(default)]
    pub posted_date: Option<String>,
    #[serde(deserialize_with = "opaque_id")]
    pub tid: String,
}

/// Results in the order the server ranked them.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResponse {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub docs: Vec<SearchResultItem>,
}

impl SearchResponse {
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }
}

/// Full content of one document. Lives only as long as the modal showing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentDetail {
    pub tid: String,
    pub title: Option<String>,
    pub content: String,
}

/// Identifiers arrive as strings from some backends and as integers from others.
fn opaque_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Int(i64),
        Unsigned(u64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Int(n) => n.to_string(),
        RawId::Unsigned(n) => n.to_string(),
    })
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<SearchResultItem>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<SearchResultItem>>::deserialize(deserializer)?.unwrap_or_default())
}
