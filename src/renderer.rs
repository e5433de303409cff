use crate::data_models::{DocumentDetail, SearchResponse, SearchResultItem};
use crate::sanitizer::{escape_html, sanitize};
use crate::view::{Button, DOWNLOAD_LABEL, Modal};

pub const NO_RESULTS: &str = r#"<p class="no-results">No results found</p>"#;

/// Status line shown in the results area (loading, errors).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Loading,
    Error,
}

pub fn render_status(status: Status, message: &str) -> String {
    let class = match status {
        Status::Loading => "loading",
        Status::Error => "error",
    };
    format!(r#"<p class="{class}">{}</p>"#, escape_html(message))
}

/// One entry per item, in response order. The view control carries the
/// identifier as data instead of an inline handler.
pub fn render_results(response: &SearchResponse) -> String {
    if response.is_empty() {
        return NO_RESULTS.to_string();
    }

    response
        .docs
        .iter()
        .map(render_item)
        .collect::<Vec<_>>()
        .join("")
}

fn render_item(item: &SearchResultItem) -> String {
    let title = item
        .title
        .as_deref()
        .filter(|t| !t.is_empty())
        .unwrap_or("Untitled");
    let headline = item.headline.as_deref().map(sanitize).unwrap_or_default();

    format!(
        r#"
<div class="result-item">
    <h3>{}</h3>
    <div class="fragment">{}</div>
    <div class="meta-info">
        <span class="source">{}</span>
        <span class="date">{}</span>
    </div>
    <button class="view-doc-btn" data-doc-id="{}">View Document</button>
</div>
"#,
        escape_html(title),
        headline,
        escape_html(item.docsource.as_deref().unwrap_or("")),
        escape_html(item.posted_date.as_deref().unwrap_or("")),
        escape_html(&item.tid),
    )
}

/// Builds a fresh modal for a fetched document. Never reuses an open one.
pub fn render_document(detail: &DocumentDetail) -> Modal {
    let title = detail
        .title
        .clone()
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| "Document".to_string());
    let content = if detail.content.is_empty() {
        "No content available"
    } else {
        detail.content.as_str()
    };

    Modal {
        tid: detail.tid.clone(),
        title,
        content_html: sanitize(content),
        download: Button::new(DOWNLOAD_LABEL),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(tid: &str, title: Option<&str>) -> SearchResultItem {
        SearchResultItem {
            title: title.map(String::from),
            headline: Some("a <b>cat</b> sat".into()),
            docsource: Some("Gazette".into()),
            posted_date: Some("2021-03-04".into()),
            tid: tid.into(),
        }
    }

    #[test]
    fn test_empty_response_renders_no_results() {
        let html = render_results(&SearchResponse::default());
        assert!(html.contains("no-results"));
        assert!(!html.contains("result-item"));
    }

    #[test]
    fn test_missing_title_defaults_to_untitled() {
        let resp = SearchResponse {
            docs: vec![item("1", None)],
        };
        let html = render_results(&resp);
        assert!(html.contains("<h3>Untitled</h3>"));
        assert!(html.contains("<b>cat</b>"));
        assert!(html.contains("Gazette"));
        assert!(html.contains("2021-03-04"));
        assert!(html.contains(r#"data-doc-id="1""#));
    }

    #[test]
    fn test_items_keep_response_order() {
        let resp = SearchResponse {
            docs: vec![item("b", Some("Second")), item("a", Some("First"))],
        };
        let html = render_results(&resp);
        let second = html.find("Second").unwrap();
        let first = html.find("First").unwrap();
        assert!(second < first);
        assert_eq!(html.matches("View Document").count(), 2);
    }

    #[test]
    fn test_title_and_id_are_escaped() {
        let resp = SearchResponse {
            docs: vec![item("x\"onmouseover=\"y", Some("<script>x</script>"))],
        };
        let html = render_results(&resp);
        assert!(!html.contains("<script>"));
        assert!(html.contains("data-doc-id=\"x&quot;onmouseover=&quot;y\""));
    }

    #[test]
    fn test_document_modal_is_sanitized() {
        let modal = render_document(&DocumentDetail {
            tid: "9".into(),
            title: None,
            content: "<p>hi</p><script>bad()</script>".into(),
        });
        assert_eq!(modal.title, "Document");
        assert_eq!(modal.content_html, "<p class=\"doc-paragraph\">hi</p>");
        assert!(!modal.download.disabled);
    }

    #[test]
    fn test_status_markup() {
        assert_eq!(
            render_status(Status::Error, "Error performing search"),
            r#"<p class="error">Error performing search</p>"#
        );
    }
}
