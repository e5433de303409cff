use anyhow::Result;
use serde_json::json;
use std::sync::{Arc, Mutex};

use docsearch::api::Backend;
use docsearch::config::Config;
use docsearch::controller::{Controller, DOCUMENT_FAILED, UiEvent};
use docsearch::document_client::DocumentClient;
use docsearch::error::{ClientError, ExportError};
use docsearch::pdf_exporter::{EXPORT_FAILED, PdfExporter, PdfOptions, PdfRenderer};
use docsearch::search_client::SearchClient;
use docsearch::view::DOWNLOAD_LABEL;

mod test_helpers {
    use axum::extract::{Path, State};
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};
    use axum::routing::post;
    use axum::{Json, Router};
    use std::collections::HashMap;

    use super::*;

    #[derive(Clone, Default)]
    pub struct DocState {
        pub docs: Arc<HashMap<String, serde_json::Value>>,
        pub requested: Arc<Mutex<Vec<String>>>,
    }

    async fn doc_handler(State(state): State<DocState>, Path(id): Path<String>) -> Response {
        state.requested.lock().unwrap().push(id.clone());
        match state.docs.get(&id) {
            Some(body) => Json(body.clone()).into_response(),
            None => (StatusCode::NOT_FOUND, "no such document").into_response(),
        }
    }

    pub async fn spawn_backend(docs: Vec<(&str, serde_json::Value)>) -> Result<(String, DocState)> {
        let state = DocState {
            docs: Arc::new(docs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()),
            ..Default::default()
        };
        let app = Router::new()
            .route("/doc/:id/", post(doc_handler))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Ok((format!("http://{addr}/"), state))
    }

    pub fn report() -> serde_json::Value {
        json!({
            "title": "Annual Report: 2020/21",
            "doc": "<p>Revenue grew.</p><script>steal()</script>\n<p>Costs fell.</p>"
        })
    }

    pub fn controller_with(base_url: &str, exporter: PdfExporter) -> Controller {
        let backend = Backend::new(&Config::new(base_url)).unwrap();
        Controller::with_parts(
            SearchClient::new(backend.clone()),
            DocumentClient::new(backend),
            exporter,
        )
    }

    /// Remembers what it was handed and optionally fails.
    pub struct RecordingRenderer {
        pub seen: Arc<Mutex<Vec<(String, PdfOptions)>>>,
        pub fail: bool,
    }

    impl PdfRenderer for RecordingRenderer {
        fn render(&self, markup: &str, options: &PdfOptions) -> Result<Vec<u8>, ExportError> {
            self.seen
                .lock()
                .unwrap()
                .push((markup.to_string(), options.clone()));
            if self.fail {
                return Err(ExportError::Renderer("canvas tainted".into()));
            }
            Ok(b"%PDF-fake".to_vec())
        }
    }
}

use test_helpers::*;

#[tokio::test]
async fn test_fetch_document_returns_content() -> Result<()> {
    let (base, state) = spawn_backend(vec![("42", report())]).await?;
    let client = DocumentClient::from_config(&Config::new(base))?;

    let detail = client.fetch_document("42").await?;
    assert_eq!(detail.tid, "42");
    assert_eq!(detail.title.as_deref(), Some("Annual Report: 2020/21"));
    assert!(detail.content.contains("Revenue grew."));
    assert_eq!(*state.requested.lock().unwrap(), vec!["42".to_string()]);
    Ok(())
}

#[tokio::test]
async fn test_missing_doc_field_is_an_error() -> Result<()> {
    let (base, _) = spawn_backend(vec![
        ("1", json!({ "title": "No body" })),
        ("2", json!({ "doc": "", "title": "Empty body" })),
        ("3", json!({ "doc": null })),
    ])
    .await?;
    let client = DocumentClient::from_config(&Config::new(base))?;

    for id in ["1", "2", "3"] {
        let err = client.fetch_document(id).await.unwrap_err();
        assert!(matches!(err, ClientError::MissingContent(ref got) if got == id));
    }
    Ok(())
}

#[tokio::test]
async fn test_failed_fetch_alerts_and_opens_no_modal() -> Result<()> {
    let (base, state) = spawn_backend(vec![("1", json!({ "title": "No body" }))]).await?;
    let mut c = Controller::new(&Config::new(base))?;

    assert!(!c.view_document("1").await);
    assert!(!c.view_document("404").await);

    assert!(c.view.modals.is_empty());
    assert_eq!(
        c.view.take_alerts(),
        vec![DOCUMENT_FAILED.to_string(), DOCUMENT_FAILED.to_string()]
    );
    assert_eq!(state.requested.lock().unwrap().len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_modal_content_is_sanitized_and_modals_stack() -> Result<()> {
    let (base, _) = spawn_backend(vec![("42", report())]).await?;
    let mut c = Controller::new(&Config::new(base))?;

    c.handle(UiEvent::View("42".into())).await;
    c.handle(UiEvent::View("42".into())).await;
    assert_eq!(c.view.modals.len(), 2);

    let modal = &c.view.modals[0];
    assert_eq!(modal.title, "Annual Report: 2020/21");
    assert!(!modal.content_html.contains("script"));
    assert!(!modal.content_html.contains("steal"));
    assert!(modal.content_html.contains("<p class=\"doc-paragraph\">Revenue grew.</p>"));
    assert!(modal.content_html.contains("<br>"));
    assert_eq!(modal.download.label, DOWNLOAD_LABEL);

    c.handle(UiEvent::Close(0)).await;
    assert_eq!(c.view.modals.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_export_writes_pdf_and_restores_button() -> Result<()> {
    let (base, _) = spawn_backend(vec![("42", report())]).await?;
    let dir = tempfile::tempdir()?;
    let mut c = controller_with(&base, PdfExporter::with_lopdf(dir.path()));

    assert!(c.view_document("42").await);
    let before = c.view.modals[0].clone();
    let pdf = c.download(0)?;

    assert_eq!(pdf.filename, "Annual_Report__2020_21.pdf");
    assert_eq!(pdf.path, dir.path().join("Annual_Report__2020_21.pdf"));
    let bytes = std::fs::read(&pdf.path)?;
    assert!(bytes.starts_with(b"%PDF"));
    assert_eq!(bytes.len(), pdf.size);

    assert_eq!(c.view.modals[0], before);
    assert!(c.view.staging.is_empty());
    assert!(c.view.pending_alerts().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_export_renders_a_copy_of_modal_content() -> Result<()> {
    let (base, _) = spawn_backend(vec![("42", report())]).await?;
    let dir = tempfile::tempdir()?;
    let seen = Arc::new(Mutex::new(Vec::new()));
    let renderer = RecordingRenderer {
        seen: seen.clone(),
        fail: false,
    };
    let mut c = controller_with(&base, PdfExporter::new(Box::new(renderer), dir.path()));

    c.view_document("42").await;
    c.download(0)?;

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    let (markup, options) = &seen[0];
    assert!(markup.starts_with("<div style=\"width: 100%\">"));
    assert!(markup.contains(&c.view.modals[0].content_html));
    assert_eq!(options.filename, "Annual_Report__2020_21.pdf");
    assert_eq!(options.margin, [0.5; 4]);
    Ok(())
}

#[tokio::test]
async fn test_failed_export_alerts_and_restores_button() -> Result<()> {
    let (base, _) = spawn_backend(vec![("42", report())]).await?;
    let dir = tempfile::tempdir()?;
    let renderer = RecordingRenderer {
        seen: Arc::new(Mutex::new(Vec::new())),
        fail: true,
    };
    let mut c = controller_with(&base, PdfExporter::new(Box::new(renderer), dir.path()));

    c.view_document("42").await;
    let err = c.download(0).unwrap_err();
    assert!(matches!(err, ExportError::Renderer(_)));

    let button = &c.view.modals[0].download;
    assert_eq!(button.label, DOWNLOAD_LABEL);
    assert!(!button.disabled);
    assert!(c.view.staging.is_empty());
    assert_eq!(c.view.take_alerts(), vec![EXPORT_FAILED.to_string()]);
    assert!(std::fs::read_dir(dir.path())?.next().is_none());
    Ok(())
}

#[tokio::test]
async fn test_export_without_open_document() -> Result<()> {
    let (base, _) = spawn_backend(vec![]).await?;
    let mut c = Controller::new(&Config::new(base))?;

    assert!(matches!(c.download(0), Err(ExportError::NoSuchModal(0))));
    assert!(c.view.pending_alerts().is_empty());
    Ok(())
}
