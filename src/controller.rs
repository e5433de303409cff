//! Binds user actions to the clients and draws the outcome into [`ViewState`].
//!
//! Results requests are split in two halves, `begin_*` and
//! [`Controller::apply_results`], so that overlapping requests can be issued
//! while only the most recently issued one gets to draw.

use crate::api::Backend;
use crate::config::Config;
use crate::data_models::{Query, SearchResponse};
use crate::document_client::DocumentClient;
use crate::error::{ClientError, ExportError};
use crate::pdf_exporter::{ExportedPdf, PdfExporter};
use crate::renderer::{Status, render_document, render_results, render_status};
use crate::search_client::SearchClient;
use crate::view::ViewState;

pub const EMPTY_QUERY_INLINE: &str = "Please enter a search query";
pub const EMPTY_QUERY_ALERT: &str = "Please enter a search query!";
pub const SEARCHING: &str = "Searching...";
pub const LOADING_RESULTS: &str = "Loading results...";
pub const SEARCH_FAILED: &str = "Error performing search";
pub const LOAD_FAILED: &str = "Error loading results";
pub const DOCUMENT_FAILED: &str = "Error loading document. Please try again.";

/// Identifies one results request. Later requests compare greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

#[derive(Debug, Default)]
pub struct RequestTracker {
    latest: u64,
}

impl RequestTracker {
    pub fn issue(&mut self) -> RequestToken {
        self.latest += 1;
        RequestToken(self.latest)
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        token.0 == self.latest
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultsKind {
    /// A fresh query starting at page 0.
    Search,
    /// Next or previous page of the query in the input field.
    Paginate,
}

/// A results request that has been issued but not yet drawn.
#[derive(Debug, Clone)]
pub struct PendingResults {
    pub token: RequestToken,
    pub query: Query,
    pub kind: ResultsKind,
}

/// Input events a front-end feeds into the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// The query field changed.
    Input(String),
    /// Enter pressed in the query field.
    Submit,
    Next,
    Prev,
    /// "View Document" on the result with this identifier.
    View(String),
    Download(usize),
    Close(usize),
}

pub struct Controller {
    search: SearchClient,
    documents: DocumentClient,
    exporter: PdfExporter,
    current_page: u32,
    requests: RequestTracker,
    pub view: ViewState,
}

impl Controller {
    pub fn new(config: &Config) -> Result<Self, ClientError> {
        let backend = Backend::new(config)?;
        Ok(Self::with_parts(
            SearchClient::new(backend.clone()),
            DocumentClient::new(backend),
            PdfExporter::with_lopdf(config.export_dir.clone()),
        ))
    }

    pub fn with_parts(search: SearchClient, documents: DocumentClient, exporter: PdfExporter) -> Self {
        Self {
            search,
            documents,
            exporter,
            current_page: 0,
            requests: RequestTracker::default(),
            view: ViewState::default(),
        }
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn search_client(&self) -> &SearchClient {
        &self.search
    }

    pub fn set_query(&mut self, text: impl Into<String>) {
        self.view.query_input = text.into();
    }

    /// Validates the query field and resets paging for a new query.
    /// Returns `None` when nothing should be sent.
    pub fn begin_search(&mut self) -> Option<PendingResults> {
        let query = match Query::new(&self.view.query_input, 0) {
            Ok(q) => q,
            Err(_) => {
                self.view.results_html = render_status(Status::Error, EMPTY_QUERY_INLINE);
                return None;
            }
        };

        self.current_page = 0;
        self.view.results_html = render_status(Status::Loading, SEARCHING);
        Some(PendingResults {
            token: self.requests.issue(),
            query,
            kind: ResultsKind::Search,
        })
    }

    pub fn begin_next(&mut self) -> Option<PendingResults> {
        if self.query_field_is_empty() {
            return None;
        }
        self.current_page = self.current_page.saturating_add(1);
        self.begin_paginate()
    }

    /// No-op at page 0.
    pub fn begin_prev(&mut self) -> Option<PendingResults> {
        if self.query_field_is_empty() {
            return None;
        }
        if self.current_page == 0 {
            return None;
        }
        self.current_page -= 1;
        self.begin_paginate()
    }

    /// Jumps straight to `page` of the query in the field.
    pub fn begin_page(&mut self, page: u32) -> Option<PendingResults> {
        if self.query_field_is_empty() {
            return None;
        }
        self.current_page = page;
        self.begin_paginate()
    }

    fn begin_paginate(&mut self) -> Option<PendingResults> {
        let query = Query::new(&self.view.query_input, self.current_page).ok()?;
        self.view.results_html = render_status(Status::Loading, LOADING_RESULTS);
        Some(PendingResults {
            token: self.requests.issue(),
            query,
            kind: ResultsKind::Paginate,
        })
    }

    fn query_field_is_empty(&mut self) -> bool {
        if self.view.query_input.trim().is_empty() {
            self.view.alert(EMPTY_QUERY_ALERT);
            return true;
        }
        false
    }

    /// Draws the outcome of `pending` unless a newer request was issued since.
    /// Returns whether anything was drawn.
    pub fn apply_results(
        &mut self,
        pending: &PendingResults,
        result: Result<SearchResponse, ClientError>,
    ) -> bool {
        if !self.requests.is_current(pending.token) {
            log::debug!(
                "discarding stale response for {:?} page {}",
                pending.query.text(),
                pending.query.page
            );
            return false;
        }

        match result {
            Ok(response) => {
                self.view.results_html = render_results(&response);
                self.view.result_ids = response.docs.iter().map(|d| d.tid.clone()).collect();
                self.update_pagination_display();
                if pending.kind == ResultsKind::Search {
                    self.view.pagination.visible = true;
                }
            }
            Err(e) => {
                let message = match pending.kind {
                    ResultsKind::Search => {
                        log::error!("Search error: {:#}", e);
                        SEARCH_FAILED
                    }
                    ResultsKind::Paginate => {
                        log::error!("Fetch results error: {:#}", e);
                        LOAD_FAILED
                    }
                };
                self.view.results_html = render_status(Status::Error, message);
                self.view.result_ids.clear();
            }
        }
        true
    }

    fn update_pagination_display(&mut self) {
        self.view.pagination.label = format!("Page {}", self.current_page);
        self.view.pagination.prev.disabled = self.current_page == 0;
    }

    async fn run(&mut self, pending: Option<PendingResults>) -> bool {
        let Some(pending) = pending else {
            return false;
        };
        let result = self.search.fetch(&pending.query).await;
        self.apply_results(&pending, result)
    }

    /// New search for whatever is in the query field.
    pub async fn search(&mut self) -> bool {
        let pending = self.begin_search();
        self.run(pending).await
    }

    pub async fn next_page(&mut self) -> bool {
        let pending = self.begin_next();
        self.run(pending).await
    }

    pub async fn prev_page(&mut self) -> bool {
        let pending = self.begin_prev();
        self.run(pending).await
    }

    pub async fn paginate(&mut self, page: u32) -> bool {
        let pending = self.begin_page(page);
        self.run(pending).await
    }

    /// Fetches a document and pushes a new modal for it.
    pub async fn view_document(&mut self, id: &str) -> bool {
        match self.documents.fetch_document(id).await {
            Ok(detail) => {
                self.view.modals.push(render_document(&detail));
                true
            }
            Err(e) => {
                log::error!("Error fetching document: {:#}", e);
                self.view.alert(DOCUMENT_FAILED);
                false
            }
        }
    }

    /// Views the result at `index` in the current list.
    pub async fn view_result(&mut self, index: usize) -> bool {
        match self.view.result_ids.get(index).cloned() {
            Some(id) => self.view_document(&id).await,
            None => false,
        }
    }

    pub fn download(&mut self, index: usize) -> Result<ExportedPdf, ExportError> {
        self.exporter.export(&mut self.view, index)
    }

    pub async fn handle(&mut self, event: UiEvent) {
        match event {
            UiEvent::Input(text) => self.set_query(text),
            UiEvent::Submit => {
                self.search().await;
            }
            UiEvent::Next => {
                self.next_page().await;
            }
            UiEvent::Prev => {
                self.prev_page().await;
            }
            UiEvent::View(id) => {
                self.view_document(&id).await;
            }
            UiEvent::Download(index) => {
                // failures are already logged and alerted by the exporter
                let _ = self.download(index);
            }
            UiEvent::Close(index) => {
                self.view.close_modal(index);
            }
        }
    }
}
