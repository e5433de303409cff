//! The page the controller draws into.
//!
//! Everything a browser would keep in the DOM lives here as plain data so a
//! front-end (or a test) can inspect it after every action.

use crate::sanitizer::escape_html;

pub const DOWNLOAD_LABEL: &str = "📥 Download PDF";

/// A clickable control with a label and an enabled flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub disabled: bool,
}

impl Button {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            disabled: false,
        }
    }
}

/// An open document view. Modals stack; a new one is pushed for every view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Modal {
    pub tid: String,
    pub title: String,
    /// Already sanitized.
    pub content_html: String,
    pub download: Button,
}

impl Modal {
    pub fn markup(&self) -> String {
        format!(
            r#"<div class="modal" data-doc-id="{tid}">
    <div class="modal-content">
        <div class="modal-header">
            <h2>{title}</h2>
            <div class="header-controls">
                <button class="download-btn"{disabled}>{label}</button>
                <span class="close">✖</span>
            </div>
        </div>
        <div class="document-content">
            {content}
        </div>
    </div>
</div>"#,
            tid = escape_html(&self.tid),
            title = escape_html(&self.title),
            disabled = if self.download.disabled { " disabled" } else { "" },
            label = escape_html(&self.download.label),
            content = self.content_html,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    /// Hidden until the first successful search.
    pub visible: bool,
    pub label: String,
    pub prev: Button,
    pub next: Button,
}

impl Pagination {
    fn initial() -> Self {
        Self {
            visible: false,
            label: "Page 0".to_string(),
            prev: Button {
                label: "Previous".to_string(),
                disabled: true,
            },
            next: Button::new("Next"),
        }
    }
}

/// Off-screen containers holding copies of modal content during export.
#[derive(Debug, Default)]
pub struct StagingArea {
    next_id: u64,
    containers: Vec<(u64, String)>,
}

impl StagingArea {
    /// Adds a container holding `markup` and returns its handle.
    pub fn stage(&mut self, markup: String) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.containers
            .push((id, format!(r#"<div style="width: 100%">{markup}</div>"#)));
        id
    }

    pub fn get(&self, id: u64) -> Option<&str> {
        self.containers
            .iter()
            .find(|(cid, _)| *cid == id)
            .map(|(_, m)| m.as_str())
    }

    pub fn remove(&mut self, id: u64) {
        self.containers.retain(|(cid, _)| *cid != id);
    }

    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.containers.len()
    }
}

#[derive(Debug)]
pub struct ViewState {
    /// Current value of the query field.
    pub query_input: String,
    /// Markup of the results area.
    pub results_html: String,
    /// Identifiers behind the "View Document" controls, in display order.
    pub result_ids: Vec<String>,
    pub pagination: Pagination,
    pub modals: Vec<Modal>,
    pub staging: StagingArea,
    alerts: Vec<String>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            query_input: String::new(),
            results_html: String::new(),
            result_ids: Vec::new(),
            pagination: Pagination::initial(),
            modals: Vec::new(),
            staging: StagingArea::default(),
            alerts: Vec::new(),
        }
    }
}

impl ViewState {
    /// Queues a blocking alert for the front-end.
    pub fn alert(&mut self, message: impl Into<String>) {
        self.alerts.push(message.into());
    }

    pub fn pending_alerts(&self) -> &[String] {
        &self.alerts
    }

    pub fn take_alerts(&mut self) -> Vec<String> {
        std::mem::take(&mut self.alerts)
    }

    pub fn close_modal(&mut self, index: usize) -> Option<Modal> {
        (index < self.modals.len()).then(|| self.modals.remove(index))
    }
}
