use html5ever::tendril::TendrilSink;
use html5ever::{Attribute, parse_document};
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use std::cell::RefCell;

/// Class every paragraph gets so the document view can style it.
pub const PARAGRAPH_CLASS: &str = "doc-paragraph";

/// Removed together with everything inside them.
const DROPPED_ELEMENTS: &[&str] = &[
    "script", "iframe", "frame", "frameset", "object", "embed", "applet", "style", "noscript",
    "template", "link", "meta", "base", "title", "form", "input", "button", "textarea",
    "select", "svg", "math",
];

/// Kept as elements. Anything else is unwrapped to its children.
const ALLOWED_ELEMENTS: &[&str] = &[
    "p", "br", "hr", "b", "strong", "i", "em", "u", "s", "mark", "small", "sub", "sup", "span",
    "div", "h1", "h2", "h3", "h4", "h5", "h6", "blockquote", "pre", "code", "ul", "ol", "li",
    "dl", "dt", "dd", "table", "thead", "tbody", "tfoot", "tr", "td", "th", "caption", "a",
    "img",
];

const VOID_ELEMENTS: &[&str] = &["br", "hr", "img"];

const SAFE_SCHEMES: &[&str] = &["http", "https", "mailto"];

/// Allow-list HTML cleaner for document bodies and search headlines.
///
/// The input is parsed as a full document, so stray `<head>`-only content is
/// handled by the same walk as the body. The output is re-serialized from the
/// tree; nothing from the input reaches the output without passing the lists
/// above.
#[derive(Debug, Default)]
pub struct HtmlSanitizer;

impl HtmlSanitizer {
    pub fn get_dom(html: &str) -> std::io::Result<RcDom> {
        parse_document(RcDom::default(), Default::default())
            .from_utf8()
            .read_from(&mut std::io::Cursor::new(html))
    }

    pub fn sanitize(&self, content: &str) -> String {
        match Self::get_dom(content) {
            Ok(dom) => {
                let mut out = String::with_capacity(content.len());
                Self::walk_html(&dom.document, false, &mut out);
                out
            }
            Err(e) => {
                log::warn!("could not parse document markup, falling back to plain text: {e}");
                text_to_markup(content, false)
            }
        }
    }

    fn walk_html(handle: &Handle, in_pre: bool, out: &mut String) {
        match &handle.data {
            NodeData::Text { contents } => {
                out.push_str(&text_to_markup(&contents.borrow(), in_pre));
            }
            NodeData::Element { name, attrs, .. } => {
                let local: &str = &name.local;

                if DROPPED_ELEMENTS.contains(&local) {
                    return;
                }

                if !ALLOWED_ELEMENTS.contains(&local) {
                    for child in handle.children.borrow().iter() {
                        Self::walk_html(child, in_pre, out);
                    }
                    return;
                }

                out.push('<');
                out.push_str(local);
                if local == "p" {
                    out.push_str(&format!(" class=\"{PARAGRAPH_CLASS}\""));
                }
                Self::write_attributes(local, attrs, out);
                out.push('>');

                if VOID_ELEMENTS.contains(&local) {
                    return;
                }

                let in_pre = in_pre || local == "pre";
                for child in handle.children.borrow().iter() {
                    Self::walk_html(child, in_pre, out);
                }

                out.push_str("</");
                out.push_str(local);
                out.push('>');
            }
            // comments, doctypes and processing instructions are dropped
            NodeData::Comment { .. }
            | NodeData::Doctype { .. }
            | NodeData::ProcessingInstruction { .. } => {}
            NodeData::Document => {
                for child in handle.children.borrow().iter() {
                    Self::walk_html(child, in_pre, out);
                }
            }
        }
    }

    fn write_attributes(element: &str, attrs: &RefCell<Vec<Attribute>>, out: &mut String) {
        for attr in attrs.borrow().iter() {
            let name: &str = &attr.name.local;
            let value: &str = &attr.value;

            let keep = match (element, name) {
                (_, "title") => true,
                ("a", "href") => is_safe_url(value, SAFE_SCHEMES),
                ("img", "src") => is_safe_url(value, &["http", "https"]),
                ("img", "alt") => true,
                ("td" | "th", "colspan" | "rowspan") => value.chars().all(|c| c.is_ascii_digit()),
                ("ol", "start") => value.chars().all(|c| c.is_ascii_digit()),
                _ => false,
            };

            if keep {
                out.push_str(&format!(" {}=\"{}\"", name, escape_attr(value)));
            }
        }
    }
}

/// Sanitizes with the default allow-lists.
pub fn sanitize(content: &str) -> String {
    HtmlSanitizer.sanitize(content)
}

/// Escapes text for use between tags.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn escape_attr(value: &str) -> String {
    escape_html(value)
}

/// Escaped text with literal newlines turned into `<br>` outside of `<pre>`.
fn text_to_markup(text: &str, in_pre: bool) -> String {
    let escaped = escape_html(text);
    if in_pre {
        escaped
    } else {
        escaped.replace("\r\n", "\n").replace('\n', "<br>")
    }
}

/// Relative URLs pass; absolute ones need a scheme from `allowed`.
fn is_safe_url(raw: &str, allowed: &[&str]) -> bool {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();

    let scheme_end = cleaned.find(':');
    let path_start = cleaned.find(['/', '?', '#']);
    match (scheme_end, path_start) {
        (Some(colon), Some(path)) if path < colon => true,
        (Some(colon), _) => allowed.contains(&&cleaned[..colon]),
        (None, _) => true,
    }
}
