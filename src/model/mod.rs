//! # Document Model
//!
//! The input representation for the engine. A consent document is a flat
//! data bag (names, logo, checkbox states, signature, dates) plus one rich-text
//! body expressed as a simplified markup tree.
//!
//! Both halves deserialize from JSON so a host can hand the engine exactly
//! what its form collected. The body may also arrive as an HTML fragment,
//! which [`MarkupNode::parse_html`] turns into the same tree.

pub mod markup;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::LayoutConfig;

/// A node in the simplified markup tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MarkupNode {
    Element(Element),
    Text { content: String },
}

/// A markup element. Only the attributes that affect styling are kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Lowercase tag name.
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    /// Raw inline `style` attribute.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default)]
    pub children: Vec<MarkupNode>,
}

impl MarkupNode {
    /// Create an element node with no class or inline style.
    pub fn element(tag: &str, children: Vec<MarkupNode>) -> Self {
        MarkupNode::Element(Element {
            tag: tag.to_ascii_lowercase(),
            class: None,
            style: None,
            children,
        })
    }

    /// Create a text node.
    pub fn text(content: &str) -> Self {
        MarkupNode::Text {
            content: content.to_string(),
        }
    }

    /// Concatenated raw text of this subtree, whitespace preserved.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            MarkupNode::Text { content } => out.push_str(content),
            MarkupNode::Element(el) => {
                if el.tag == "br" {
                    out.push('\n');
                }
                for child in &el.children {
                    child.collect_text(out);
                }
            }
        }
    }
}

/// Which of the two header arrangements to draw.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HeaderLayout {
    /// Logo on the left, title block stacked to its right.
    #[default]
    Portrait,
    /// Logo centered on its own band, centered title beneath.
    Wide,
}

/// One bold-label / value line in the header (player name, ID, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfoLine {
    pub label: String,
    pub value: String,
}

impl InfoLine {
    pub fn new(label: &str, value: &str) -> Self {
        Self {
            label: label.to_string(),
            value: value.to_string(),
        }
    }
}

/// An agreement checkbox and its wording.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckboxItem {
    pub label: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub checked: bool,
}

/// A caller-supplied TrueType font.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FontEntry {
    /// Family name that `LayoutConfig::font_family` or class hints refer to.
    pub family: String,
    /// Base64-encoded font data, or a data URI (e.g. "data:font/ttf;base64,...").
    pub src: String,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
}

/// Document metadata embedded in the PDF.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
}

/// Everything needed to build one consent document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentDocument {
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub header_layout: HeaderLayout,
    /// Logo as a data URL, remote URL or raw base64.
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub info_lines: Vec<InfoLine>,

    /// Already-parsed body tree. Takes precedence over `body_html`.
    #[serde(default)]
    pub body: Option<MarkupNode>,
    /// Body as an HTML fragment.
    #[serde(default)]
    pub body_html: Option<String>,

    #[serde(default)]
    pub mandatory: CheckboxItem,
    #[serde(default)]
    pub optional: CheckboxItem,

    /// Captured signature raster (usually a PNG data URL).
    #[serde(default)]
    pub signature: Option<String>,
    /// Consent date. Defaults to today.
    #[serde(default)]
    pub consent_date: Option<NaiveDate>,
    #[serde(default)]
    pub version: String,

    #[serde(default)]
    pub fonts: Vec<FontEntry>,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub config: LayoutConfig,
}

impl ConsentDocument {
    /// The body tree, parsing `body_html` if no tree was given.
    pub fn body_tree(&self) -> Option<MarkupNode> {
        if let Some(body) = &self.body {
            return Some(body.clone());
        }
        self.body_html.as_deref().map(MarkupNode::parse_html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markup_node_json_shape() {
        let json = r#"{
            "type": "element", "tag": "p", "class": "ql-align-center",
            "children": [ { "type": "text", "content": "Hi" } ]
        }"#;
        let node: MarkupNode = serde_json::from_str(json).unwrap();
        match node {
            MarkupNode::Element(el) => {
                assert_eq!(el.tag, "p");
                assert_eq!(el.class.as_deref(), Some("ql-align-center"));
                assert_eq!(el.children, vec![MarkupNode::text("Hi")]);
            }
            _ => panic!("expected element"),
        }
    }

    #[test]
    fn text_content_keeps_whitespace() {
        let node = MarkupNode::element(
            "pre",
            vec![
                MarkupNode::text("a  b\n"),
                MarkupNode::element("span", vec![MarkupNode::text("  c")]),
            ],
        );
        assert_eq!(node.text_content(), "a  b\n  c");
    }

    #[test]
    fn document_defaults() {
        let doc: ConsentDocument = serde_json::from_str(r#"{ "title": "Consent" }"#).unwrap();
        assert_eq!(doc.header_layout, HeaderLayout::Portrait);
        assert!(doc.body_tree().is_none());
        assert!(!doc.mandatory.checked);
        assert_eq!(doc.config.list_indent, 5.0);
    }

    #[test]
    fn body_tree_prefers_parsed_tree() {
        let doc = ConsentDocument {
            body: Some(MarkupNode::text("tree")),
            body_html: Some("<p>html</p>".to_string()),
            ..Default::default()
        };
        assert_eq!(doc.body_tree(), Some(MarkupNode::text("tree")));
    }

    #[test]
    fn consent_date_parses_iso() {
        let doc: ConsentDocument =
            serde_json::from_str(r#"{ "title": "t", "consentDate": "2024-02-29" }"#).unwrap();
        assert_eq!(doc.consent_date, NaiveDate::from_ymd_opt(2024, 2, 29));
    }
}
