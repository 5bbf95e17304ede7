//! # Layout Configuration
//!
//! Every constant the composer and the body layout depend on, in one serde
//! struct. All lengths are millimetres, all font sizes points. Every field has
//! a default, so a document may carry a partial `config` object or none.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::style::{Color, TagSizes, DEFAULT_FONT_FAMILY};

/// Standard page sizes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PageSize {
    #[default]
    A4,
    A5,
    Letter,
    Legal,
    Custom {
        width: f64,
        height: f64,
    },
}

impl PageSize {
    /// Returns (width, height) in millimetres.
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            PageSize::A4 => (210.0, 297.0),
            PageSize::A5 => (148.0, 210.0),
            PageSize::Letter => (215.9, 279.4),
            PageSize::Legal => (215.9, 355.6),
            PageSize::Custom { width, height } => (*width, *height),
        }
    }
}

/// Edge values (top, right, bottom, left) in millimetres.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Edges {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Edges {
    pub fn uniform(v: f64) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}

/// Width and height of a reserved box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxSize {
    pub width: f64,
    pub height: f64,
}

impl BoxSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Caller-visible fixed strings. Translation happens upstream; the caller
/// passes the localized text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Labels {
    pub agreements_title: String,
    pub signature_title: String,
    pub required_marker: String,
    pub required_annotation: String,
    pub signature_missing: String,
    pub logo_missing: String,
    pub consent_date: String,
    pub valid_until: String,
    pub document_version: String,
    /// Footer template; `{page}` and `{total}` are substituted.
    pub page_footer: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            agreements_title: "Agreements".to_string(),
            signature_title: "Signature information".to_string(),
            required_marker: "*".to_string(),
            required_annotation: "(required)".to_string(),
            signature_missing: "Signature not provided".to_string(),
            logo_missing: "Logo".to_string(),
            consent_date: "Consent date:".to_string(),
            valid_until: "Valid until:".to_string(),
            document_version: "Document version:".to_string(),
            page_footer: "Page {page} of {total}".to_string(),
        }
    }
}

impl Labels {
    pub fn footer(&self, page: usize, total: usize) -> String {
        self.page_footer
            .replace("{page}", &page.to_string())
            .replace("{total}", &total.to_string())
    }
}

/// Layout constants for one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    pub page_size: PageSize,
    pub margin: Edges,

    pub font_family: String,
    pub font_size: f64,
    pub title_size: f64,
    pub subtitle_size: f64,
    pub info_size: f64,
    pub section_title_size: f64,
    pub h1_size: f64,
    pub h2_size: f64,
    pub pre_size: f64,
    pub footer_size: f64,
    pub link_color: Color,
    pub required_color: Color,
    pub rule_color: Color,

    /// Horizontal indent per list nesting level.
    pub list_indent: f64,
    /// Extra space after h1/h2 blocks.
    pub heading_spacing: f64,
    /// Space between header, sections and blocks.
    pub block_spacing: f64,

    pub portrait_logo: BoxSize,
    pub wide_logo: BoxSize,
    pub signature_box: BoxSize,
    pub checkbox_size: f64,

    /// Years added to the consent date for the expiry line.
    pub validity_years: u32,
    /// chrono strftime pattern for dates.
    pub date_format: String,

    pub labels: Labels,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            page_size: PageSize::A4,
            margin: Edges::uniform(15.0),
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            font_size: 10.0,
            title_size: 16.0,
            subtitle_size: 11.0,
            info_size: 9.0,
            section_title_size: 12.0,
            h1_size: 16.0,
            h2_size: 13.0,
            pre_size: 9.0,
            footer_size: 8.0,
            link_color: Color::rgb8(0, 102, 204),
            required_color: Color::rgb8(200, 30, 30),
            rule_color: Color::rgb8(160, 160, 160),
            list_indent: 5.0,
            heading_spacing: 2.0,
            block_spacing: 4.0,
            portrait_logo: BoxSize::new(30.0, 30.0),
            wide_logo: BoxSize::new(60.0, 20.0),
            signature_box: BoxSize::new(60.0, 25.0),
            checkbox_size: 4.0,
            validity_years: 1,
            date_format: "%d/%m/%Y".to_string(),
            labels: Labels::default(),
        }
    }
}

impl LayoutConfig {
    /// Read a JSON config file. Missing fields take their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read '{}': {}", path.display(), e)))?;
        serde_json::from_str(&raw)
            .map_err(|e| Error::Config(format!("invalid config '{}': {}", path.display(), e)))
    }

    pub fn tag_sizes(&self) -> TagSizes {
        TagSizes {
            h1: self.h1_size,
            h2: self.h2_size,
            link_color: self.link_color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let cfg: LayoutConfig =
            serde_json::from_str(r#"{ "listIndent": 8, "labels": { "requiredAnnotation": "(obligatoire)" } }"#)
                .unwrap();
        assert_eq!(cfg.list_indent, 8.0);
        assert_eq!(cfg.labels.required_annotation, "(obligatoire)");
        assert_eq!(cfg.labels.required_marker, "*");
        assert_eq!(cfg.page_size, PageSize::A4);
        assert_eq!(cfg.margin, Edges::uniform(15.0));
    }

    #[test]
    fn custom_page_size() {
        let cfg: LayoutConfig =
            serde_json::from_str(r#"{ "pageSize": { "custom": { "width": 100, "height": 50 } } }"#)
                .unwrap();
        assert_eq!(cfg.page_size.dimensions(), (100.0, 50.0));
    }

    #[test]
    fn page_size_names_are_camel_case() {
        assert_eq!(serde_json::to_string(&PageSize::A4).unwrap(), r#""a4""#);
        assert_eq!(serde_json::to_string(&PageSize::Letter).unwrap(), r#""letter""#);
        let cfg: LayoutConfig = serde_json::from_str(r#"{ "pageSize": "legal" }"#).unwrap();
        assert_eq!(cfg.page_size, PageSize::Legal);
    }

    #[test]
    fn footer_template() {
        let labels = Labels::default();
        assert_eq!(labels.footer(2, 3), "Page 2 of 3");
    }

    #[test]
    fn from_file_reports_missing_file() {
        let err = LayoutConfig::from_file(Path::new("/nonexistent/config.json")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn from_file_reads_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.json");
        std::fs::write(&path, r#"{ "validityYears": 3 }"#).unwrap();
        let cfg = LayoutConfig::from_file(&path).unwrap();
        assert_eq!(cfg.validity_years, 3);
    }
}
