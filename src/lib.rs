//! # consent-pdf
//!
//! A page-native layout engine for consent documents.
//!
//! A consent form is a fixed frame (header, agreements, signature) around a
//! block of caller-authored rich text. The rich text is the hard part: it has
//! to wrap, number its lists and break across pages without the frame around
//! it falling apart. Content here is laid **into** pages. Every block asks
//! for vertical room before it draws, and the answer may be a fresh page.
//!
//! ## Architecture
//!
//! ```text
//! Input (JSON / ConsentDocument)
//!       ↓
//!   [model]    document bag, markup tree, HTML fragment parsing
//!       ↓
//!   [style]    inherited text style per markup element
//!       ↓
//!   [layout]   flatten markup to instructions, flow them into pages
//!       ↓
//!   [compose]  header, body, agreements, signature, footers
//!       ↓
//!   [pdf]      serialize to PDF bytes
//! ```
//!
//! Composition never fails. Unavailable images become placeholder boxes and
//! unusable fonts fall back to Helvetica; only reading the input can error.

pub mod compose;
pub mod config;
pub mod error;
pub mod font;
pub mod image_loader;
pub mod layout;
pub mod model;
pub mod pdf;
pub mod style;
pub mod text;

pub use compose::DocumentComposer;
pub use config::LayoutConfig;
pub use error::{Error, Result};
pub use image_loader::{ImageFetcher, NoFetch};
pub use model::{ConsentDocument, MarkupNode};

use font::FontContext;
use layout::Page;
use pdf::PdfWriter;

/// Render a document to PDF bytes. Remote image URLs are treated as
/// unavailable; use [`render_with`] to resolve them.
pub fn render(document: &ConsentDocument) -> Result<Vec<u8>> {
    render_with(document, &NoFetch)
}

/// Render a document to PDF bytes, fetching remote images through `fetcher`.
pub fn render_with(document: &ConsentDocument, fetcher: &dyn ImageFetcher) -> Result<Vec<u8>> {
    let fonts = FontContext::with_fonts(&document.fonts);
    let pages = compose_pages(document, &fonts, fetcher);
    PdfWriter::new().write(&pages, &document.metadata, &fonts)
}

/// Lay out a document without serializing it.
pub fn compose(document: &ConsentDocument) -> Vec<Page> {
    let fonts = FontContext::with_fonts(&document.fonts);
    compose_pages(document, &fonts, &NoFetch)
}

fn compose_pages(document: &ConsentDocument, fonts: &FontContext, fetcher: &dyn ImageFetcher) -> Vec<Page> {
    DocumentComposer::new(&document.config, fonts, fetcher).compose(document)
}

/// Render a document described as JSON to PDF bytes.
pub fn render_json(json: &str) -> Result<Vec<u8>> {
    let document: ConsentDocument = serde_json::from_str(json)?;
    render(&document)
}

/// Render a document and base64-encode the PDF for transport.
pub fn render_base64(document: &ConsentDocument) -> Result<String> {
    use base64::Engine;
    let bytes = render(document)?;
    Ok(base64::engine::general_purpose::STANDARD.encode(bytes))
}
