//! # Document Composition
//!
//! Lays out the fixed structure of a consent document, top to bottom:
//!
//! 1. header (portrait or wide variant)
//! 2. rule
//! 3. rich-text body, when there is any
//! 4. agreements title, mandatory and optional checkboxes
//! 5. signature title, signature block
//!
//! and finally stamps a footer on every page. Every block asks the
//! [`PageStack`] for room before drawing, so header, checkboxes and signature
//! break across pages under the same rule as body text.
//!
//! Composition cannot fail. Missing images become placeholders and
//! unusable markup is dropped, so a document always comes out.

use std::fmt::Write;

use chrono::{Local, Months, NaiveDate};

use crate::config::LayoutConfig;
use crate::font::FontContext;
use crate::image_loader::{ImageFetcher, ImageInliner};
use crate::layout::flatten::{flatten, DrawInstruction, FlattenOptions, LINE_HEIGHT_RATIO};
use crate::layout::flow::Paginator;
use crate::layout::{DrawCommand, LayoutSurface, Page, PageGeometry, PageStack, Rect};
use crate::model::{CheckboxItem, ConsentDocument, HeaderLayout, InfoLine};
use crate::style::{Color, TextAlign, TextStyle};
use crate::text::line_height;

/// Gap between the portrait logo and the title column.
const LOGO_GAP: f64 = 5.0;
/// Gap between a checkbox square and its caption.
const CHECKBOX_GAP: f64 = 2.0;
/// Gap between the signature box and its info column.
const SIGNATURE_GAP: f64 = 8.0;
const RULE_WIDTH: f64 = 0.3;
const FOOTER_COLOR: Color = Color {
    r: 0.4,
    g: 0.4,
    b: 0.4,
    a: 1.0,
};

/// Builds the pages of one document.
pub struct DocumentComposer<'a> {
    config: &'a LayoutConfig,
    fonts: &'a FontContext,
    images: ImageInliner<'a>,
    geometry: PageGeometry,
    today: NaiveDate,
}

impl<'a> DocumentComposer<'a> {
    pub fn new(config: &'a LayoutConfig, fonts: &'a FontContext, fetcher: &'a dyn ImageFetcher) -> Self {
        Self {
            config,
            fonts,
            images: ImageInliner::new(fetcher),
            geometry: PageGeometry::from_config(config),
            today: Local::now().date_naive(),
        }
    }

    /// The date used when the document carries no consent date.
    pub fn today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn compose(&self, doc: &ConsentDocument) -> Vec<Page> {
        let mut stack = PageStack::new(self.geometry);
        let spacing = self.config.block_spacing;

        let mut y = self.header(doc, &mut stack);
        y = self.rule(y, &mut stack);

        if let Some(tree) = doc.body_tree() {
            let options = FlattenOptions {
                sizes: self.config.tag_sizes(),
                list_indent: self.config.list_indent,
                heading_spacing: self.config.heading_spacing,
            };
            let instructions = flatten(&tree, &self.base_style(), &options);
            if !instructions.is_empty() {
                y = self.paginator(self.geometry.left(), self.geometry.content_width())
                    .layout(&instructions, y, &mut stack);
                y += spacing;
            }
        }

        y = self.section_title(&self.config.labels.agreements_title, y, &mut stack);
        y = self.checkbox(&doc.mandatory, true, y, &mut stack);
        y = self.checkbox(&doc.optional, false, y, &mut stack);
        y += spacing;

        y = self.section_title(&self.config.labels.signature_title, y, &mut stack);
        let end = self.signature(doc, y, &mut stack);
        log::debug!("composed document ending at y={:.1}mm", end);

        self.stamp_footers(&mut stack);
        log::debug!("composed {} page(s)", stack.page_count());
        stack.into_pages()
    }

    fn base_style(&self) -> TextStyle {
        TextStyle::new(&self.config.font_family, self.config.font_size)
    }

    fn sized(&self, size: f64) -> TextStyle {
        self.base_style().with_size(size)
    }

    fn paginator(&self, x: f64, width: f64) -> Paginator<'a> {
        Paginator::new(self.fonts, x, width).pre_size(self.config.pre_size)
    }

    // ── Header ────────────────────────────────────────────────────

    /// Draw the header and return the y below it.
    fn header(&self, doc: &ConsentDocument, stack: &mut PageStack) -> f64 {
        match doc.header_layout {
            HeaderLayout::Portrait => self.header_portrait(doc, stack),
            HeaderLayout::Wide => self.header_wide(doc, stack),
        }
    }

    fn header_portrait(&self, doc: &ConsentDocument, stack: &mut PageStack) -> f64 {
        let top = self.geometry.top();
        let logo = self.config.portrait_logo;
        let bounds = Rect::new(self.geometry.left(), top, logo.width, logo.height);
        self.draw_logo(doc.logo.as_deref(), bounds, stack);

        let column_x = self.geometry.left() + logo.width + LOGO_GAP;
        let column_width = self.geometry.content_width() - logo.width - LOGO_GAP;
        let mut instructions = self.title_block(doc, TextAlign::Left);
        instructions.extend(self.info_block(&doc.info_lines));
        let column_end = self
            .paginator(column_x, column_width)
            .layout(&instructions, top, stack);

        column_end.max(top + logo.height)
    }

    fn header_wide(&self, doc: &ConsentDocument, stack: &mut PageStack) -> f64 {
        let top = self.geometry.top();
        let logo = self.config.wide_logo;
        let x = self.geometry.left() + (self.geometry.content_width() - logo.width) / 2.0;
        self.draw_logo(doc.logo.as_deref(), Rect::new(x, top, logo.width, logo.height), stack);

        let mut instructions = self.title_block(doc, TextAlign::Center);
        instructions.extend(self.info_block(&doc.info_lines));
        self.paginator(self.geometry.left(), self.geometry.content_width())
            .layout(&instructions, top + logo.height + LOGO_GAP, stack)
    }

    fn draw_logo(&self, src: Option<&str>, bounds: Rect, stack: &mut PageStack) {
        let caption = self.sized(self.config.info_size);
        let src = src.filter(|s| !s.trim().is_empty());
        for command in self.images.place(src, bounds, &self.config.labels.logo_missing, self.fonts, &caption) {
            stack.draw(command);
        }
    }

    fn title_block(&self, doc: &ConsentDocument, align: TextAlign) -> Vec<DrawInstruction> {
        let mut out = vec![
            DrawInstruction::Text {
                content: doc.title.clone(),
                style: self.sized(self.config.title_size).bold().with_align(align),
            },
            DrawInstruction::Newline {
                extra_spacing: Some(1.0),
            },
        ];
        if let Some(subtitle) = doc.subtitle.as_ref().filter(|s| !s.trim().is_empty()) {
            out.push(DrawInstruction::Text {
                content: subtitle.clone(),
                style: self.sized(self.config.subtitle_size).with_align(align),
            });
            out.push(DrawInstruction::Newline {
                extra_spacing: Some(1.0),
            });
        }
        out
    }

    /// Bold label, then the value, one wrapped line each.
    fn info_block(&self, lines: &[InfoLine]) -> Vec<DrawInstruction> {
        let style = self.sized(self.config.info_size);
        let mut out = Vec::with_capacity(lines.len() * 3);
        for line in lines {
            out.push(DrawInstruction::Text {
                content: line.label.clone(),
                style: style.clone().bold(),
            });
            out.push(DrawInstruction::Text {
                content: line.value.clone(),
                style: style.clone(),
            });
            out.push(DrawInstruction::Newline {
                extra_spacing: None,
            });
        }
        out
    }

    // ── Sections ──────────────────────────────────────────────────

    /// A horizontal rule across the content width, with half the block
    /// spacing above and below it.
    fn rule<S: LayoutSurface + ?Sized>(&self, y: f64, surface: &mut S) -> f64 {
        let spacing = self.config.block_spacing;
        let y = surface.request_room(spacing, y);
        let line_y = y + spacing / 2.0;
        surface.draw(DrawCommand::Line {
            x1: self.geometry.left(),
            y1: line_y,
            x2: self.geometry.right(),
            y2: line_y,
            width: RULE_WIDTH,
            color: self.config.rule_color,
        });
        y + spacing
    }

    fn section_title<S: LayoutSurface + ?Sized>(&self, title: &str, y: f64, surface: &mut S) -> f64 {
        let instructions = [DrawInstruction::Text {
            content: title.to_string(),
            style: self.sized(self.config.section_title_size).bold(),
        }];
        let y = self
            .paginator(self.geometry.left(), self.geometry.content_width())
            .layout(&instructions, y, surface);
        self.rule(y, surface)
    }

    /// One agreement line: square, optional check mark, then the caption
    /// wrapped beside the square. Required items carry a leading marker and
    /// a trailing annotation in the required color.
    pub fn checkbox<S: LayoutSurface + ?Sized>(
        &self,
        item: &CheckboxItem,
        required: bool,
        y: f64,
        surface: &mut S,
    ) -> f64 {
        let size = self.config.checkbox_size;
        let first_line = line_height(self.config.font_size, LINE_HEIGHT_RATIO);
        let y = surface.request_room(first_line.max(size), y);

        let x = self.geometry.left();
        let box_y = y + (first_line - size).max(0.0) / 2.0;
        surface.draw(DrawCommand::Rect {
            rect: Rect::new(x, box_y, size, size),
            fill: None,
            stroke: Some(Color::BLACK),
            line_width: RULE_WIDTH,
        });
        if item.checked {
            for (x1, y1, x2, y2) in check_mark(x, box_y, size) {
                surface.draw(DrawCommand::Line {
                    x1,
                    y1,
                    x2,
                    y2,
                    width: 0.5,
                    color: Color::BLACK,
                });
            }
        }

        let labels = &self.config.labels;
        let base = self.base_style();
        let accent = base.clone().with_color(self.config.required_color);
        let mut instructions = Vec::with_capacity(4);
        if required {
            instructions.push(DrawInstruction::Text {
                content: labels.required_marker.clone(),
                style: accent.clone(),
            });
        }
        instructions.push(DrawInstruction::Text {
            content: item.label.clone(),
            style: base.clone().bold(),
        });
        instructions.push(DrawInstruction::Text {
            content: item.description.clone(),
            style: base,
        });
        if required {
            instructions.push(DrawInstruction::Text {
                content: labels.required_annotation.clone(),
                style: accent,
            });
        }

        let text_x = x + size + CHECKBOX_GAP;
        let text_width = self.geometry.content_width() - size - CHECKBOX_GAP;
        let end = self.paginator(text_x, text_width).layout(&instructions, y, surface);
        end.max(box_y + size) + self.config.block_spacing / 2.0
    }

    /// Signature bitmap (or placeholder) on the left, consent date, expiry
    /// and version on the right. Advances by the taller of the two.
    fn signature<S: LayoutSurface + ?Sized>(&self, doc: &ConsentDocument, y: f64, surface: &mut S) -> f64 {
        let labels = &self.config.labels;
        let sig = self.config.signature_box;
        let info_line = line_height(self.config.info_size, LINE_HEIGHT_RATIO);
        let height = sig.height.max(3.0 * info_line);
        let y = surface.request_room(height, y);

        let src = doc.signature.as_deref().filter(|s| !s.trim().is_empty());
        if src.is_none() {
            log::warn!("no signature captured, drawing placeholder");
        }
        let bounds = Rect::new(self.geometry.left(), y, sig.width, sig.height);
        let caption = self.sized(self.config.info_size);
        for command in self
            .images
            .place(src, bounds, &labels.signature_missing, self.fonts, &caption)
        {
            surface.draw(command);
        }

        let consent_date = doc.consent_date.unwrap_or(self.today);
        let expiry = expiry_date(consent_date, self.config.validity_years);
        let info = [
            InfoLine::new(&labels.consent_date, &self.format_date(consent_date)),
            InfoLine::new(&labels.valid_until, &self.format_date(expiry)),
            InfoLine::new(&labels.document_version, &doc.version),
        ];
        let column_x = self.geometry.left() + sig.width + SIGNATURE_GAP;
        let column_width = self.geometry.content_width() - sig.width - SIGNATURE_GAP;
        let column_end = self
            .paginator(column_x, column_width)
            .layout(&self.info_block(&info), y, surface);

        column_end.max(y + height)
    }

    fn format_date(&self, date: NaiveDate) -> String {
        let mut out = String::new();
        if write!(out, "{}", date.format(&self.config.date_format)).is_err() {
            log::debug!("invalid date format '{}', using ISO", self.config.date_format);
            return date.format("%Y-%m-%d").to_string();
        }
        out
    }

    // ── Footer ────────────────────────────────────────────────────

    fn stamp_footers(&self, stack: &mut PageStack) {
        let style = self.sized(self.config.footer_size).with_color(FOOTER_COLOR);
        let geometry = self.geometry;
        let labels = &self.config.labels;
        let fonts = self.fonts;
        stack.for_each_page(|index, total, page| {
            let text = labels.footer(index + 1, total);
            let width = fonts.measure(&text, &style);
            page.commands.push(DrawCommand::Text {
                x: geometry.right() - width,
                y: geometry.height - geometry.margin.bottom / 2.0,
                content: text,
                style: style.clone(),
            });
        });
    }
}

/// The consent date moved forward by whole years. Feb 29 clamps to Feb 28,
/// and a result past the last representable date clamps to that date.
pub fn expiry_date(date: NaiveDate, years: u32) -> NaiveDate {
    date.checked_add_months(Months::new(years.saturating_mul(12)))
        .unwrap_or_else(|| {
            log::warn!("expiry of {} + {} years is out of range, clamping", date, years);
            NaiveDate::MAX
        })
}

/// Two strokes forming a tick inside the square at `(x, y)`.
fn check_mark(x: f64, y: f64, size: f64) -> [(f64, f64, f64, f64); 2] {
    let (kx, ky) = (x + size * 0.4, y + size * 0.78);
    [
        (x + size * 0.18, y + size * 0.52, kx, ky),
        (kx, ky, x + size * 0.84, y + size * 0.2),
    ]
}
