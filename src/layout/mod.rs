//! # Page-Aware Layout
//!
//! Content is laid INTO pages. There is no tall canvas sliced afterwards:
//! every block asks for room before it draws, and the answer may be "not on
//! this page". That question is the one seam between what a document needs
//! and how pages are managed:
//!
//! ```text
//!   MarkupNode ──[flatten]──▶ DrawInstruction* ──[flow]──▶ LayoutSurface
//!                                                           │ request_room(h, y) -> y'
//!   DocumentComposer ── header / checkboxes / signature ────┘ draw(DrawCommand)
//! ```
//!
//! All coordinates are millimetres from the top-left corner of the page.

pub mod flatten;
pub mod flow;
pub mod page_break;

use crate::config::{Edges, LayoutConfig};
use crate::image_loader::LoadedImage;
use crate::style::{Color, TextStyle};

use page_break::{decide_break, BreakDecision};

/// An axis-aligned box in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// One absolutely positioned drawing primitive.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// A run of text; `y` is the baseline. Only font and color are taken
    /// from `style`, decorations are separate commands.
    Text {
        x: f64,
        y: f64,
        content: String,
        style: TextStyle,
    },
    /// A straight stroke (rules, underlines, check marks).
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        width: f64,
        color: Color,
    },
    /// A rectangle, filled and/or outlined.
    Rect {
        rect: Rect,
        fill: Option<Color>,
        stroke: Option<Color>,
        line_width: f64,
    },
    /// A raster image stretched to `rect`.
    Image { rect: Rect, image: LoadedImage },
}

/// A finished page.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub width: f64,
    pub height: f64,
    pub commands: Vec<DrawCommand>,
}

impl Page {
    /// All text drawn on this page, in drawing order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text { content, .. } => Some(content.as_str()),
            _ => None,
        })
    }
}

/// Page size and margins, fixed for a whole document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f64,
    pub height: f64,
    pub margin: Edges,
}

impl PageGeometry {
    pub fn from_config(config: &LayoutConfig) -> Self {
        let (width, height) = config.page_size.dimensions();
        Self {
            width,
            height,
            margin: config.margin,
        }
    }

    pub fn content_width(&self) -> f64 {
        self.width - self.margin.horizontal()
    }

    pub fn content_height(&self) -> f64 {
        self.height - self.margin.vertical()
    }

    pub fn left(&self) -> f64 {
        self.margin.left
    }

    pub fn right(&self) -> f64 {
        self.width - self.margin.right
    }

    pub fn top(&self) -> f64 {
        self.margin.top
    }

    /// Lowest y content may reach.
    pub fn bottom_limit(&self) -> f64 {
        self.height - self.margin.bottom
    }
}

/// Where layout steps put their output and ask for vertical room.
pub trait LayoutSurface {
    /// Ask for `height` of vertical space starting at `y`. Returns the y to
    /// draw at: `y` itself, or the top of a fresh page.
    fn request_room(&mut self, height: f64, y: f64) -> f64;

    /// Draw on the current page.
    fn draw(&mut self, command: DrawCommand);
}

/// The growing collection of pages for one document.
#[derive(Debug, Clone)]
pub struct PageStack {
    geometry: PageGeometry,
    pages: Vec<Page>,
}

impl PageStack {
    /// Start with one empty page.
    pub fn new(geometry: PageGeometry) -> Self {
        let mut stack = Self {
            geometry,
            pages: Vec::new(),
        };
        stack.new_page();
        stack
    }

    pub fn new_page(&mut self) {
        self.pages.push(Page {
            width: self.geometry.width,
            height: self.geometry.height,
            commands: Vec::new(),
        });
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Stamp something onto every page after layout (footers).
    pub fn for_each_page(&mut self, mut stamp: impl FnMut(usize, usize, &mut Page)) {
        let total = self.pages.len();
        for (index, page) in self.pages.iter_mut().enumerate() {
            stamp(index, total, page);
        }
    }

    pub fn into_pages(self) -> Vec<Page> {
        self.pages
    }
}

impl LayoutSurface for PageStack {
    fn request_room(&mut self, height: f64, y: f64) -> f64 {
        match decide_break(y, height, self.geometry.top(), self.geometry.bottom_limit()) {
            BreakDecision::Place => y,
            BreakDecision::NewPage => {
                self.new_page();
                log::debug!(
                    "page break before {:.1}mm block at y={:.1}, now {} pages",
                    height,
                    y,
                    self.pages.len()
                );
                self.geometry.top()
            }
        }
    }

    fn draw(&mut self, command: DrawCommand) {
        if let Some(page) = self.pages.last_mut() {
            page.commands.push(command);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry() -> PageGeometry {
        PageGeometry::from_config(&LayoutConfig::default())
    }

    #[test]
    fn a4_geometry() {
        let g = geometry();
        assert_eq!(g.content_width(), 180.0);
        assert_eq!(g.content_height(), 267.0);
        assert_eq!(g.bottom_limit(), 282.0);
    }

    #[test]
    fn room_request_breaks_and_resets_to_top() {
        let mut stack = PageStack::new(geometry());
        assert_eq!(stack.request_room(10.0, 100.0), 100.0);
        assert_eq!(stack.page_count(), 1);
        assert_eq!(stack.request_room(10.0, 280.0), 15.0);
        assert_eq!(stack.page_count(), 2);
    }

    #[test]
    fn draw_targets_the_last_page() {
        let mut stack = PageStack::new(geometry());
        stack.new_page();
        stack.draw(DrawCommand::Line {
            x1: 0.0,
            y1: 0.0,
            x2: 1.0,
            y2: 1.0,
            width: 0.1,
            color: Color::BLACK,
        });
        let pages = stack.into_pages();
        assert!(pages[0].commands.is_empty());
        assert_eq!(pages[1].commands.len(), 1);
    }
}
