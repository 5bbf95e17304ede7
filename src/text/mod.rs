//! # Line Building
//!
//! The pending-line buffer used by the paginator. Words are measured as they
//! arrive, with their trailing space included, so inter-word spacing is part
//! of each word's width rather than something added at placement time.
//!
//! A [`LineBuilder`] only knows widths and heights. Where the line goes
//! vertically is decided by the caller after asking the page for room;
//! [`Line::place`] then turns it into draw commands.

use crate::font::{FontContext, PT_TO_MM};
use crate::layout::{DrawCommand, Rect};
use crate::style::{TextAlign, TextStyle};

/// Fraction of the line height between line top and text baseline.
pub const BASELINE_RATIO: f64 = 0.75;

/// Height of a line of text set at `font_size` points.
pub fn line_height(font_size: f64, ratio: f64) -> f64 {
    font_size * PT_TO_MM * ratio
}

/// One measured word, trailing space included.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    pub text: String,
    /// Width including the trailing space.
    pub width: f64,
    /// Width without the trailing space.
    pub trimmed_width: f64,
    pub style: TextStyle,
}

impl LineItem {
    pub fn measure(word: &str, style: &TextStyle, fonts: &FontContext) -> Self {
        let text = format!("{} ", word);
        Self {
            width: fonts.measure(&text, style),
            trimmed_width: fonts.measure(word, style),
            text,
            style: style.clone(),
        }
    }
}

/// Accumulates words until the line is full.
#[derive(Debug, Clone)]
pub struct LineBuilder {
    items: Vec<LineItem>,
    width: f64,
    line_height: f64,
    ratio: f64,
}

impl LineBuilder {
    pub fn new(ratio: f64) -> Self {
        Self {
            items: Vec::new(),
            width: 0.0,
            line_height: 0.0,
            ratio,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    /// Height of the tallest item buffered so far.
    pub fn line_height(&self) -> f64 {
        self.line_height
    }

    /// Whether `item` would push a non-empty line past `available`. An empty
    /// line accepts anything, so an overlong word gets a line of its own.
    pub fn overflows(&self, item: &LineItem, available: f64) -> bool {
        !self.items.is_empty() && self.width + item.width > available
    }

    pub fn push(&mut self, item: LineItem) {
        self.width += item.width;
        self.line_height = self
            .line_height
            .max(line_height(item.style.font_size, self.ratio));
        self.items.push(item);
    }

    /// Hand over the buffered line and start a fresh one.
    pub fn take(&mut self) -> Line {
        let line = Line {
            items: std::mem::take(&mut self.items),
            width: self.width,
            height: self.line_height,
        };
        self.width = 0.0;
        self.line_height = 0.0;
        line
    }
}

/// A finished line, ready to be placed.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub items: Vec<LineItem>,
    pub width: f64,
    pub height: f64,
}

impl Line {
    fn align(&self) -> TextAlign {
        self.items
            .first()
            .map(|item| item.style.align)
            .unwrap_or_default()
    }

    /// Draw commands for this line with its top at `y`, within the span
    /// `[x, x + available]`. `wrapped` says the line ended because the next
    /// word did not fit; only such lines are stretched when justified.
    pub fn place(&self, x: f64, y: f64, available: f64, height: f64, wrapped: bool) -> Vec<DrawCommand> {
        let mut commands = Vec::with_capacity(self.items.len() * 2);
        let slack = (available - self.width).max(0.0);

        // Justified lines replace the baked-in spaces with an even gap.
        let (mut cursor, even_gap) = match self.align() {
            TextAlign::Left => (x, None),
            TextAlign::Center => (x + slack / 2.0, None),
            TextAlign::Right => (x + slack, None),
            TextAlign::Justify if wrapped && self.items.len() > 1 => {
                let words: f64 = self.items.iter().map(|item| item.trimmed_width).sum();
                let gap = (available - words).max(0.0) / (self.items.len() - 1) as f64;
                (x, Some(gap))
            }
            TextAlign::Justify => (x, None),
        };
        let baseline = y + height * BASELINE_RATIO;

        for item in &self.items {
            let advance = match even_gap {
                Some(gap) => item.trimmed_width + gap,
                None => item.width,
            };
            if let Some(background) = item.style.background {
                commands.push(DrawCommand::Rect {
                    rect: Rect::new(cursor, y, advance, height),
                    fill: Some(background),
                    stroke: None,
                    line_width: 0.0,
                });
            }
            commands.push(DrawCommand::Text {
                x: cursor,
                y: baseline,
                content: item.text.clone(),
                style: item.style.clone(),
            });
            if item.style.underline {
                let size_mm = item.style.font_size * PT_TO_MM;
                let underline_y = baseline + size_mm * 0.12;
                commands.push(DrawCommand::Line {
                    x1: cursor,
                    y1: underline_y,
                    x2: cursor + item.trimmed_width,
                    y2: underline_y,
                    width: (size_mm * 0.06).max(0.1),
                    color: item.style.color,
                });
            }
            cursor += advance;
        }
        commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Color;

    fn courier() -> TextStyle {
        TextStyle::new("Courier", 10.0)
    }

    fn char_mm() -> f64 {
        6.0 * PT_TO_MM
    }

    fn build(words: &[&str], style: &TextStyle) -> LineBuilder {
        let fonts = FontContext::new();
        let mut builder = LineBuilder::new(1.4);
        for word in words {
            builder.push(LineItem::measure(word, style, &fonts));
        }
        builder
    }

    fn text_xs(commands: &[DrawCommand]) -> Vec<f64> {
        commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { x, .. } => Some(*x),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn words_carry_their_trailing_space() {
        let item = LineItem::measure("ab", &courier(), &FontContext::new());
        assert_eq!(item.text, "ab ");
        assert!((item.width - 3.0 * char_mm()).abs() < 1e-9);
        assert!((item.trimmed_width - 2.0 * char_mm()).abs() < 1e-9);
    }

    #[test]
    fn empty_line_accepts_overlong_word() {
        let fonts = FontContext::new();
        let builder = LineBuilder::new(1.4);
        let item = LineItem::measure("extraordinarily", &courier(), &fonts);
        assert!(!builder.overflows(&item, 1.0));
    }

    #[test]
    fn tallest_item_sets_line_height() {
        let fonts = FontContext::new();
        let mut builder = build(&["small"], &courier());
        builder.push(LineItem::measure("big", &courier().with_size(20.0), &fonts));
        assert!((builder.line_height() - line_height(20.0, 1.4)).abs() < 1e-9);
        let line = builder.take();
        assert_eq!(line.items.len(), 2);
        assert!(builder.is_empty());
        assert_eq!(builder.width(), 0.0);
    }

    fn aligned(line: &Line, align: TextAlign) -> Line {
        let mut line = line.clone();
        for item in &mut line.items {
            item.style.align = align;
        }
        line
    }

    #[test]
    fn alignment_offsets() {
        let line = build(&["abc"], &courier()).take();
        let w = line.width;
        assert_eq!(text_xs(&line.place(10.0, 0.0, 100.0, 5.0, false)), vec![10.0]);
        let cx = text_xs(&aligned(&line, TextAlign::Center).place(10.0, 0.0, 100.0, 5.0, false))[0];
        assert!((cx - (10.0 + (100.0 - w) / 2.0)).abs() < 1e-9);
        let rx = text_xs(&aligned(&line, TextAlign::Right).place(10.0, 0.0, 100.0, 5.0, false))[0];
        assert!((rx - (10.0 + 100.0 - w)).abs() < 1e-9);
    }

    #[test]
    fn justified_wrapped_line_spans_available_width() {
        let style = courier().with_align(TextAlign::Justify);
        let line = build(&["aa", "bb", "cc"], &style).take();
        let xs = text_xs(&line.place(0.0, 0.0, 50.0, 5.0, true));
        let last_end = xs[2] + 2.0 * char_mm();
        assert!((last_end - 50.0).abs() < 1e-9);
        // Last line of a block is not stretched.
        let xs = text_xs(&line.place(0.0, 0.0, 50.0, 5.0, false));
        assert!((xs[1] - 3.0 * char_mm()).abs() < 1e-9);
    }

    #[test]
    fn background_precedes_text_and_underline_is_trimmed() {
        let mut style = courier();
        style.background = Some(Color::rgb(1.0, 1.0, 0.0));
        style.underline = true;
        let line = build(&["hi"], &style).take();
        let commands = line.place(0.0, 0.0, 100.0, 5.0, false);
        assert!(matches!(commands[0], DrawCommand::Rect { .. }));
        assert!(matches!(commands[1], DrawCommand::Text { .. }));
        match commands[2] {
            DrawCommand::Line { x1, x2, .. } => assert!((x2 - x1 - 2.0 * char_mm()).abs() < 1e-9),
            ref other => panic!("expected underline, got {:?}", other),
        }
    }

    #[test]
    fn baseline_sits_inside_line() {
        let line = build(&["x"], &courier()).take();
        match &line.place(0.0, 20.0, 100.0, 4.0, false)[0] {
            DrawCommand::Text { y, .. } => assert!((*y - 23.0).abs() < 1e-9),
            other => panic!("unexpected {:?}", other),
        }
    }
}
