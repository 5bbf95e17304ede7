//! # Body Flow
//!
//! Consumes draw instructions left to right and lays them into pages:
//! greedy word wrap within the content width, one room request per line,
//! bullets sharing a visual line with the first line of their item.
//!
//! The paginator owns no pages. Everything vertical goes through the
//! [`LayoutSurface`] it is handed, which is also how the document composer
//! reuses it for header info lines and checkbox captions.

use super::flatten::{DrawInstruction, LINE_HEIGHT_RATIO};
use super::{DrawCommand, LayoutSurface};
use crate::font::FontContext;
use crate::text::{line_height, LineBuilder, LineItem, BASELINE_RATIO};

/// Line-height ratio for preformatted lines.
pub const PRE_LINE_HEIGHT_RATIO: f64 = 1.2;

/// Lays out instruction sequences inside one horizontal band.
pub struct Paginator<'a> {
    fonts: &'a FontContext,
    origin_x: f64,
    content_width: f64,
    pre_size: f64,
}

impl<'a> Paginator<'a> {
    pub fn new(fonts: &'a FontContext, origin_x: f64, content_width: f64) -> Self {
        Self {
            fonts,
            origin_x,
            content_width,
            pre_size: 9.0,
        }
    }

    /// Point size for preformatted blocks.
    pub fn pre_size(mut self, size: f64) -> Self {
        self.pre_size = size;
        self
    }

    /// Lay out `instructions` starting at `y` and return the y below the
    /// last line. An empty sequence returns `y` unchanged.
    pub fn layout<S: LayoutSurface + ?Sized>(
        &self,
        instructions: &[DrawInstruction],
        y: f64,
        surface: &mut S,
    ) -> f64 {
        let mut cursor = Cursor {
            y,
            hanging: 0.0,
            bullet_height: None,
            line: LineBuilder::new(LINE_HEIGHT_RATIO),
        };

        for instruction in instructions {
            match instruction {
                DrawInstruction::Text { content, style } => {
                    for word in content.split(' ').filter(|w| !w.is_empty()) {
                        let item = LineItem::measure(word, style, self.fonts);
                        if cursor.line.overflows(&item, self.content_width - cursor.hanging) {
                            self.flush(&mut cursor, surface, true);
                        }
                        cursor.line.push(item);
                    }
                }
                DrawInstruction::Bullet {
                    label,
                    indent,
                    style,
                } => {
                    self.flush(&mut cursor, surface, false);
                    let height = line_height(style.font_size, LINE_HEIGHT_RATIO);
                    cursor.y = surface.request_room(height, cursor.y);
                    let x = self.origin_x + indent;
                    surface.draw(DrawCommand::Text {
                        x,
                        y: cursor.y + height * BASELINE_RATIO,
                        content: label.clone(),
                        style: style.clone(),
                    });
                    let label_width = self.fonts.measure(&format!("{} ", label), style);
                    cursor.hanging = (indent + label_width).min(self.content_width);
                    cursor.bullet_height = Some(height);
                }
                DrawInstruction::Pre { content, style } => {
                    self.flush(&mut cursor, surface, false);
                    let style = style.clone().with_size(self.pre_size);
                    let height = line_height(self.pre_size, PRE_LINE_HEIGHT_RATIO);
                    for line in content.split('\n') {
                        if line.trim().is_empty() {
                            continue;
                        }
                        cursor.y = surface.request_room(height, cursor.y);
                        surface.draw(DrawCommand::Text {
                            x: self.origin_x,
                            y: cursor.y + height * BASELINE_RATIO,
                            content: line.trim_end().to_string(),
                            style: style.clone(),
                        });
                        cursor.y += height;
                    }
                }
                DrawInstruction::Newline { extra_spacing } => {
                    self.flush(&mut cursor, surface, false);
                    cursor.y += extra_spacing.unwrap_or(0.0);
                    cursor.hanging = 0.0;
                }
            }
        }

        self.flush(&mut cursor, surface, false);
        cursor.y
    }

    /// Place the pending line and advance below it. A bullet with no text
    /// after it still takes up its own line.
    fn flush<S: LayoutSurface + ?Sized>(&self, cursor: &mut Cursor, surface: &mut S, wrapped: bool) {
        let bullet = cursor.bullet_height.take();
        if cursor.line.is_empty() {
            if let Some(height) = bullet {
                cursor.y += height;
            }
            return;
        }

        let line = cursor.line.take();
        let height = line.height.max(bullet.unwrap_or(0.0));
        cursor.y = surface.request_room(height, cursor.y);
        let available = self.content_width - cursor.hanging;
        for command in line.place(self.origin_x + cursor.hanging, cursor.y, available, height, wrapped) {
            surface.draw(command);
        }
        cursor.y += height;
    }
}

/// Mutable state of one layout pass.
struct Cursor {
    y: f64,
    /// Offset of wrapped lines from the origin, set by a bullet.
    hanging: f64,
    /// Height of a bullet already drawn on the current line.
    bullet_height: Option<f64>,
    line: LineBuilder,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::PT_TO_MM;
    use crate::layout::flatten::{flatten, FlattenOptions};
    use crate::layout::{PageGeometry, PageStack};
    use crate::config::LayoutConfig;
    use crate::model::MarkupNode;
    use crate::style::TextStyle;

    /// Records everything and never breaks pages.
    #[derive(Default)]
    struct Recorder {
        commands: Vec<DrawCommand>,
        requests: Vec<(f64, f64)>,
    }

    impl LayoutSurface for Recorder {
        fn request_room(&mut self, height: f64, y: f64) -> f64 {
            self.requests.push((height, y));
            y
        }

        fn draw(&mut self, command: DrawCommand) {
            self.commands.push(command);
        }
    }

    fn texts(commands: &[DrawCommand]) -> Vec<(f64, f64, String)> {
        commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { x, y, content, .. } => Some((*x, *y, content.clone())),
                _ => None,
            })
            .collect()
    }

    fn body(html: &str) -> Vec<DrawInstruction> {
        let tree = MarkupNode::parse_html(html);
        flatten(&tree, &TextStyle::default(), &FlattenOptions::default())
    }

    fn prose_line() -> f64 {
        10.0 * PT_TO_MM * 1.4
    }

    #[test]
    fn empty_sequence_keeps_y() {
        let fonts = FontContext::new();
        let mut rec = Recorder::default();
        let y = Paginator::new(&fonts, 15.0, 180.0).layout(&[], 42.0, &mut rec);
        assert_eq!(y, 42.0);
        assert!(rec.commands.is_empty());
    }

    #[test]
    fn mixed_runs_share_one_line() {
        let fonts = FontContext::new();
        let mut rec = Recorder::default();
        let y = Paginator::new(&fonts, 15.0, 1000.0).layout(&body("<p>Hello <b>world</b></p>"), 20.0, &mut rec);
        assert!((y - 20.0 - prose_line()).abs() < 1e-9);
        let t = texts(&rec.commands);
        assert_eq!(t.len(), 2);
        assert_eq!(t[0].2, "Hello ");
        assert_eq!(t[1].2, "world ");
        assert_eq!(t[0].1, t[1].1);
        assert!(t[1].0 > t[0].0);
        assert_eq!(rec.requests.len(), 1);
    }

    #[test]
    fn wraps_within_content_width() {
        let fonts = FontContext::new();
        let mut rec = Recorder::default();
        let width = 40.0;
        let words = "lorem ipsum dolor sit amet consectetur adipiscing elit sed do eiusmod tempor";
        Paginator::new(&fonts, 0.0, width).layout(&body(&format!("<p>{}</p>", words)), 0.0, &mut rec);

        let mut lines: Vec<(f64, f64)> = Vec::new();
        for command in &rec.commands {
            if let DrawCommand::Text { x, y, content, style } = command {
                let end = x + fonts.measure(content.trim_end(), style);
                match lines.last_mut() {
                    Some((line_y, max_end)) if *line_y == *y => *max_end = max_end.max(end),
                    _ => lines.push((*y, end)),
                }
            }
        }
        assert!(lines.len() > 1);
        for (_, end) in lines {
            assert!(end <= width + 1e-9);
        }
    }

    #[test]
    fn overlong_word_gets_its_own_line() {
        let fonts = FontContext::new();
        let mut rec = Recorder::default();
        let y = Paginator::new(&fonts, 0.0, 5.0).layout(&body("<p>a supercalifragilistic b</p>"), 0.0, &mut rec);
        assert_eq!(texts(&rec.commands).len(), 3);
        assert!((y - 3.0 * prose_line()).abs() < 1e-9);
    }

    #[test]
    fn bullet_and_text_share_a_line() {
        let fonts = FontContext::new();
        let mut rec = Recorder::default();
        Paginator::new(&fonts, 15.0, 180.0).layout(&body("<ol><li>A</li><li>B</li></ol>"), 0.0, &mut rec);
        let t = texts(&rec.commands);
        let labels: Vec<&str> = t.iter().map(|(_, _, c)| c.as_str()).collect();
        assert_eq!(labels, vec!["1.", "A ", "2.", "B "]);
        assert_eq!(t[0].1, t[1].1);
        assert_eq!(t[0].0, 20.0);
        assert!(t[1].0 > t[0].0);
        assert!(t[2].1 > t[1].1);
    }

    #[test]
    fn wrapped_list_text_hangs_after_bullet() {
        let fonts = FontContext::new();
        let mut rec = Recorder::default();
        let html = "<ul><li>one two three four five six seven eight nine ten</li></ul>";
        Paginator::new(&fonts, 0.0, 30.0).layout(&body(html), 0.0, &mut rec);
        let t = texts(&rec.commands);
        let first_word_x = t[1].0;
        let continuation = t.iter().skip(2).find(|(_, y, _)| *y > t[1].1).expect("wrapped line");
        assert_eq!(continuation.0, first_word_x);
    }

    #[test]
    fn empty_item_still_advances() {
        let fonts = FontContext::new();
        let mut rec = Recorder::default();
        let instructions = vec![DrawInstruction::Bullet {
            label: "1.".into(),
            indent: 5.0,
            style: TextStyle::default(),
        }];
        let y = Paginator::new(&fonts, 0.0, 100.0).layout(&instructions, 10.0, &mut rec);
        assert!((y - 10.0 - prose_line()).abs() < 1e-9);
    }

    #[test]
    fn pre_skips_blank_lines() {
        let fonts = FontContext::new();
        let mut rec = Recorder::default();
        let instructions = vec![DrawInstruction::Pre {
            content: "a\n\n   \nb".into(),
            style: TextStyle::new("Courier", 10.0),
        }];
        let y = Paginator::new(&fonts, 0.0, 100.0).pre_size(9.0).layout(&instructions, 0.0, &mut rec);
        let t = texts(&rec.commands);
        assert_eq!(t.len(), 2);
        assert!((y - 2.0 * 9.0 * PT_TO_MM * 1.2).abs() < 1e-9);
    }

    #[test]
    fn newline_spacing_is_added_after_flush() {
        let fonts = FontContext::new();
        let mut rec = Recorder::default();
        let y = Paginator::new(&fonts, 0.0, 100.0).layout(&body("<h1>Title</h1>"), 0.0, &mut rec);
        assert!((y - 16.0 * PT_TO_MM * 1.4 - 2.0).abs() < 1e-9);
    }

    #[test]
    fn long_body_spills_onto_more_pages() {
        let fonts = FontContext::new();
        let config = LayoutConfig::default();
        let geometry = PageGeometry::from_config(&config);
        let mut stack = PageStack::new(geometry);
        let html: String = (0..120).map(|i| format!("<p>Paragraph number {}</p>", i)).collect();
        let y = Paginator::new(&fonts, geometry.left(), geometry.content_width())
            .layout(&body(&html), geometry.top(), &mut stack);
        assert!(stack.page_count() >= 2);
        assert!(y <= geometry.bottom_limit());
    }

    #[test]
    fn same_input_lays_out_identically() {
        let fonts = FontContext::new();
        let instructions = body("<h2>Terms</h2><p>Some <i>text</i> here</p><ol><li>x</li></ol>");
        let run = || {
            let mut rec = Recorder::default();
            let y = Paginator::new(&fonts, 15.0, 60.0).layout(&instructions, 30.0, &mut rec);
            (y, rec.commands)
        };
        assert_eq!(run(), run());
    }
}
