//! # Tree Flattening
//!
//! Walks the body markup depth-first and emits a flat, ordered list of draw
//! instructions carrying resolved style and list metadata. Word splitting is
//! not done here; a `Text` instruction holds a whole whitespace-collapsed run.
//!
//! Style flows down by value: each element resolves its own style from its
//! parent's and hands it to its children. List state travels in an explicit
//! [`ListContext`]; a list element works on its own copy, so leaving the list
//! restores the outer state without any popping.

use crate::font::PT_TO_MM;
use crate::model::{Element, MarkupNode};
use crate::style::{TagSizes, TextStyle};

/// Glyph drawn for unordered list items.
pub const BULLET_GLYPH: &str = "\u{2022}";

/// Line-height ratio for prose lines.
pub const LINE_HEIGHT_RATIO: f64 = 1.4;

/// One atomic unit of layout work.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawInstruction {
    /// A whitespace-collapsed run of text.
    Text { content: String, style: TextStyle },
    /// A list marker; `indent` is its offset from the content origin.
    Bullet {
        label: String,
        indent: f64,
        style: TextStyle,
    },
    /// Preformatted text, drawn line by line without wrapping.
    Pre { content: String, style: TextStyle },
    /// End the current line, then skip `extra_spacing` millimetres.
    Newline { extra_spacing: Option<f64> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Ordered,
    Unordered,
}

/// Active lists, innermost last, plus one running counter per ordered list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListContext {
    kinds: Vec<ListKind>,
    counters: Vec<u32>,
}

impl ListContext {
    /// The context inside a new list of `kind`. Ordered lists start a fresh
    /// counter at zero.
    pub fn enter(&self, kind: ListKind) -> ListContext {
        let mut inner = self.clone();
        inner.kinds.push(kind);
        if kind == ListKind::Ordered {
            inner.counters.push(0);
        }
        inner
    }

    pub fn depth(&self) -> usize {
        self.kinds.len()
    }

    /// Label for the next list item: bumps the innermost counter for
    /// ordered lists, a bullet glyph otherwise (also outside any list).
    pub fn next_label(&mut self) -> String {
        match self.kinds.last() {
            Some(ListKind::Ordered) => match self.counters.last_mut() {
                Some(counter) => {
                    *counter += 1;
                    format!("{}.", counter)
                }
                None => BULLET_GLYPH.to_string(),
            },
            _ => BULLET_GLYPH.to_string(),
        }
    }
}

/// Constants the flattener needs from the layout configuration.
#[derive(Debug, Clone)]
pub struct FlattenOptions {
    pub sizes: TagSizes,
    /// Indent per list level, in millimetres.
    pub list_indent: f64,
    /// Extra spacing after h1/h2.
    pub heading_spacing: f64,
}

impl Default for FlattenOptions {
    fn default() -> Self {
        Self {
            sizes: TagSizes::default(),
            list_indent: 5.0,
            heading_spacing: 2.0,
        }
    }
}

fn is_block(tag: &str) -> bool {
    matches!(tag, "h1" | "h2" | "p" | "div" | "ul" | "ol")
}

/// Collapse whitespace runs (including newlines and tabs) to single spaces
/// and trim.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Flatten `root` into draw instructions, starting from `base` style.
pub fn flatten(root: &MarkupNode, base: &TextStyle, options: &FlattenOptions) -> Vec<DrawInstruction> {
    let mut flattener = Flattener {
        options,
        out: Vec::new(),
    };
    flattener.walk(root, base, &mut ListContext::default());
    log::debug!("flattened body into {} instructions", flattener.out.len());
    flattener.out
}

struct Flattener<'a> {
    options: &'a FlattenOptions,
    out: Vec<DrawInstruction>,
}

impl Flattener<'_> {
    fn walk(&mut self, node: &MarkupNode, style: &TextStyle, lists: &mut ListContext) {
        match node {
            MarkupNode::Text { content } => {
                let collapsed = collapse_whitespace(content);
                if !collapsed.is_empty() {
                    self.out.push(DrawInstruction::Text {
                        content: collapsed,
                        style: style.clone(),
                    });
                }
            }
            MarkupNode::Element(element) => self.walk_element(element, style, lists),
        }
    }

    fn walk_element(&mut self, element: &Element, parent: &TextStyle, lists: &mut ListContext) {
        let style = parent.resolve(element, &self.options.sizes);
        let tag = element.tag.as_str();

        match tag {
            "br" => {
                self.out.push(DrawInstruction::Newline {
                    extra_spacing: None,
                });
                return;
            }
            "img" => return,
            "pre" => {
                self.block_boundary(None);
                self.out.push(DrawInstruction::Pre {
                    content: MarkupNode::Element(element.clone()).text_content(),
                    style,
                });
                return;
            }
            "li" => {
                let half_line = parent.font_size * PT_TO_MM * LINE_HEIGHT_RATIO / 2.0;
                self.out.push(DrawInstruction::Newline {
                    extra_spacing: Some(half_line),
                });
                let label = lists.next_label();
                let indent = lists.depth().max(1) as f64 * self.options.list_indent;
                self.out.push(DrawInstruction::Bullet {
                    label,
                    indent,
                    style: style.clone(),
                });
            }
            _ => {}
        }

        let block = is_block(tag);
        if block {
            self.block_boundary(None);
        }

        match tag {
            "ol" | "ul" => {
                let kind = if tag == "ol" {
                    ListKind::Ordered
                } else {
                    ListKind::Unordered
                };
                let mut inner = lists.enter(kind);
                for child in &element.children {
                    self.walk(child, &style, &mut inner);
                }
            }
            _ => {
                for child in &element.children {
                    self.walk(child, &style, lists);
                }
            }
        }

        if block {
            let spacing = match tag {
                "h1" | "h2" => Some(self.options.heading_spacing),
                _ => None,
            };
            self.block_boundary(spacing);
        }
    }

    /// Emit a newline unless we are already at a line boundary: right after
    /// another newline, or before anything has been emitted at all.
    fn block_boundary(&mut self, extra_spacing: Option<f64>) {
        match self.out.last() {
            None | Some(DrawInstruction::Newline { .. }) => {}
            Some(_) => self.out.push(DrawInstruction::Newline { extra_spacing }),
        }
    }
}
