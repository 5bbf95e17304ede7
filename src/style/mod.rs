//! # Style Resolution
//!
//! Computes the effective text style of a markup element from the style it
//! inherits and whatever the element itself says about styling: its tag, its
//! class names, and its inline `style` attribute.
//!
//! This is deliberately a tiny subset of CSS. Body text in a consent document
//! comes out of a rich-text editor, so the only things worth honoring are the
//! ones such an editor produces: bold/italic/underline tags, headings, links,
//! preformatted blocks, a font-family class, an alignment class, and inline
//! text and highlight colors.

use serde::{Deserialize, Serialize};

use crate::model::Element;

/// Default body font family.
pub const DEFAULT_FONT_FAMILY: &str = "Helvetica";
/// Family used for class-name serif hints.
pub const SERIF_FAMILY: &str = "Times";
/// Family used by `pre` and class-name monospace hints.
pub const MONOSPACE_FAMILY: &str = "Courier";

/// An RGBA color, components in 0.0 - 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };
    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };

    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::rgb(r as f64 / 255.0, g as f64 / 255.0, b as f64 / 255.0)
    }

    /// Parse `#rgb` / `#rrggbb`. Returns `None` for anything else.
    pub fn hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#')?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let (r, g, b) = match hex.len() {
            3 => {
                let r = u8::from_str_radix(&hex[0..1].repeat(2), 16).ok()?;
                let g = u8::from_str_radix(&hex[1..2].repeat(2), 16).ok()?;
                let b = u8::from_str_radix(&hex[2..3].repeat(2), 16).ok()?;
                (r, g, b)
            }
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                (r, g, b)
            }
            _ => return None,
        };
        Some(Self::rgb8(r, g, b))
    }

    /// Parse a CSS color value: hex, `rgb()`/`rgba()`, or a handful of
    /// named colors.
    pub fn parse_css(value: &str) -> Option<Self> {
        let value = value.trim().to_ascii_lowercase();
        if value.starts_with('#') {
            return Self::hex(&value);
        }
        if let Some(args) = value
            .strip_prefix("rgba(")
            .or_else(|| value.strip_prefix("rgb("))
        {
            let args = args.strip_suffix(')')?;
            let parts: Vec<&str> = args.split(',').map(str::trim).collect();
            if parts.len() < 3 {
                return None;
            }
            let channel = |s: &str| s.parse::<f64>().ok().map(|v| v.clamp(0.0, 255.0) / 255.0);
            let mut color = Self::rgb(channel(parts[0])?, channel(parts[1])?, channel(parts[2])?);
            if let Some(alpha) = parts.get(3) {
                color.a = alpha.parse::<f64>().ok()?.clamp(0.0, 1.0);
            }
            return Some(color);
        }
        match value.as_str() {
            "black" => Some(Color::BLACK),
            "white" => Some(Color::WHITE),
            "red" => Some(Self::rgb8(255, 0, 0)),
            "green" => Some(Self::rgb8(0, 128, 0)),
            "blue" => Some(Self::rgb8(0, 0, 255)),
            "yellow" => Some(Self::rgb8(255, 255, 0)),
            "orange" => Some(Self::rgb8(255, 165, 0)),
            "gray" | "grey" => Some(Self::rgb8(128, 128, 128)),
            _ => None,
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

/// Horizontal alignment of a line of text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

/// Fixed sizes for tags that imply one.
#[derive(Debug, Clone, Copy)]
pub struct TagSizes {
    pub h1: f64,
    pub h2: f64,
    pub link_color: Color,
}

impl Default for TagSizes {
    fn default() -> Self {
        Self {
            h1: 16.0,
            h2: 13.0,
            link_color: Color::rgb8(0, 102, 204),
        }
    }
}

/// The effective text style attached to every draw instruction.
///
/// Children inherit by cloning the parent's style and overriding fields.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub font_family: String,
    /// Font size in points.
    pub font_size: f64,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub color: Color,
    pub background: Option<Color>,
    pub align: TextAlign,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            font_size: 10.0,
            bold: false,
            italic: false,
            underline: false,
            color: Color::BLACK,
            background: None,
            align: TextAlign::Left,
        }
    }
}

impl TextStyle {
    pub fn new(font_family: &str, font_size: f64) -> Self {
        Self {
            font_family: font_family.to_string(),
            font_size,
            ..Default::default()
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_size(mut self, font_size: f64) -> Self {
        self.font_size = font_size;
        self
    }

    pub fn with_align(mut self, align: TextAlign) -> Self {
        self.align = align;
        self
    }

    /// Resolve the style of `element` given the style it inherits.
    ///
    /// Precedence, later overriding earlier: tag defaults, class-name hints,
    /// inline `style` declarations. Unknown tags pass the parent through.
    pub fn resolve(&self, element: &Element, sizes: &TagSizes) -> TextStyle {
        let mut style = self.clone();

        match element.tag.as_str() {
            "h1" => {
                style.bold = true;
                style.font_size = sizes.h1;
            }
            "h2" => {
                style.bold = true;
                style.font_size = sizes.h2;
            }
            "b" | "strong" => style.bold = true,
            "i" | "em" => style.italic = true,
            "u" => style.underline = true,
            "a" => {
                style.underline = true;
                style.color = sizes.link_color;
            }
            "pre" => style.font_family = MONOSPACE_FAMILY.to_string(),
            _ => {}
        }

        if let Some(class) = &element.class {
            apply_class_hints(&mut style, class);
        }

        if let Some(inline) = &element.style {
            apply_inline_style(&mut style, inline);
        }

        style
    }
}

/// Class names produced by rich-text editors (`ql-font-serif`, `ql-align-center`)
/// and the bare forms (`serif`, `text-center`).
fn apply_class_hints(style: &mut TextStyle, class: &str) {
    for token in class.split_whitespace() {
        let token = token.to_ascii_lowercase();
        let token = token.strip_prefix("ql-").unwrap_or(&token);
        match token {
            "font-serif" | "serif" => style.font_family = SERIF_FAMILY.to_string(),
            "font-monospace" | "monospace" | "mono" => {
                style.font_family = MONOSPACE_FAMILY.to_string()
            }
            "align-center" | "text-center" | "center" => style.align = TextAlign::Center,
            "align-right" | "text-right" | "right" => style.align = TextAlign::Right,
            "align-justify" | "text-justify" | "justify" => style.align = TextAlign::Justify,
            _ => {}
        }
    }
}

/// Apply `color:` and `background-color:` declarations. Anything that does
/// not parse leaves the inherited value alone.
fn apply_inline_style(style: &mut TextStyle, declarations: &str) {
    for declaration in declarations.split(';') {
        let Some((property, value)) = declaration.split_once(':') else {
            continue;
        };
        let property = property.trim().to_ascii_lowercase();
        match property.as_str() {
            "color" => match Color::parse_css(value) {
                Some(color) => style.color = color,
                None => log::debug!("ignoring unparseable color '{}'", value.trim()),
            },
            "background-color" | "background" => match Color::parse_css(value) {
                Some(color) if color.a > 0.0 => style.background = Some(color),
                Some(_) => style.background = None,
                None => log::debug!("ignoring unparseable background '{}'", value.trim()),
            },
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(tag: &str, class: Option<&str>, style: Option<&str>) -> Element {
        Element {
            tag: tag.to_string(),
            class: class.map(str::to_string),
            style: style.map(str::to_string),
            children: vec![],
        }
    }

    fn resolve(tag: &str, class: Option<&str>, inline: Option<&str>) -> TextStyle {
        TextStyle::default().resolve(&element(tag, class, inline), &TagSizes::default())
    }

    #[test]
    fn headings_are_bold_and_larger() {
        let h1 = resolve("h1", None, None);
        assert!(h1.bold);
        assert_eq!(h1.font_size, 16.0);
        let h2 = resolve("h2", None, None);
        assert!(h2.bold);
        assert_eq!(h2.font_size, 13.0);
    }

    #[test]
    fn inline_tags() {
        assert!(resolve("strong", None, None).bold);
        assert!(resolve("em", None, None).italic);
        assert!(resolve("u", None, None).underline);
        let link = resolve("a", None, None);
        assert!(link.underline);
        assert_eq!(link.color, TagSizes::default().link_color);
        assert_eq!(resolve("pre", None, None).font_family, MONOSPACE_FAMILY);
    }

    #[test]
    fn unknown_tag_passes_parent_through() {
        let parent = TextStyle::default().bold().with_size(12.0);
        let child = parent.resolve(&element("blink", None, None), &TagSizes::default());
        assert_eq!(child, parent);
    }

    #[test]
    fn class_hints_override_tag_defaults() {
        let style = resolve("pre", Some("ql-font-serif ql-align-right"), None);
        assert_eq!(style.font_family, SERIF_FAMILY);
        assert_eq!(style.align, TextAlign::Right);
        assert_eq!(resolve("p", Some("text-center"), None).align, TextAlign::Center);
        assert_eq!(resolve("p", Some("ql-align-justify"), None).align, TextAlign::Justify);
    }

    #[test]
    fn inline_style_overrides_link_color() {
        let style = resolve("a", None, Some("color: #ff0000; background-color: rgb(255, 255, 0)"));
        assert_eq!(style.color, Color::rgb8(255, 0, 0));
        assert_eq!(style.background, Some(Color::rgb8(255, 255, 0)));
        assert!(style.underline);
    }

    #[test]
    fn malformed_declarations_fall_back_to_inherited() {
        let style = resolve("span", None, Some("color: notacolor; ;;garbage; background-color: #12"));
        assert_eq!(style.color, Color::BLACK);
        assert_eq!(style.background, None);
    }

    #[test]
    fn css_color_forms() {
        assert_eq!(Color::parse_css("#fff"), Some(Color::WHITE));
        assert_eq!(Color::parse_css(" RGB(0,0,0) "), Some(Color::BLACK));
        assert_eq!(Color::parse_css("rgba(0, 0, 0, 0.5)").map(|c| c.a), Some(0.5));
        assert_eq!(Color::parse_css("grey"), Some(Color::rgb8(128, 128, 128)));
        assert_eq!(Color::parse_css("#ggg"), None);
        assert_eq!(Color::parse_css("rgb(1,2)"), None);
    }

    #[test]
    fn transparent_background_clears_highlight() {
        let parent = TextStyle {
            background: Some(Color::WHITE),
            ..Default::default()
        };
        let child = parent.resolve(
            &element("span", None, Some("background-color: rgba(0,0,0,0)")),
            &TagSizes::default(),
        );
        assert_eq!(child.background, None);
    }
}
