//! # Font Management
//!
//! Text measurement for layout and font lookup for PDF serialization.
//!
//! The standard PDF fonts (Helvetica, Times, Courier) need no embedding and
//! cover the default look. A document may also bring its own TrueType fonts;
//! those are measured with ttf-parser and embedded whole by the PDF writer.
//! A font that does not parse is skipped and its family falls back to
//! Helvetica, so a broken asset never stops a document from rendering.

pub mod metrics;

use std::collections::HashMap;

pub use metrics::StandardFontMetrics;

use crate::error::{Error, Result};
use crate::image_loader::decode_base64_source;
use crate::model::FontEntry;
use crate::style::TextStyle;

/// Conversion factor from typographic points to millimetres.
pub const PT_TO_MM: f64 = 0.352778;

#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct FontKey {
    pub family: String,
    pub weight: u32,
    pub italic: bool,
}

impl FontKey {
    pub fn new(family: &str, bold: bool, italic: bool) -> Self {
        Self {
            family: family.to_string(),
            weight: if bold { 700 } else { 400 },
            italic,
        }
    }

    pub fn for_style(style: &TextStyle) -> Self {
        Self::new(&style.font_family, style.bold, style.italic)
    }
}

#[derive(Debug, Clone)]
pub enum FontData {
    /// One of the standard PDF fonts. No embedding needed.
    Standard(StandardFont),
    /// A TrueType font embedded in the output.
    Custom {
        data: Vec<u8>,
        metrics: CustomFontMetrics,
    },
}

/// Parsed metrics from a TrueType/OpenType font via ttf-parser.
#[derive(Debug, Clone)]
pub struct CustomFontMetrics {
    pub units_per_em: u16,
    pub advance_widths: HashMap<char, u16>,
    pub default_advance: u16,
    pub ascender: i16,
    pub descender: i16,
    /// Maps characters to their glyph IDs in the font.
    pub glyph_ids: HashMap<char, u16>,
}

impl CustomFontMetrics {
    /// Get the advance width of a character in points.
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        let w = self
            .advance_widths
            .get(&ch)
            .copied()
            .unwrap_or(self.default_advance);
        (w as f64 / self.units_per_em as f64) * font_size
    }

    /// Parse metrics from font data.
    pub fn from_font_data(data: &[u8]) -> Result<Self> {
        let face = ttf_parser::Face::parse(data, 0)
            .map_err(|e| Error::Font(format!("unparseable TrueType data: {}", e)))?;
        let units_per_em = face.units_per_em();

        let mut advance_widths = HashMap::new();
        let mut glyph_ids = HashMap::new();
        let mut default_advance = 0u16;

        for code in 32u32..=0xFFFF {
            let Some(ch) = char::from_u32(code) else {
                continue;
            };
            if let Some(glyph_id) = face.glyph_index(ch) {
                let advance = face.glyph_hor_advance(glyph_id).unwrap_or(0);
                advance_widths.insert(ch, advance);
                glyph_ids.insert(ch, glyph_id.0);
                if ch == ' ' {
                    default_advance = advance;
                }
            }
        }

        if glyph_ids.is_empty() {
            return Err(Error::Font("font maps no characters".to_string()));
        }
        if default_advance == 0 {
            default_advance = units_per_em / 2;
        }

        Ok(CustomFontMetrics {
            units_per_em,
            advance_widths,
            default_advance,
            ascender: face.ascender(),
            descender: face.descender(),
            glyph_ids,
        })
    }
}

/// The standard PDF fonts this engine draws with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    HelveticaBoldOblique,
    TimesRoman,
    TimesBold,
    TimesItalic,
    TimesBoldItalic,
    Courier,
    CourierBold,
    CourierOblique,
    CourierBoldOblique,
}

impl StandardFont {
    /// The PDF name for this font.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::HelveticaBold => "Helvetica-Bold",
            Self::HelveticaOblique => "Helvetica-Oblique",
            Self::HelveticaBoldOblique => "Helvetica-BoldOblique",
            Self::TimesRoman => "Times-Roman",
            Self::TimesBold => "Times-Bold",
            Self::TimesItalic => "Times-Italic",
            Self::TimesBoldItalic => "Times-BoldItalic",
            Self::Courier => "Courier",
            Self::CourierBold => "Courier-Bold",
            Self::CourierOblique => "Courier-Oblique",
            Self::CourierBoldOblique => "Courier-BoldOblique",
        }
    }

    pub fn metrics(&self) -> StandardFontMetrics {
        match self {
            Self::Helvetica | Self::HelveticaOblique => StandardFontMetrics::HELVETICA,
            Self::HelveticaBold | Self::HelveticaBoldOblique => StandardFontMetrics::HELVETICA_BOLD,
            Self::TimesRoman | Self::TimesItalic => StandardFontMetrics::TIMES,
            Self::TimesBold | Self::TimesBoldItalic => StandardFontMetrics::TIMES_BOLD,
            Self::Courier
            | Self::CourierBold
            | Self::CourierOblique
            | Self::CourierBoldOblique => StandardFontMetrics::COURIER,
        }
    }
}

/// A font registry that maps font family + weight + style to font data.
pub struct FontRegistry {
    fonts: HashMap<FontKey, FontData>,
    fallback_key: FontKey,
    fallback: FontData,
}

impl Default for FontRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FontRegistry {
    pub fn new() -> Self {
        let mut fonts = HashMap::new();

        let standard_mappings = [
            (("Helvetica", false, false), StandardFont::Helvetica),
            (("Helvetica", true, false), StandardFont::HelveticaBold),
            (("Helvetica", false, true), StandardFont::HelveticaOblique),
            (("Helvetica", true, true), StandardFont::HelveticaBoldOblique),
            (("Times", false, false), StandardFont::TimesRoman),
            (("Times", true, false), StandardFont::TimesBold),
            (("Times", false, true), StandardFont::TimesItalic),
            (("Times", true, true), StandardFont::TimesBoldItalic),
            (("Courier", false, false), StandardFont::Courier),
            (("Courier", true, false), StandardFont::CourierBold),
            (("Courier", false, true), StandardFont::CourierOblique),
            (("Courier", true, true), StandardFont::CourierBoldOblique),
        ];

        for ((family, bold, italic), font) in standard_mappings {
            fonts.insert(FontKey::new(family, bold, italic), FontData::Standard(font));
        }

        Self {
            fonts,
            fallback_key: FontKey::new("Helvetica", false, false),
            fallback: FontData::Standard(StandardFont::Helvetica),
        }
    }

    /// Look up a font, falling back to the regular face of the same family,
    /// then to Helvetica with the requested weight and style.
    pub fn resolve(&self, key: &FontKey) -> (&FontKey, &FontData) {
        if let Some(found) = self.fonts.get_key_value(key) {
            return found;
        }
        let regular = FontKey {
            weight: 400,
            italic: false,
            ..key.clone()
        };
        if let Some(found) = self.fonts.get_key_value(&regular) {
            return found;
        }
        let helvetica = FontKey {
            family: "Helvetica".to_string(),
            ..key.clone()
        };
        self.fonts
            .get_key_value(&helvetica)
            .unwrap_or((&self.fallback_key, &self.fallback))
    }

    /// Register a custom font.
    pub fn register(&mut self, key: FontKey, data: Vec<u8>) -> Result<()> {
        let metrics = CustomFontMetrics::from_font_data(&data)?;
        self.fonts.insert(key, FontData::Custom { data, metrics });
        Ok(())
    }
}

/// Shared font context used by layout and PDF serialization.
pub struct FontContext {
    registry: FontRegistry,
}

impl Default for FontContext {
    fn default() -> Self {
        Self::new()
    }
}

impl FontContext {
    pub fn new() -> Self {
        Self {
            registry: FontRegistry::new(),
        }
    }

    /// Build a context with the document's own fonts registered. Fonts that
    /// fail to decode are logged and skipped.
    pub fn with_fonts(entries: &[FontEntry]) -> Self {
        let mut ctx = Self::new();
        for entry in entries {
            let key = FontKey::new(&entry.family, entry.bold, entry.italic);
            let loaded = decode_base64_source(&entry.src)
                .map_err(|e| Error::Font(e.to_string()))
                .and_then(|data| ctx.registry.register(key.clone(), data));
            match loaded {
                Ok(()) => log::debug!("registered font {:?}", key),
                Err(e) => log::warn!("font '{}' skipped, using fallback: {}", entry.family, e),
            }
        }
        ctx
    }

    /// Width of `text` in points.
    pub fn measure_pt(&self, text: &str, key: &FontKey, font_size: f64) -> f64 {
        match self.registry.resolve(key).1 {
            FontData::Standard(std_font) => std_font.metrics().measure_string(text, font_size),
            FontData::Custom { metrics, .. } => {
                text.chars().map(|ch| metrics.char_width(ch, font_size)).sum()
            }
        }
    }

    /// Width of `text` in millimetres when set in `style`.
    pub fn measure(&self, text: &str, style: &TextStyle) -> f64 {
        self.measure_pt(text, &FontKey::for_style(style), style.font_size) * PT_TO_MM
    }

    /// Resolve a requested key to the key actually registered and its data.
    pub fn resolve(&self, key: &FontKey) -> (&FontKey, &FontData) {
        self.registry.resolve(key)
    }
}
