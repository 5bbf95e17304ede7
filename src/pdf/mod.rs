//! # PDF Serializer
//!
//! Writes composed pages as a PDF 1.7 file. The bytes are produced directly:
//! the subset of PDF a consent form needs (text, strokes, rectangles, RGB
//! images) is small enough that a dependency would add more than it saves.
//!
//! ## PDF Structure (simplified)
//!
//! ```text
//! %PDF-1.7            <- header
//! 1 0 obj ... endobj  <- objects (fonts, images, pages, content streams)
//! 2 0 obj ... endobj
//! ...
//! xref                <- cross-reference table (byte offsets of each object)
//! trailer             <- points to the root object
//! %%EOF
//! ```
//!
//! Layout works in millimetres from the top-left corner; PDF user space is
//! points from the bottom-left. The conversion happens here and nowhere else.
//!
//! ## Font Embedding
//!
//! Standard PDF fonts (Helvetica, Times, Courier) use Type1 references with
//! WinAnsiEncoding. Custom TrueType fonts are embedded whole as CIDFontType2
//! with Identity-H encoding: FontFile2, FontDescriptor, CIDFont, ToUnicode
//! CMap and the root Type0 dictionary.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt::Write as FmtWrite; // for write! on String
use std::io::Write as IoWrite; // for write! on Vec<u8>

use miniz_oxide::deflate::compress_to_vec_zlib;

use crate::error::{Error, Result};
use crate::font::{CustomFontMetrics, FontContext, FontData, FontKey};
use crate::image_loader::LoadedImage;
use crate::layout::{DrawCommand, Page};
use crate::model::Metadata;
use crate::style::Color;

/// Millimetres to PDF points.
pub const MM_TO_PT: f64 = 72.0 / 25.4;

const PRODUCER: &str = concat!("consent-pdf ", env!("CARGO_PKG_VERSION"));

pub struct PdfWriter;

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Glyph mapping for an embedded custom font.
struct CustomFontEmbed {
    glyph_ids: HashMap<char, u16>,
}

/// One registered font resource.
struct FontResource {
    key: FontKey,
    obj_id: usize,
    embed: Option<CustomFontEmbed>,
}

/// Tracks allocated PDF objects during writing.
struct PdfBuilder {
    objects: Vec<PdfObject>,
    fonts: Vec<FontResource>,
    /// XObject ids of each page's images, in drawing order.
    page_images: Vec<Vec<usize>>,
}

struct PdfObject {
    data: Vec<u8>,
}

impl PdfBuilder {
    fn push(&mut self, data: Vec<u8>) -> usize {
        let id = self.objects.len();
        self.objects.push(PdfObject { data });
        id
    }

    fn push_stream(&mut self, dict_extra: &str, raw: &[u8]) -> usize {
        let compressed = compress_to_vec_zlib(raw, 6);
        let mut data: Vec<u8> = Vec::new();
        let _ = write!(
            data,
            "<< /Length {} /Filter /FlateDecode{} >>\nstream\n",
            compressed.len(),
            dict_extra
        );
        data.extend_from_slice(&compressed);
        data.extend_from_slice(b"\nendstream");
        self.push(data)
    }

    fn font_index(&self, key: &FontKey) -> usize {
        self.fonts.iter().position(|f| &f.key == key).unwrap_or(0)
    }
}

impl PdfWriter {
    pub fn new() -> Self {
        Self
    }

    /// Write composed pages to a PDF byte vector.
    pub fn write(&self, pages: &[Page], metadata: &Metadata, fonts: &FontContext) -> Result<Vec<u8>> {
        let mut builder = PdfBuilder {
            objects: Vec::new(),
            fonts: Vec::new(),
            page_images: Vec::new(),
        };

        // 0 = placeholder (PDF objects are 1-indexed), 1 = Catalog, 2 = Pages
        for _ in 0..3 {
            builder.objects.push(PdfObject { data: vec![] });
        }

        self.register_fonts(&mut builder, pages, fonts)?;
        self.register_images(&mut builder, pages);

        let font_resources = Self::build_font_resource_dict(&builder.fonts);
        let mut page_obj_ids: Vec<usize> = Vec::with_capacity(pages.len());

        for (page_idx, page) in pages.iter().enumerate() {
            let content = self.build_content_stream(page, page_idx, &builder, fonts);
            let content_obj_id = builder.push_stream("", content.as_bytes());

            let xobjects: String = builder.page_images[page_idx]
                .iter()
                .enumerate()
                .map(|(i, id)| format!("/Im{} {} 0 R", i, id))
                .collect::<Vec<_>>()
                .join(" ");
            let resources = if xobjects.is_empty() {
                format!("/Font << {} >>", font_resources)
            } else {
                format!("/Font << {} >> /XObject << {} >>", font_resources, xobjects)
            };
            let page_dict = format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                 /Contents {} 0 R /Resources << {} >> >>",
                page.width * MM_TO_PT,
                page.height * MM_TO_PT,
                content_obj_id,
                resources
            );
            page_obj_ids.push(builder.push(page_dict.into_bytes()));
        }

        builder.objects[1].data = b"<< /Type /Catalog /Pages 2 0 R >>".to_vec();

        let kids: String = page_obj_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");
        builder.objects[2].data = format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids,
            page_obj_ids.len()
        )
        .into_bytes();

        let mut info = String::from("<< ");
        if let Some(ref title) = metadata.title {
            let _ = write!(info, "/Title ({}) ", Self::escape_pdf_string(title));
        }
        if let Some(ref author) = metadata.author {
            let _ = write!(info, "/Author ({}) ", Self::escape_pdf_string(author));
        }
        if let Some(ref subject) = metadata.subject {
            let _ = write!(info, "/Subject ({}) ", Self::escape_pdf_string(subject));
        }
        let creator = metadata.creator.as_deref().unwrap_or("consent-pdf");
        let _ = write!(
            info,
            "/Creator ({}) /Producer ({}) >>",
            Self::escape_pdf_string(creator),
            PRODUCER
        );
        let info_obj_id = builder.push(info.into_bytes());

        log::debug!(
            "writing PDF: {} page(s), {} font(s), {} objects",
            pages.len(),
            builder.fonts.len(),
            builder.objects.len()
        );
        Ok(self.serialize(&builder, info_obj_id))
    }

    /// Build the content stream for a single page.
    fn build_content_stream(&self, page: &Page, page_idx: usize, builder: &PdfBuilder, fonts: &FontContext) -> String {
        let mut stream = String::new();
        let mut next_image = 0usize;
        let to_pdf_y = |y: f64| (page.height - y) * MM_TO_PT;

        for command in &page.commands {
            match command {
                DrawCommand::Text { x, y, content, style } => {
                    let (resolved, _) = fonts.resolve(&FontKey::for_style(style));
                    let index = builder.font_index(resolved);
                    let _ = write!(
                        stream,
                        "BT\n{} rg\n/F{} {:.2} Tf\n{:.2} {:.2} Td\n",
                        Self::color_operands(style.color),
                        index,
                        style.font_size,
                        x * MM_TO_PT,
                        to_pdf_y(*y)
                    );
                    match builder.fonts.get(index).and_then(|f| f.embed.as_ref()) {
                        Some(embed) => {
                            let mut hex = String::with_capacity(content.len() * 4);
                            for ch in content.chars() {
                                let gid = embed.glyph_ids.get(&ch).copied().unwrap_or(0);
                                let _ = write!(hex, "{:04X}", gid);
                            }
                            let _ = writeln!(stream, "<{}> Tj", hex);
                        }
                        None => {
                            let _ = writeln!(stream, "({}) Tj", Self::encode_winansi(content));
                        }
                    }
                    stream.push_str("ET\n");
                }

                DrawCommand::Line {
                    x1,
                    y1,
                    x2,
                    y2,
                    width,
                    color,
                } => {
                    let _ = write!(
                        stream,
                        "q\n{} RG\n{:.2} w\n{:.2} {:.2} m\n{:.2} {:.2} l\nS\nQ\n",
                        Self::color_operands(*color),
                        width * MM_TO_PT,
                        x1 * MM_TO_PT,
                        to_pdf_y(*y1),
                        x2 * MM_TO_PT,
                        to_pdf_y(*y2)
                    );
                }

                DrawCommand::Rect {
                    rect,
                    fill,
                    stroke,
                    line_width,
                } => {
                    let paint = match (fill, stroke) {
                        (Some(_), Some(_)) => "B",
                        (Some(_), None) => "f",
                        (None, Some(_)) => "S",
                        (None, None) => continue,
                    };
                    stream.push_str("q\n");
                    if let Some(fill) = fill {
                        let _ = writeln!(stream, "{} rg", Self::color_operands(*fill));
                    }
                    if let Some(stroke) = stroke {
                        let _ = write!(
                            stream,
                            "{} RG\n{:.2} w\n",
                            Self::color_operands(*stroke),
                            line_width * MM_TO_PT
                        );
                    }
                    let _ = write!(
                        stream,
                        "{:.2} {:.2} {:.2} {:.2} re\n{}\nQ\n",
                        rect.x * MM_TO_PT,
                        to_pdf_y(rect.y + rect.height),
                        rect.width * MM_TO_PT,
                        rect.height * MM_TO_PT,
                        paint
                    );
                }

                DrawCommand::Image { rect, .. } => {
                    if next_image < builder.page_images[page_idx].len() {
                        let _ = write!(
                            stream,
                            "q\n{:.4} 0 0 {:.4} {:.2} {:.2} cm\n/Im{} Do\nQ\n",
                            rect.width * MM_TO_PT,
                            rect.height * MM_TO_PT,
                            rect.x * MM_TO_PT,
                            to_pdf_y(rect.y + rect.height),
                            next_image
                        );
                    }
                    next_image += 1;
                }
            }
        }

        stream
    }

    /// Register every font actually used, one PDF font object per resolved
    /// (family, weight, italic).
    fn register_fonts(&self, builder: &mut PdfBuilder, pages: &[Page], fonts: &FontContext) -> Result<()> {
        // BTreeMap keeps object order deterministic.
        let mut used: BTreeMap<FontKey, BTreeSet<char>> = BTreeMap::new();
        for page in pages {
            for command in &page.commands {
                if let DrawCommand::Text { content, style, .. } = command {
                    let (resolved, _) = fonts.resolve(&FontKey::for_style(style));
                    used.entry(resolved.clone())
                        .or_default()
                        .extend(content.chars());
                }
            }
        }

        // Always have at least Helvetica
        if used.is_empty() {
            used.insert(FontKey::new("Helvetica", false, false), BTreeSet::new());
        }

        for (key, chars) in used {
            let (_, data) = fonts.resolve(&key);
            match data {
                FontData::Standard(std_font) => {
                    let dict = format!(
                        "<< /Type /Font /Subtype /Type1 /BaseFont /{} \
                         /Encoding /WinAnsiEncoding >>",
                        std_font.pdf_name()
                    );
                    let obj_id = builder.push(dict.into_bytes());
                    builder.fonts.push(FontResource {
                        key,
                        obj_id,
                        embed: None,
                    });
                }
                FontData::Custom { data, metrics } => {
                    let (obj_id, embed) = Self::write_custom_font_objects(builder, &key, data, metrics, &chars)?;
                    builder.fonts.push(FontResource {
                        key,
                        obj_id,
                        embed: Some(embed),
                    });
                }
            }
        }
        Ok(())
    }

    /// Every image becomes its own RGB XObject; images are already flattened
    /// onto white, so no soft mask is needed.
    fn register_images(&self, builder: &mut PdfBuilder, pages: &[Page]) {
        for page in pages {
            let mut ids = Vec::new();
            for command in &page.commands {
                if let DrawCommand::Image { image, .. } = command {
                    ids.push(Self::write_image_xobject(builder, image));
                }
            }
            builder.page_images.push(ids);
        }
    }

    fn write_image_xobject(builder: &mut PdfBuilder, image: &LoadedImage) -> usize {
        let extra = format!(
            " /Type /XObject /Subtype /Image /Width {} /Height {} \
             /ColorSpace /DeviceRGB /BitsPerComponent 8",
            image.width_px, image.height_px
        );
        builder.push_stream(&extra, &image.rgb)
    }

    /// Write the five objects of an embedded TrueType font and return the id
    /// of the Type0 root dictionary.
    fn write_custom_font_objects(
        builder: &mut PdfBuilder,
        key: &FontKey,
        ttf_data: &[u8],
        metrics: &CustomFontMetrics,
        used_chars: &BTreeSet<char>,
    ) -> Result<(usize, CustomFontEmbed)> {
        let face = ttf_parser::Face::parse(ttf_data, 0).map_err(|e| {
            Error::Font(format!("Failed to parse TTF data for font '{}': {}", key.family, e))
        })?;

        let glyph_ids: HashMap<char, u16> = used_chars
            .iter()
            .filter_map(|ch| metrics.glyph_ids.get(ch).map(|gid| (*ch, *gid)))
            .collect();
        let pdf_font_name = Self::sanitize_font_name(&key.family, key.weight, key.italic);
        let scale = 1000.0 / metrics.units_per_em as f64;

        // 1. FontFile2
        let fontfile2_id = builder.push_stream(&format!(" /Length1 {}", ttf_data.len()), ttf_data);

        // 2. FontDescriptor
        let bbox = face.global_bounding_box();
        let cap_height = face.capital_height().unwrap_or(metrics.ascender) as f64 * scale;
        let descriptor = format!(
            "<< /Type /FontDescriptor /FontName /{} /Flags 4 \
             /FontBBox [{} {} {} {}] /ItalicAngle {} \
             /Ascent {} /Descent {} /CapHeight {} /StemV {} \
             /FontFile2 {} 0 R >>",
            pdf_font_name,
            (bbox.x_min as f64 * scale) as i32,
            (bbox.y_min as f64 * scale) as i32,
            (bbox.x_max as f64 * scale) as i32,
            (bbox.y_max as f64 * scale) as i32,
            if key.italic { -12 } else { 0 },
            (metrics.ascender as f64 * scale) as i32,
            (metrics.descender as f64 * scale) as i32,
            cap_height as i32,
            if key.weight >= 700 { 120 } else { 80 },
            fontfile2_id,
        );
        let descriptor_id = builder.push(descriptor.into_bytes());

        // 3. CIDFont
        let cidfont = format!(
            "<< /Type /Font /Subtype /CIDFontType2 /BaseFont /{} \
             /CIDSystemInfo << /Registry (Adobe) /Ordering (Identity) /Supplement 0 >> \
             /FontDescriptor {} 0 R /DW {} /W {} /CIDToGIDMap /Identity >>",
            pdf_font_name,
            descriptor_id,
            (metrics.default_advance as f64 * scale) as u32,
            Self::build_w_array(&glyph_ids, metrics),
        );
        let cidfont_id = builder.push(cidfont.into_bytes());

        // 4. ToUnicode
        let cmap = Self::build_tounicode_cmap(&glyph_ids, &pdf_font_name);
        let tounicode_id = builder.push_stream("", cmap.as_bytes());

        // 5. Type0
        let type0 = format!(
            "<< /Type /Font /Subtype /Type0 /BaseFont /{} /Encoding /Identity-H \
             /DescendantFonts [{} 0 R] /ToUnicode {} 0 R >>",
            pdf_font_name, cidfont_id, tounicode_id,
        );
        let type0_id = builder.push(type0.into_bytes());

        Ok((type0_id, CustomFontEmbed { glyph_ids }))
    }

    /// `[gid [width] gid [width] ...]` in glyph-space units.
    fn build_w_array(glyph_ids: &HashMap<char, u16>, metrics: &CustomFontMetrics) -> String {
        let scale = 1000.0 / metrics.units_per_em as f64;
        let mut entries: BTreeMap<u16, u32> = BTreeMap::new();
        for (ch, gid) in glyph_ids {
            let advance = metrics
                .advance_widths
                .get(ch)
                .copied()
                .unwrap_or(metrics.default_advance);
            entries.insert(*gid, (advance as f64 * scale) as u32);
        }

        let mut result = String::from("[");
        for (gid, width) in &entries {
            let _ = write!(result, " {} [{}]", gid, width);
        }
        result.push_str(" ]");
        result
    }

    /// ToUnicode CMap so text can be extracted and copied.
    fn build_tounicode_cmap(glyph_ids: &HashMap<char, u16>, font_name: &str) -> String {
        let mut gid_to_unicode: Vec<(u16, char)> = glyph_ids.iter().map(|(&ch, &gid)| (gid, ch)).collect();
        gid_to_unicode.sort();

        let mut cmap = String::new();
        cmap.push_str("/CIDInit /ProcSet findresource begin\n12 dict begin\nbegincmap\n");
        cmap.push_str("/CIDSystemInfo\n<< /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n");
        let _ = writeln!(cmap, "/CMapName /{}-UTF16 def", font_name);
        cmap.push_str("/CMapType 2 def\n1 begincodespacerange\n<0000> <FFFF>\nendcodespacerange\n");

        // At most 100 entries per bfchar block
        for chunk in gid_to_unicode.chunks(100) {
            let _ = writeln!(cmap, "{} beginbfchar", chunk.len());
            for &(gid, ch) in chunk {
                let mut units = [0u16; 2];
                let hex: String = ch
                    .encode_utf16(&mut units)
                    .iter()
                    .map(|u| format!("{:04X}", u))
                    .collect();
                let _ = writeln!(cmap, "<{:04X}> <{}>", gid, hex);
            }
            cmap.push_str("endbfchar\n");
        }

        cmap.push_str("endcmap\nCMapName currentdict /CMap defineresource pop\nend\nend\n");
        cmap
    }

    /// A PDF name for an embedded font: family stripped to name-safe
    /// characters plus weight and style suffixes.
    fn sanitize_font_name(family: &str, weight: u32, italic: bool) -> String {
        let mut name: String = family
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
            .collect();
        if name.is_empty() {
            name = "CustomFont".to_string();
        }
        if weight >= 700 {
            name.push_str("-Bold");
        }
        if italic {
            name.push_str("-Italic");
        }
        name
    }

    fn build_font_resource_dict(fonts: &[FontResource]) -> String {
        fonts
            .iter()
            .enumerate()
            .map(|(i, font)| format!("/F{} {} 0 R", i, font.obj_id))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn color_operands(color: Color) -> String {
        format!("{:.3} {:.3} {:.3}", color.r, color.g, color.b)
    }

    /// Escape special characters in a PDF string.
    fn escape_pdf_string(s: &str) -> String {
        s.replace('\\', "\\\\").replace('(', "\\(").replace(')', "\\)")
    }

    /// Encode text as a WinAnsi literal string body. Characters with no
    /// WinAnsi code become '?'.
    fn encode_winansi(text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for ch in text.chars() {
            match Self::unicode_to_winansi(ch).unwrap_or(b'?') {
                b'\\' => out.push_str("\\\\"),
                b'(' => out.push_str("\\("),
                b')' => out.push_str("\\)"),
                b @ 0x20..=0x7E => out.push(b as char),
                b => {
                    let _ = write!(out, "\\{:03o}", b);
                }
            }
        }
        out
    }

    /// Map a Unicode codepoint to its Windows-1252 byte.
    fn unicode_to_winansi(ch: char) -> Option<u8> {
        let cp = ch as u32;
        if (0x20..=0x7E).contains(&cp) || (0xA0..=0xFF).contains(&cp) {
            return Some(cp as u8);
        }
        match cp {
            0x20AC => Some(0x80), // Euro sign
            0x201A => Some(0x82),
            0x0192 => Some(0x83),
            0x201E => Some(0x84),
            0x2026 => Some(0x85), // Ellipsis
            0x2020 => Some(0x86),
            0x2021 => Some(0x87),
            0x02C6 => Some(0x88),
            0x2030 => Some(0x89),
            0x0160 => Some(0x8A),
            0x2039 => Some(0x8B),
            0x0152 => Some(0x8C),
            0x017D => Some(0x8E),
            0x2018 => Some(0x91), // Curly quotes
            0x2019 => Some(0x92),
            0x201C => Some(0x93),
            0x201D => Some(0x94),
            0x2022 => Some(0x95), // Bullet
            0x2013 => Some(0x96), // En dash
            0x2014 => Some(0x97), // Em dash
            0x02DC => Some(0x98),
            0x2122 => Some(0x99), // Trade mark
            0x0161 => Some(0x9A),
            0x203A => Some(0x9B),
            0x0153 => Some(0x9C),
            0x017E => Some(0x9E),
            0x0178 => Some(0x9F),
            _ => None,
        }
    }

    /// Serialize all objects into the final PDF byte stream.
    fn serialize(&self, builder: &PdfBuilder, info_obj_id: usize) -> Vec<u8> {
        let mut output: Vec<u8> = Vec::new();
        let mut offsets: Vec<usize> = vec![0; builder.objects.len()];

        output.extend_from_slice(b"%PDF-1.7\n");
        output.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

        for (i, obj) in builder.objects.iter().enumerate().skip(1) {
            offsets[i] = output.len();
            let _ = write!(output, "{} 0 obj\n", i);
            output.extend_from_slice(&obj.data);
            output.extend_from_slice(b"\nendobj\n\n");
        }

        let xref_offset = output.len();
        let _ = write!(output, "xref\n0 {}\n", builder.objects.len());
        output.extend_from_slice(b"0000000000 65535 f \n");
        for offset in offsets.iter().skip(1) {
            let _ = write!(output, "{:010} 00000 n \n", offset);
        }

        let _ = write!(
            output,
            "trailer\n<< /Size {} /Root 1 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
            builder.objects.len(),
            info_obj_id,
            xref_offset
        );
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Rect;
    use crate::style::TextStyle;

    fn a4(commands: Vec<DrawCommand>) -> Vec<Page> {
        vec![Page {
            width: 210.0,
            height: 297.0,
            commands,
        }]
    }

    fn text(content: &str, style: TextStyle) -> DrawCommand {
        DrawCommand::Text {
            x: 15.0,
            y: 20.0,
            content: content.to_string(),
            style,
        }
    }

    fn write(pages: &[Page], metadata: &Metadata) -> String {
        let bytes = PdfWriter::new().write(pages, metadata, &FontContext::new()).unwrap();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    #[test]
    fn test_escape_pdf_string() {
        assert_eq!(PdfWriter::escape_pdf_string("Hello (World)"), "Hello \\(World\\)");
        assert_eq!(PdfWriter::escape_pdf_string("back\\slash"), "back\\\\slash");
    }

    #[test]
    fn test_empty_document_produces_valid_pdf() {
        let bytes = PdfWriter::new()
            .write(&a4(vec![]), &Metadata::default(), &FontContext::new())
            .unwrap();
        assert!(bytes.starts_with(b"%PDF-1.7"));
        assert!(bytes.windows(5).any(|w| w == b"%%EOF"));
        assert!(bytes.windows(4).any(|w| w == b"xref"));
        assert!(bytes.windows(7).any(|w| w == b"trailer"));
    }

    #[test]
    fn test_media_box_in_points() {
        let out = write(&a4(vec![]), &Metadata::default());
        assert!(out.contains("/MediaBox [0 0 595.28 841.89]"), "{}", out);
    }

    #[test]
    fn test_metadata_in_pdf() {
        let metadata = Metadata {
            title: Some("Player consent".to_string()),
            author: Some("Club (North)".to_string()),
            subject: None,
            creator: None,
        };
        let out = write(&a4(vec![]), &metadata);
        assert!(out.contains("/Title (Player consent)"));
        assert!(out.contains("/Author (Club \\(North\\))"));
        assert!(out.contains("/Creator (consent-pdf)"));
    }

    #[test]
    fn test_bold_font_registered_separately() {
        let pages = a4(vec![
            text("A", TextStyle::default()),
            text("A", TextStyle::default().bold()),
        ]);
        let out = write(&pages, &Metadata::default());
        assert!(out.contains("/BaseFont /Helvetica "));
        assert!(out.contains("/BaseFont /Helvetica-Bold "));
        assert!(!out.contains("CIDFontType2"));
    }

    #[test]
    fn test_unknown_family_shares_helvetica_object() {
        let pages = a4(vec![
            text("A", TextStyle::new("Comic", 10.0)),
            text("B", TextStyle::default()),
        ]);
        let out = write(&pages, &Metadata::default());
        assert_eq!(out.matches("/Subtype /Type1").count(), 1);
    }

    #[test]
    fn test_winansi_encoding() {
        assert_eq!(PdfWriter::encode_winansi("a(b)"), "a\\(b\\)");
        assert_eq!(PdfWriter::encode_winansi("\u{2022}"), "\\225");
        assert_eq!(PdfWriter::encode_winansi("é"), "\\351");
        assert_eq!(PdfWriter::encode_winansi("\u{4e2d}"), "?");
    }

    #[test]
    fn test_image_xobject_per_image() {
        let image = LoadedImage {
            rgb: vec![255, 0, 0],
            width_px: 1,
            height_px: 1,
        };
        let pages = a4(vec![DrawCommand::Image {
            rect: Rect::new(15.0, 15.0, 30.0, 30.0),
            image,
        }]);
        let out = write(&pages, &Metadata::default());
        assert!(out.contains("/Subtype /Image /Width 1 /Height 1"));
        assert!(out.contains("/XObject << /Im0 "));
    }

    #[test]
    fn test_sanitize_font_name() {
        assert_eq!(PdfWriter::sanitize_font_name("Open Sans", 700, true), "OpenSans-Bold-Italic");
        assert_eq!(PdfWriter::sanitize_font_name("  ", 400, false), "CustomFont");
    }

    #[test]
    fn test_tounicode_cmap_format() {
        let mut glyphs = HashMap::new();
        glyphs.insert('A', 36u16);
        let cmap = PdfWriter::build_tounicode_cmap(&glyphs, "Test");
        assert!(cmap.contains("1 beginbfchar"));
        assert!(cmap.contains("<0024> <0041>"));
        assert!(cmap.contains("/CMapName /Test-UTF16 def"));
    }
}
