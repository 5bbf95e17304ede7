//! # Image Loading and Inlining
//!
//! Loads a logo or signature raster from a data URI, remote URL or raw
//! base64 string, flattens it onto an opaque white backing and fits it into
//! a box on the page.
//!
//! The engine itself never touches the network or the filesystem. Fetching
//! a URL is the host's business: it plugs in through [`ImageFetcher`]. Every failure (no source, fetch error, undecodable
//! bytes) degrades to a placeholder box so composition always completes.

use std::io::Cursor;

use crate::error::{Error, Result};
use crate::layout::{DrawCommand, Rect};
use crate::style::{Color, TextStyle};
use crate::font::FontContext;

/// Fill used for placeholder boxes.
pub const PLACEHOLDER_FILL: Color = Color {
    r: 0.93,
    g: 0.93,
    b: 0.93,
    a: 1.0,
};

/// Caption color inside placeholder boxes.
pub const PLACEHOLDER_TEXT: Color = Color {
    r: 0.45,
    g: 0.45,
    b: 0.45,
    a: 1.0,
};

/// A decoded image composited onto white, ready for PDF embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedImage {
    /// width * height * 3 bytes (RGB), always opaque.
    pub rgb: Vec<u8>,
    pub width_px: u32,
    pub height_px: u32,
}

/// Resolves remote image URLs to bytes. Supplied by the host.
pub trait ImageFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// A fetcher for hosts without network access: every remote URL is
/// unavailable.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFetch;

impl ImageFetcher for NoFetch {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        Err(Error::Image(format!("remote images unavailable: '{}'", url)))
    }
}

/// Decode a data URI (`data:<mime>;base64,...`) or raw base64 string.
pub fn decode_base64_source(src: &str) -> Result<Vec<u8>> {
    let payload = if src.starts_with("data:") {
        let comma_pos = src
            .find(',')
            .ok_or_else(|| Error::Image("Invalid data URI: missing comma".to_string()))?;
        &src[comma_pos + 1..]
    } else {
        src
    };
    use base64::Engine;
    let cleaned: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    base64::engine::general_purpose::STANDARD
        .decode(cleaned)
        .map_err(|e| Error::Image(format!("Base64 decode error: {}", e)))
}

/// Scale `(width_px, height_px)` to fit `bounds`: fit the width first, then
/// re-fit by height if that overflows. The result is centered in `bounds`.
pub fn fit_into(width_px: u32, height_px: u32, bounds: Rect) -> Rect {
    if width_px == 0 || height_px == 0 {
        return bounds;
    }
    let aspect = height_px as f64 / width_px as f64;
    let mut width = bounds.width;
    let mut height = width * aspect;
    if height > bounds.height {
        height = bounds.height;
        width = height / aspect;
    }
    Rect {
        x: bounds.x + (bounds.width - width) / 2.0,
        y: bounds.y + (bounds.height - height) / 2.0,
        width,
        height,
    }
}

/// Loads images and turns them into positioned draw commands.
pub struct ImageInliner<'a> {
    fetcher: &'a dyn ImageFetcher,
}

impl<'a> ImageInliner<'a> {
    pub fn new(fetcher: &'a dyn ImageFetcher) -> Self {
        Self { fetcher }
    }

    /// Load and decode `src`, compositing any transparency onto white.
    pub fn load(&self, src: &str) -> Result<LoadedImage> {
        let raw = self.read_source_bytes(src)?;
        decode_and_flatten(&raw)
    }

    fn read_source_bytes(&self, src: &str) -> Result<Vec<u8>> {
        let src = src.trim();
        if src.is_empty() {
            return Err(Error::Image("empty image source".to_string()));
        }
        if src.starts_with("data:") {
            return decode_base64_source(src);
        }
        if src.starts_with("http://") || src.starts_with("https://") {
            return self.fetcher.fetch(src);
        }
        decode_base64_source(src)
    }

    /// Draw `src` fitted and centered in `bounds`, or a placeholder box with
    /// `caption` centered in it when there is nothing usable to draw.
    pub fn place(
        &self,
        src: Option<&str>,
        bounds: Rect,
        caption: &str,
        fonts: &FontContext,
        caption_style: &TextStyle,
    ) -> Vec<DrawCommand> {
        let loaded = match src {
            Some(src) => self.load(src).map_err(|e| {
                log::warn!("image unavailable, drawing placeholder: {}", e);
            }),
            None => Err(()),
        };

        match loaded {
            Ok(image) => {
                let rect = fit_into(image.width_px, image.height_px, bounds);
                vec![DrawCommand::Image { rect, image }]
            }
            Err(()) => placeholder(bounds, caption, fonts, caption_style),
        }
    }
}

/// A filled, outlined box with a centered caption.
pub fn placeholder(
    bounds: Rect,
    caption: &str,
    fonts: &FontContext,
    caption_style: &TextStyle,
) -> Vec<DrawCommand> {
    let mut commands = vec![DrawCommand::Rect {
        rect: bounds,
        fill: Some(PLACEHOLDER_FILL),
        stroke: Some(PLACEHOLDER_TEXT),
        line_width: 0.2,
    }];
    if !caption.is_empty() {
        let style = caption_style.clone().with_color(PLACEHOLDER_TEXT);
        let width = fonts.measure(caption, &style);
        let size_mm = style.font_size * crate::font::PT_TO_MM;
        commands.push(DrawCommand::Text {
            x: bounds.x + (bounds.width - width).max(0.0) / 2.0,
            y: bounds.y + bounds.height / 2.0 + size_mm * 0.35,
            content: caption.to_string(),
            style,
        });
    }
    commands
}

/// Decode PNG/JPEG bytes and composite over an opaque white background.
fn decode_and_flatten(data: &[u8]) -> Result<LoadedImage> {
    if data.len() < 4 {
        return Err(Error::Image("Image data too short".to_string()));
    }
    let reader = image::io::Reader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| Error::Image(format!("format detection error: {}", e)))?;
    let img = reader
        .decode()
        .map_err(|e| Error::Image(format!("Failed to decode image: {}", e)))?;

    let rgba = img.to_rgba8();
    let width = rgba.width();
    let height = rgba.height();

    let mut rgb = Vec::with_capacity((width * height) as usize * 3);
    for pixel in rgba.pixels() {
        let alpha = pixel[3] as u32;
        for channel in &pixel.0[..3] {
            let blended = (*channel as u32 * alpha + 255 * (255 - alpha) + 127) / 255;
            rgb.push(blended as u8);
        }
    }

    Ok(LoadedImage {
        rgb,
        width_px: width,
        height_px: height,
    })
}
