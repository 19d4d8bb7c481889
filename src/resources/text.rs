//! Label rasterisation on the CPU.
//!
//! With the `text` feature glyphon's bundled cosmic-text shapes and draws the
//! string into an RGBA image. Without it [`TextRasterizer::new`] always yields
//! `None` and callers fall back to a blank label.

use image::RgbaImage;

#[cfg(feature = "text")]
pub struct TextRasterizer {
    font_system: glyphon::FontSystem,
    swash_cache: glyphon::SwashCache,
}

#[cfg(feature = "text")]
impl TextRasterizer {
    /// Loads the system fonts. Returns `None` when none are installed.
    pub fn new() -> Option<Self> {
        let font_system = glyphon::FontSystem::new();
        if font_system.db().faces().next().is_none() {
            log::warn!("font database is empty");
            return None;
        }
        Some(Self {
            font_system,
            swash_cache: glyphon::SwashCache::new(),
        })
    }

    pub fn rasterize(&mut self, text: &str, px: u32) -> RgbaImage {
        use glyphon::{Attrs, Buffer, Color, Family, Metrics, Shaping};

        let px = px.max(1);
        let size = px as f32;
        let width = (px * text.chars().count().max(1) as u32).max(1);
        let height = (size * 1.5).ceil() as u32;

        let mut buffer = Buffer::new(&mut self.font_system, Metrics::new(size, size * 1.2));
        buffer.set_size(
            &mut self.font_system,
            Some(width as f32),
            Some(height as f32),
        );
        buffer.set_text(
            &mut self.font_system,
            text,
            &Attrs::new().family(Family::Serif),
            Shaping::Advanced,
            None,
        );
        buffer.shape_until_scroll(&mut self.font_system, false);

        let mut image = RgbaImage::new(width, height);
        buffer.draw(
            &mut self.font_system,
            &mut self.swash_cache,
            Color::rgb(255, 255, 255),
            |x, y, w, h, color| {
                let alpha = color.a();
                if alpha == 0 {
                    return;
                }
                for dy in 0..h {
                    for dx in 0..w {
                        let (px, py) = (x + dx as i32, y + dy as i32);
                        if px < 0 || py < 0 || px as u32 >= width || py as u32 >= height {
                            continue;
                        }
                        let pixel = image.get_pixel_mut(px as u32, py as u32);
                        if alpha >= pixel[3] {
                            *pixel = image::Rgba([color.r(), color.g(), color.b(), alpha]);
                        }
                    }
                }
            },
        );
        log::debug!("rasterised label {text:?} at {px}px into {width}x{height}");
        image
    }
}

#[cfg(not(feature = "text"))]
pub struct TextRasterizer;

#[cfg(not(feature = "text"))]
impl TextRasterizer {
    pub fn new() -> Option<Self> {
        log::warn!("built without the `text` feature, labels are not rasterised");
        None
    }

    pub fn rasterize(&mut self, text: &str, px: u32) -> RgbaImage {
        super::pattern::blank_label(text, px)
    }
}
