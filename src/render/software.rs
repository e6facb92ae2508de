//! CPU rasterizer for screenshots.
//!
//! Text goes through the same cosmic-text shaping used for measurement and is
//! blitted from swash glyph bitmaps; icons are nearest-neighbour scaled.

use std::path::Path;

use cosmic_text::SwashContent;
use image::RgbaImage;

use super::font::CosmicFonts;
use super::surface::{Rect, Surface};
use crate::config::FontSize;
use crate::error::Result;
use crate::widget::color::Rgba;

/// Draw target backed by an `RgbaImage`.
pub struct ImageSurface<'a> {
    image: RgbaImage,
    fonts: Option<&'a CosmicFonts>,
    clip: Option<Rect>,
}

impl std::fmt::Debug for ImageSurface<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageSurface")
            .field("size", &self.image.dimensions())
            .field("clip", &self.clip)
            .finish()
    }
}

impl<'a> ImageSurface<'a> {
    /// Blank surface. Without fonts, text draws are skipped.
    pub fn new(width: u32, height: u32, fonts: Option<&'a CosmicFonts>) -> Self {
        Self { image: RgbaImage::new(width, height), fonts, clip: None }
    }

    pub fn fill(&mut self, color: Rgba) {
        for pixel in self.image.pixels_mut() {
            pixel.0 = color.to_array();
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    fn bounds(&self) -> Rect {
        let full = Rect::new(0, 0, self.image.width() as i32, self.image.height() as i32);
        match self.clip {
            Some(clip) => full.intersect(&clip),
            None => full,
        }
    }

    /// Source-over blend of `color` with coverage `coverage` at (x, y).
    fn blend(&mut self, x: i32, y: i32, color: Rgba, coverage: u8) {
        if !self.bounds().contains(x, y) {
            return;
        }
        let src_a = u32::from(color.a) * u32::from(coverage) / 255;
        if src_a == 0 {
            return;
        }
        let dst = self.image.get_pixel_mut(x as u32, y as u32);
        let inv = 255 - src_a;
        let mix = |s: u8, d: u8| ((u32::from(s) * src_a + u32::from(d) * inv) / 255) as u8;
        dst.0 = [
            mix(color.r, dst.0[0]),
            mix(color.g, dst.0[1]),
            mix(color.b, dst.0[2]),
            (src_a + u32::from(dst.0[3]) * inv / 255) as u8,
        ];
    }
}

impl Surface for ImageSurface<'_> {
    fn fill_rect(&mut self, rect: Rect, color: Rgba) {
        let area = rect.intersect(&self.bounds());
        for y in area.y..area.y + area.height {
            for x in area.x..area.x + area.width {
                self.blend(x, y, color, 255);
            }
        }
    }

    fn draw_text(&mut self, text: &str, x: i32, baseline: i32, color: Rgba, font_size: FontSize) {
        let Some(metrics) = self.fonts.and_then(|f| f.cosmic_metrics(font_size)) else {
            return;
        };
        if text.is_empty() || color.is_transparent() {
            return;
        }

        // Collect coverage first so the font state borrow ends before blending.
        let mut coverage: Vec<(i32, i32, u8)> = Vec::new();
        {
            let state = metrics.state();
            let mut state = state.borrow_mut();
            let buffer = metrics.shape(&mut state, text);
            let state = &mut *state;
            for run in buffer.layout_runs() {
                for glyph in run.glyphs.iter() {
                    let pg = glyph.physical((0.0, 0.0), 1.0);
                    let Some(image) = state
                        .swash_cache
                        .get_image(&mut state.font_system, pg.cache_key)
                        .as_ref()
                    else {
                        continue;
                    };
                    let width = image.placement.width as i32;
                    let height = image.placement.height as i32;
                    let origin_x = x + pg.x + image.placement.left;
                    let origin_y = baseline + pg.y - image.placement.top;
                    for gy in 0..height {
                        for gx in 0..width {
                            let i = (gy * width + gx) as usize;
                            let alpha = match image.content {
                                SwashContent::Mask => image.data.get(i).copied().unwrap_or(0),
                                SwashContent::Color => image.data.get(i * 4 + 3).copied().unwrap_or(0),
                                SwashContent::SubpixelMask => image.data.get(i * 3).copied().unwrap_or(0),
                            };
                            if alpha > 0 {
                                coverage.push((origin_x + gx, origin_y + gy, alpha));
                            }
                        }
                    }
                }
            }
        }

        for (px, py, alpha) in coverage {
            self.blend(px, py, color, alpha);
        }
    }

    fn draw_image(&mut self, image: &RgbaImage, x: i32, y: i32, width: i32, height: i32, alpha: u8) {
        if width <= 0 || height <= 0 || image.width() == 0 || image.height() == 0 {
            return;
        }
        for dy in 0..height {
            for dx in 0..width {
                let sx = (dx as u32 * image.width() / width as u32).min(image.width() - 1);
                let sy = (dy as u32 * image.height() / height as u32).min(image.height() - 1);
                let [r, g, b, a] = image.get_pixel(sx, sy).0;
                let color = Rgba::new(r, g, b, a).modulate(alpha);
                self.blend(x + dx, y + dy, color, 255);
            }
        }
    }

    fn set_clip(&mut self, rect: Option<Rect>) {
        self.clip = rect;
    }
}

/// Write an image, as lossy WebP for `.webp` paths and via `image` otherwise.
pub fn save_image(img: &RgbaImage, output: &Path) -> Result<()> {
    let ext = output.extension().and_then(|e| e.to_str()).unwrap_or("webp");
    if ext.eq_ignore_ascii_case("webp") {
        let encoder = webp::Encoder::from_rgba(img.as_raw(), img.width(), img.height());
        let mem = encoder.encode(90.0);
        std::fs::write(output, &*mem)?;
    } else {
        img.save(output)?;
    }
    tracing::info!("Saved {}x{} image to {}", img.width(), img.height(), output.display());
    Ok(())
}
