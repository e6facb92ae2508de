//! Chat icons (mod crowns, ironman helmets, ...) and their bitmap cache.

use std::collections::HashMap;

use image::{Rgba as Pixel, RgbaImage};
use serde::{Deserialize, Serialize};

/// A palette-indexed sprite as the host stores chat icons.
///
/// Each pixel is an index into `palette` (0xRRGGBB entries); index 0 is
/// transparent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedSprite {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
    pub palette: Vec<u32>,
}

impl IndexedSprite {
    /// Sprite with every pixel set to palette index 1 of a single colour.
    pub fn solid(width: u32, height: u32, rgb: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![1; (width * height) as usize],
            palette: vec![0, rgb],
        }
    }
}

/// Resolves icon ids to sprites. `None` means "not found"; the id is then
/// drawn as nothing and measured as a fallback width.
pub trait IconResolver {
    fn sprite(&self, id: u32) -> Option<&IndexedSprite>;
}

/// Resolver for hosts that expose no icons at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoIcons;

impl IconResolver for NoIcons {
    fn sprite(&self, _id: u32) -> Option<&IndexedSprite> {
        None
    }
}

/// The host's icon array: slot `id` may be empty.
impl IconResolver for [Option<IndexedSprite>] {
    fn sprite(&self, id: u32) -> Option<&IndexedSprite> {
        self.get(id as usize).and_then(Option::as_ref)
    }
}

impl IconResolver for Vec<Option<IndexedSprite>> {
    fn sprite(&self, id: u32) -> Option<&IndexedSprite> {
        self.as_slice().sprite(id)
    }
}

impl IconResolver for HashMap<u32, IndexedSprite> {
    fn sprite(&self, id: u32) -> Option<&IndexedSprite> {
        self.get(&id)
    }
}

/// Expand a palette-indexed sprite to RGBA.
pub fn sprite_to_image(sprite: &IndexedSprite) -> RgbaImage {
    let mut img = RgbaImage::new(sprite.width, sprite.height);
    for (i, pixel) in img.pixels_mut().enumerate() {
        let index = sprite.pixels.get(i).copied().unwrap_or(0) as usize;
        if index == 0 {
            continue;
        }
        if let Some(&rgb) = sprite.palette.get(index) {
            *pixel = Pixel([(rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8, 255]);
        }
    }
    img
}

/// Converted icon bitmaps keyed by icon id.
///
/// An entry is rebuilt when the source sprite's dimensions no longer match
/// the cached bitmap.
#[derive(Debug, Default)]
pub struct IconCache {
    images: HashMap<u32, RgbaImage>,
}

impl IconCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached bitmap for `id`, converting `sprite` on a miss or size change.
    pub fn get_or_convert(&mut self, id: u32, sprite: &IndexedSprite) -> &RgbaImage {
        let stale = self
            .images
            .get(&id)
            .is_none_or(|img| img.width() != sprite.width || img.height() != sprite.height);
        if stale {
            tracing::trace!("Converting icon {id} ({}x{})", sprite.width, sprite.height);
            self.images.insert(id, sprite_to_image(sprite));
        }
        &self.images[&id]
    }

    /// Resolve and convert in one step.
    pub fn resolve(&mut self, icons: &dyn IconResolver, id: u32) -> Option<&RgbaImage> {
        let sprite = icons.sprite(id)?;
        Some(self.get_or_convert(id, sprite))
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn clear(&mut self) {
        self.images.clear();
    }
}
