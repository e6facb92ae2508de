//! Font metrics for layout.
//!
//! Layout only needs string widths and vertical metrics. `FixedMetrics` gives
//! deterministic numbers for headless dumps; `CosmicFonts` loads the game's
//! TTF fonts into a cosmic-text `FontSystem` and measures shaped runs.

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use cosmic_text::{fontdb, Attrs, Buffer, Family, Metrics, Shaping};

use crate::config::FontSize;

/// Measurements the layout engine needs from a font.
pub trait FontMetrics {
    /// Advance width of `text` in pixels.
    fn string_width(&self, text: &str) -> i32;
    /// Full line height (ascent + descent + leading).
    fn height(&self) -> i32;
    fn ascent(&self) -> i32;
    fn descent(&self) -> i32;
}

/// Resolves metrics for a font size mode. `None` means no font is available;
/// callers draw nothing in that case.
pub trait FontProvider {
    fn metrics(&self, size: FontSize) -> Option<&dyn FontMetrics>;
}

/// Monospaced metrics: every char advances by the same width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedMetrics {
    pub advance: i32,
    pub ascent: i32,
    pub descent: i32,
    pub leading: i32,
}

impl FixedMetrics {
    /// Approximates the regular game font (16px line).
    pub const REGULAR: FixedMetrics = FixedMetrics { advance: 6, ascent: 12, descent: 3, leading: 1 };
    /// Approximates the small game font (13px line).
    pub const SMALL: FixedMetrics = FixedMetrics { advance: 5, ascent: 10, descent: 2, leading: 1 };
}

impl FontMetrics for FixedMetrics {
    fn string_width(&self, text: &str) -> i32 {
        text.chars().count() as i32 * self.advance
    }

    fn height(&self) -> i32 {
        self.ascent + self.descent + self.leading
    }

    fn ascent(&self) -> i32 {
        self.ascent
    }

    fn descent(&self) -> i32 {
        self.descent
    }
}

/// Provider backed by two `FixedMetrics`.
#[derive(Debug, Clone, Copy)]
pub struct FixedFonts {
    pub regular: FixedMetrics,
    pub small: FixedMetrics,
}

impl Default for FixedFonts {
    fn default() -> Self {
        Self { regular: FixedMetrics::REGULAR, small: FixedMetrics::SMALL }
    }
}

impl FontProvider for FixedFonts {
    fn metrics(&self, size: FontSize) -> Option<&dyn FontMetrics> {
        match size {
            FontSize::Regular => Some(&self.regular),
            FontSize::Small => Some(&self.small),
        }
    }
}

/// Font files looked up in the fonts directory, per size mode.
const REGULAR_FONT_FILE: &str = "runescape.ttf";
const SMALL_FONT_FILE: &str = "runescape_small.ttf";

/// Pixel sizes of the two game fonts.
pub const REGULAR_FONT_PX: f32 = 16.0;
pub const SMALL_FONT_PX: f32 = 12.0;

/// Shared cosmic-text state. Shaping needs `&mut FontSystem`, so metrics
/// objects share it through a `RefCell`; rendering is single-threaded.
pub(crate) struct FontState {
    pub font_system: cosmic_text::FontSystem,
    pub swash_cache: cosmic_text::SwashCache,
}

/// Metrics for one size mode of a loaded font family.
pub struct CosmicMetrics {
    state: Rc<RefCell<FontState>>,
    family: String,
    font_px: f32,
}

impl std::fmt::Debug for CosmicMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CosmicMetrics")
            .field("family", &self.family)
            .field("font_px", &self.font_px)
            .finish()
    }
}

impl CosmicMetrics {
    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn font_px(&self) -> f32 {
        self.font_px
    }

    fn line_height_px(&self) -> f32 {
        (self.font_px * 1.2).ceil()
    }

    /// Shape `text` on a single unbounded line.
    pub(crate) fn shape(&self, state: &mut FontState, text: &str) -> Buffer {
        let metrics = Metrics::new(self.font_px, self.line_height_px());
        let attrs = Attrs::new().family(Family::Name(&self.family));
        let mut buffer = Buffer::new(&mut state.font_system, metrics);
        buffer.set_size(&mut state.font_system, None, None);
        buffer.set_text(&mut state.font_system, text, &attrs, Shaping::Advanced, None);
        buffer.shape_until_scroll(&mut state.font_system, true);
        buffer
    }

    pub(crate) fn state(&self) -> &Rc<RefCell<FontState>> {
        &self.state
    }
}

impl FontMetrics for CosmicMetrics {
    fn string_width(&self, text: &str) -> i32 {
        if text.is_empty() {
            return 0;
        }
        let mut state = self.state.borrow_mut();
        let buffer = self.shape(&mut state, text);
        let width = buffer.layout_runs().map(|run| run.line_w).fold(0.0_f32, f32::max);
        width.ceil() as i32
    }

    fn height(&self) -> i32 {
        self.line_height_px() as i32
    }

    fn ascent(&self) -> i32 {
        (self.font_px * 0.8).round() as i32
    }

    fn descent(&self) -> i32 {
        self.height() - self.ascent()
    }
}

/// Game fonts loaded via cosmic-text.
pub struct CosmicFonts {
    regular: Option<CosmicMetrics>,
    small: Option<CosmicMetrics>,
}

impl std::fmt::Debug for CosmicFonts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CosmicFonts")
            .field("regular", &self.regular)
            .field("small", &self.small)
            .finish()
    }
}

impl CosmicFonts {
    /// Load the game fonts from `fonts_dir`. Missing files leave that size
    /// mode without metrics; the small mode falls back to the regular family.
    pub fn new(fonts_dir: &Path) -> Self {
        let mut db = fontdb::Database::new();
        let regular_family = load_font_file(&mut db, &fonts_dir.join(REGULAR_FONT_FILE));
        let small_family = load_font_file(&mut db, &fonts_dir.join(SMALL_FONT_FILE))
            .or_else(|| regular_family.clone());

        let state = Rc::new(RefCell::new(FontState {
            font_system: cosmic_text::FontSystem::new_with_locale_and_db("en-US".to_string(), db),
            swash_cache: cosmic_text::SwashCache::new(),
        }));

        let metrics = |family: Option<String>, font_px: f32| {
            family.map(|family| CosmicMetrics { state: Rc::clone(&state), family, font_px })
        };

        Self {
            regular: metrics(regular_family, REGULAR_FONT_PX),
            small: metrics(small_family, SMALL_FONT_PX),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.regular.is_some()
    }

    pub fn cosmic_metrics(&self, size: FontSize) -> Option<&CosmicMetrics> {
        match size {
            FontSize::Regular => self.regular.as_ref(),
            FontSize::Small => self.small.as_ref(),
        }
    }
}

impl FontProvider for CosmicFonts {
    fn metrics(&self, size: FontSize) -> Option<&dyn FontMetrics> {
        self.cosmic_metrics(size).map(|m| m as &dyn FontMetrics)
    }
}

/// Load one TTF file into the database and return its family name.
fn load_font_file(db: &mut fontdb::Database, path: &Path) -> Option<String> {
    if !path.exists() {
        tracing::warn!("Font file not found: {}", path.display());
        return None;
    }
    let data = match std::fs::read(path) {
        Ok(d) => d,
        Err(e) => {
            tracing::warn!("Failed to read font {}: {}", path.display(), e);
            return None;
        }
    };
    let family = fontdb_family_name(&data)?;
    db.load_font_data(data);
    tracing::debug!("Loaded font {} -> family '{}'", path.display(), family);
    Some(family)
}

/// Extract the font family name from raw TTF data using fontdb.
fn fontdb_family_name(data: &[u8]) -> Option<String> {
    let mut tmp_db = fontdb::Database::new();
    tmp_db.load_font_data(data.to_vec());
    tmp_db
        .faces()
        .next()
        .and_then(|face| face.families.first().map(|(name, _)| name.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_metrics_measure_by_char_count() {
        let m = FixedMetrics::REGULAR;
        assert_eq!(m.string_width(""), 0);
        assert_eq!(m.string_width("hello"), 30);
        assert_eq!(m.string_width("héllo"), 30);
        assert_eq!(m.height(), 16);
    }

    #[test]
    fn fixed_fonts_resolve_both_sizes() {
        let fonts = FixedFonts::default();
        assert_eq!(fonts.metrics(FontSize::Regular).unwrap().height(), 16);
        assert_eq!(fonts.metrics(FontSize::Small).unwrap().height(), 13);
    }

    #[test]
    fn missing_font_dir_yields_no_metrics() {
        let fonts = CosmicFonts::new(Path::new("/nonexistent/fonts"));
        assert!(!fonts.is_loaded());
        assert!(fonts.metrics(FontSize::Regular).is_none());
        assert!(fonts.metrics(FontSize::Small).is_none());
    }
}
