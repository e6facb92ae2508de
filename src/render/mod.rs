//! Line layout and drawing for chat panels.

pub mod font;
pub mod icon;
pub mod lines;
pub mod panel;
pub mod software;
pub mod surface;
pub mod timestamp;
pub mod wrap;

pub use font::{CosmicFonts, FixedFonts, FixedMetrics, FontMetrics, FontProvider};
pub use icon::{IconCache, IconResolver, IndexedSprite, NoIcons};
pub use lines::{build_entry_lines, calculate_alpha, LineStyle, RenderLine};
pub use panel::{draw_panel, line_height, Dimension, FloatingAnchor, PanelLayout, Placement};
pub use software::{save_image, ImageSurface};
pub use surface::{DrawCommand, OffsetSurface, RecordingSurface, Rect, Surface};
pub use wrap::wrap_segments;
