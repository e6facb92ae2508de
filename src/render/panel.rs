//! Panel layout and drawing.
//!
//! A panel stacks render lines bottom-up: the newest line sits on the lowest
//! baseline and each older line is one line height above it. Fixed panels
//! draw in panel-local coordinates and report their size to the host;
//! floating panels draw in canvas coordinates around a player anchor and
//! report nothing.

use serde::Serialize;

use super::font::FontMetrics;
use super::icon::{IconCache, IconResolver};
use super::lines::RenderLine;
use super::surface::{Rect, Surface};
use crate::config::FontSize;
use crate::host::Point;
use crate::markup::SegmentKind;
use crate::widget::color::Rgba;

/// Inner padding around content when a background is drawn.
const BACKGROUND_PADDING: i32 = 3;

/// Extra clip height below the panel so descenders of the last line survive.
const CLIP_SLACK: i32 = 4;

/// Size a fixed panel reserves in the host layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dimension {
    pub width: i32,
    pub height: i32,
}

/// Where a player-following panel is centred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FloatingAnchor {
    pub point: Point,
    /// Zoom offset plus the user's player offset.
    pub vertical_offset: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Fixed,
    /// Follows the player. Without an anchor the panel draws at the origin.
    Floating(Option<FloatingAnchor>),
}

/// Geometry and styling for one panel draw.
#[derive(Debug, Clone, Copy)]
pub struct PanelLayout {
    pub width: i32,
    pub font_size: FontSize,
    pub background: Rgba,
    pub margin_top: i32,
    pub margin_bottom: i32,
    pub dynamic_height: bool,
    /// Lines reserved in static height mode.
    pub slot_count: usize,
    pub text_shadow: bool,
    pub placement: Placement,
}

impl PanelLayout {
    fn is_floating(&self) -> bool {
        matches!(self.placement, Placement::Floating(_))
    }

    fn padding(&self) -> i32 {
        if !self.background.is_transparent() && !self.is_floating() {
            BACKGROUND_PADDING
        } else {
            0
        }
    }
}

/// Vertical advance between baselines.
pub fn line_height(metrics: &dyn FontMetrics, font_size: FontSize) -> i32 {
    let correction = match font_size {
        FontSize::Small => 2,
        FontSize::Regular => 3,
    };
    metrics.height() - correction + 1
}

/// Draw an icon with its bottom near the text baseline. Returns the advance.
#[allow(clippy::too_many_arguments)]
fn draw_icon(
    surface: &mut dyn Surface,
    cache: &mut IconCache,
    icons: &dyn IconResolver,
    id: u32,
    font_size: FontSize,
    metrics: &dyn FontMetrics,
    x: i32,
    baseline: i32,
    top: i32,
    alpha: u8,
) -> i32 {
    let Some(image) = cache.resolve(icons, id) else {
        return 0;
    };
    let (mut width, mut height) = (image.width() as i32, image.height() as i32);
    let mut icon_y = baseline - height + metrics.descent() - 4;
    if font_size == FontSize::Small {
        width = (width as f32 * 0.75) as i32;
        height = (height as f32 * 0.75) as i32;
        icon_y = baseline - height + metrics.descent() - 2;
    }
    surface.draw_image(image, x + 1, icon_y.max(top), width, height, alpha);
    width + 2
}

/// Draw a text run with an optional black shadow. Returns the advance.
#[allow(clippy::too_many_arguments)]
fn draw_text(
    surface: &mut dyn Surface,
    text: &str,
    width: i32,
    color: Rgba,
    alpha: u8,
    x: i32,
    baseline: i32,
    shadow: bool,
    font_size: FontSize,
) -> i32 {
    if shadow {
        surface.draw_text(text, x + 2, baseline + 1, Rgba::BLACK.with_alpha(alpha), font_size);
    }
    surface.draw_text(text, x + 1, baseline, color.with_alpha(alpha), font_size);
    width
}

/// Lay out and draw `lines` (oldest first). Fully faded lines keep their
/// row but draw nothing.
///
/// Returns the reserved size for fixed panels, `None` for floating panels and
/// when there is nothing to draw.
pub fn draw_panel(
    lines: &[RenderLine],
    layout: &PanelLayout,
    metrics: &dyn FontMetrics,
    icons: &dyn IconResolver,
    cache: &mut IconCache,
    surface: &mut dyn Surface,
) -> Option<Dimension> {
    if lines.is_empty() {
        return None;
    }

    let lh = line_height(metrics, layout.font_size);
    let floating = layout.is_floating();
    let rows = if floating || layout.dynamic_height { lines.len() } else { layout.slot_count };
    let pad = layout.padding();

    let content_height = rows as i32 * lh + pad * 2;
    let widget_height = content_height + layout.margin_top + layout.margin_bottom;
    let width = layout.width;

    let (ox, oy) = match layout.placement {
        Placement::Floating(Some(anchor)) => (
            anchor.point.x - width / 2,
            anchor.point.y + anchor.vertical_offset - widget_height / 2,
        ),
        _ => (0, 0),
    };

    if pad > 0 {
        surface.fill_rect(Rect::new(ox, oy + layout.margin_top, width, content_height), layout.background);
    }
    surface.set_clip(Some(Rect::new(ox, oy, width, widget_height + CLIP_SLACK)));

    let mut y = oy + widget_height - pad - layout.margin_bottom - metrics.descent();
    for line in lines.iter().rev() {
        if line.alpha == 0 {
            y -= lh;
            continue;
        }
        let mut x = if floating {
            ox + pad + (width - pad * 2 - line.width()) / 2
        } else {
            ox + pad
        };

        for segment in &line.segments {
            x += match segment.kind {
                SegmentKind::Icon => match segment.icon_id {
                    Some(id) => draw_icon(
                        surface,
                        cache,
                        icons,
                        id,
                        layout.font_size,
                        metrics,
                        x,
                        y,
                        oy,
                        line.alpha,
                    ),
                    None => 0,
                },
                SegmentKind::Text => draw_text(
                    surface,
                    &segment.text,
                    segment.pixel_width,
                    segment.color,
                    line.alpha,
                    x,
                    y,
                    layout.text_shadow,
                    layout.font_size,
                ),
                SegmentKind::LineBreak => 0,
            };
        }
        y -= lh;
    }

    surface.set_clip(None);
    tracing::trace!("Drew {} line(s) in {}x{} panel", lines.len(), width, widget_height);

    if floating {
        None
    } else {
        Some(Dimension { width, height: widget_height })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::TextSegment;
    use crate::render::font::FixedMetrics;
    use crate::render::icon::{IndexedSprite, NoIcons};
    use crate::render::surface::{DrawCommand, RecordingSurface};

    const M: FixedMetrics = FixedMetrics::REGULAR;

    fn line(text: &str, alpha: u8) -> RenderLine {
        RenderLine { segments: vec![TextSegment::text(text, Rgba::WHITE, &M)], alpha }
    }

    fn layout() -> PanelLayout {
        PanelLayout {
            width: 200,
            font_size: FontSize::Regular,
            background: Rgba::TRANSPARENT,
            margin_top: 0,
            margin_bottom: 0,
            dynamic_height: false,
            slot_count: 5,
            text_shadow: false,
            placement: Placement::Fixed,
        }
    }

    fn draw(lines: &[RenderLine], layout: &PanelLayout) -> (Option<Dimension>, RecordingSurface) {
        let mut surface = RecordingSurface::new();
        let dim = draw_panel(lines, layout, &M, &NoIcons, &mut IconCache::new(), &mut surface);
        (dim, surface)
    }

    #[test]
    fn line_height_correction() {
        assert_eq!(line_height(&FixedMetrics::REGULAR, FontSize::Regular), 14);
        assert_eq!(line_height(&FixedMetrics::SMALL, FontSize::Small), 12);
    }

    #[test]
    fn empty_panel_returns_none() {
        let (dim, surface) = draw(&[], &layout());
        assert!(dim.is_none());
        assert!(surface.commands.is_empty());
    }

    #[test]
    fn faded_lines_keep_their_row() {
        let layout = PanelLayout { dynamic_height: true, ..layout() };
        let (dim, surface) = draw(&[line("kept", 255), line("gone", 0)], &layout);
        assert_eq!(dim, Some(Dimension { width: 200, height: 28 }));
        // "kept" sits one row above the empty bottom row
        insta::assert_snapshot!(surface.dump(), @r#"
        clip 0,0 200x32
        text 1,11 #FFFFFFFF "kept"
        clip none
        "#);
    }

    #[test]
    fn static_height_uses_slots() {
        let (dim, surface) = draw(&[line("old", 255), line("new", 255)], &layout());
        assert_eq!(dim, Some(Dimension { width: 200, height: 70 }));
        // newest on the bottom baseline: 70 - descent 3
        insta::assert_snapshot!(surface.dump(), @r#"
        clip 0,0 200x74
        text 1,67 #FFFFFFFF "new"
        text 1,53 #FFFFFFFF "old"
        clip none
        "#);
    }

    #[test]
    fn dynamic_height_with_background_and_margins() {
        let layout = PanelLayout {
            dynamic_height: true,
            background: Rgba::new(0, 0, 0, 128),
            margin_top: 4,
            margin_bottom: 2,
            text_shadow: true,
            ..layout()
        };
        let (dim, surface) = draw(&[line("hi", 128)], &layout);
        // 14 + 2*3 padding + 4 + 2 margins
        assert_eq!(dim, Some(Dimension { width: 200, height: 26 }));
        insta::assert_snapshot!(surface.dump(), @r#"
        fill 0,4 200x20 #00000080
        clip 0,0 200x30
        text 5,19 #00000080 "hi"
        text 4,18 #FFFFFF80 "hi"
        clip none
        "#);
    }

    #[test]
    fn floating_panel_centres_lines_and_reports_nothing() {
        let layout = PanelLayout {
            background: Rgba::BLACK,
            placement: Placement::Floating(Some(FloatingAnchor {
                point: Point { x: 400, y: 300 },
                vertical_offset: 20,
            })),
            ..layout()
        };
        let (dim, surface) = draw(&[line("abcd", 255)], &layout);
        assert!(dim.is_none());
        // no background on floating panels; origin (300, 313), height 14
        insta::assert_snapshot!(surface.dump(), @r#"
        clip 300,313 200x18
        text 389,324 #FFFFFFFF "abcd"
        clip none
        "#);
    }

    #[test]
    fn icons_advance_by_drawn_width() {
        let icons = vec![Some(IndexedSprite::solid(10, 11, 0xFFFFFF))];
        let segments = vec![TextSegment::icon(0, 11, Rgba::WHITE), TextSegment::text("x", Rgba::WHITE, &M)];
        let mut surface = RecordingSurface::new();
        draw_panel(
            &[RenderLine { segments, alpha: 255 }],
            &PanelLayout { dynamic_height: true, ..layout() },
            &M,
            &icons,
            &mut IconCache::new(),
            &mut surface,
        );
        assert_eq!(
            surface.commands[1],
            DrawCommand::Image { x: 1, y: 0, width: 10, height: 11, alpha: 255 }
        );
        assert!(matches!(surface.commands[2], DrawCommand::Text { x: 13, .. }));
    }
}
