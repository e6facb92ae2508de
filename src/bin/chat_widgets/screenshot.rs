//! Composite replayed panels onto a canvas image.

use std::collections::HashMap;
use std::path::Path;

use chat_widgets::config::WidgetConfig;
use chat_widgets::event::{Session, Transcript};
use chat_widgets::render::{
    save_image, CosmicFonts, Dimension, FixedFonts, FontProvider, IconResolver, ImageSurface,
    OffsetSurface, RecordingSurface,
};
use chat_widgets::widget::{OverlayPosition, Rgba};

/// Collapsed chatbox footprint in resizable mode.
const CHATBOX_WIDTH: i32 = 519;
const CHATBOX_TAB_HEIGHT: i32 = 23;

const CANVAS_COLOR: Rgba = Rgba::new(48, 42, 32, 255);

pub fn screenshot_transcript(
    transcript: &Transcript,
    config: Option<WidgetConfig>,
    icons: &dyn IconResolver,
    fonts_dir: &Path,
    width: u32,
    height: u32,
    output: &Path,
) -> chat_widgets::Result<()> {
    let cosmic = CosmicFonts::new(fonts_dir);
    if !cosmic.is_loaded() {
        eprintln!("No fonts in {}; text will be measured but not drawn", fonts_dir.display());
    }
    let fixed = FixedFonts::default();
    let fonts: &dyn FontProvider = if cosmic.is_loaded() { &cosmic } else { &fixed };

    let mut session = Session::replay(transcript, config);
    let mut surface = ImageSurface::new(width, height, cosmic.is_loaded().then_some(&cosmic));
    surface.fill(CANVAS_COLOR);

    let canvas = Dimension { width: width as i32, height: height as i32 };
    let mut stacked: HashMap<OverlayPosition, i32> = HashMap::new();

    for frame in session.panels(fonts, icons) {
        if frame.prepared.is_none() {
            continue;
        }
        if frame.position == OverlayPosition::Dynamic {
            // floating panels draw in canvas coordinates
            session.render(frame.kind, fonts, icons, &mut surface);
            continue;
        }

        // measure first, then draw at the slot
        let Some(size) = session.render(frame.kind, fonts, icons, &mut RecordingSurface::new()) else {
            continue;
        };
        let used = stacked.entry(frame.position).or_insert(0);
        let (x, y) = slot_origin(frame.position, size, canvas, *used);
        *used += size.height;

        let mut offset = OffsetSurface::new(&mut surface, x, y);
        session.render(frame.kind, fonts, icons, &mut offset);
        eprintln!(
            "{} panel: {}x{} at {},{} ({:?})",
            frame.kind.name(),
            size.width,
            size.height,
            x,
            y,
            frame.position
        );
    }

    save_image(surface.image(), output)?;
    eprintln!("Saved {}x{} screenshot to {}", width, height, output.display());
    Ok(())
}

/// Top-left corner for a panel in `position`, after `used` pixels of other
/// panels already stacked in the same slot.
fn slot_origin(position: OverlayPosition, size: Dimension, canvas: Dimension, used: i32) -> (i32, i32) {
    let right = canvas.width - size.width;
    let bottom = canvas.height - size.height - used;
    match position {
        OverlayPosition::TopLeft | OverlayPosition::Dynamic => (0, used),
        OverlayPosition::TopCenter => (right / 2, used),
        OverlayPosition::TopRight | OverlayPosition::CanvasTopRight => (right, used),
        OverlayPosition::BottomLeft => (0, bottom),
        OverlayPosition::BottomRight => (right, bottom),
        OverlayPosition::AboveChatboxRight => {
            ((CHATBOX_WIDTH - size.width).max(0), bottom - CHATBOX_TAB_HEIGHT)
        }
    }
}
