//! Panel placement: host layout slots and player-relative offsets.

use serde::{Deserialize, Serialize};

use crate::config::WidgetPosition;

/// Layout slots the host's overlay manager knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayPosition {
    TopLeft,
    TopCenter,
    TopRight,
    CanvasTopRight,
    BottomLeft,
    BottomRight,
    AboveChatboxRight,
    /// Drawn wherever the overlay decides (player-following panels).
    Dynamic,
}

impl OverlayPosition {
    pub fn is_top(self) -> bool {
        matches!(
            self,
            OverlayPosition::TopLeft
                | OverlayPosition::TopCenter
                | OverlayPosition::TopRight
                | OverlayPosition::CanvasTopRight
        )
    }
}

const MIN_ZOOM: i32 = -22;
const MAX_ZOOM: i32 = 1400;
const BELOW_OFFSET_MIN_ZOOM: i32 = 40;
const BELOW_OFFSET_MAX_ZOOM: i32 = 150;
const ABOVE_OFFSET_MIN_ZOOM: i32 = -40;
const ABOVE_OFFSET_MAX_ZOOM: i32 = -120;

/// Vertical offset from the player anchor for the current camera zoom.
/// Zooming in pushes the panel further from the player.
pub fn zoom_offset(zoom: i32, position: WidgetPosition) -> i32 {
    let t = (f64::from(zoom - MIN_ZOOM) / f64::from(MAX_ZOOM - MIN_ZOOM)).clamp(0.0, 1.0);
    let (near, far) = match position {
        WidgetPosition::BelowPlayer => (BELOW_OFFSET_MIN_ZOOM, BELOW_OFFSET_MAX_ZOOM),
        _ => (ABOVE_OFFSET_MIN_ZOOM, ABOVE_OFFSET_MAX_ZOOM),
    };
    (f64::from(near) + t * f64::from(far - near)) as i32
}

/// User offset for player-relative panels. Zero selects the default for the
/// side; other values may only pull the panel towards the player.
pub fn clamped_player_offset(offset: i32, position: WidgetPosition) -> i32 {
    match position {
        WidgetPosition::BelowPlayer if offset == 0 => -25,
        WidgetPosition::BelowPlayer => offset.clamp(-50, 0),
        _ if offset == 0 => 25,
        _ => offset.clamp(0, 50),
    }
}

/// Slot a panel starts in for the client layout.
pub fn default_position(resized: bool) -> OverlayPosition {
    if resized {
        OverlayPosition::AboveChatboxRight
    } else {
        OverlayPosition::BottomLeft
    }
}

/// Slot smart positioning wants for `current`, if it differs.
///
/// Panels the user pinned to a top slot are left alone.
pub fn smart_position(
    enabled: bool,
    current: OverlayPosition,
    resized: bool,
    chatbox_hidden: bool,
) -> Option<OverlayPosition> {
    if !enabled || current.is_top() {
        return None;
    }
    let target = if !resized {
        OverlayPosition::BottomLeft
    } else if chatbox_hidden {
        OverlayPosition::AboveChatboxRight
    } else {
        return None;
    };
    (target != current).then_some(target)
}
