//! Overlay panels and the pieces they share: colours and placement.

pub mod color;
pub mod overlay;
pub mod position;

pub use color::Rgba;
pub use overlay::{GameOverlay, MenuEntry, OverlaySet, PreparedPanel, PrivateOverlay, RenderContext};
pub use position::OverlayPosition;
