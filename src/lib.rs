//! Chat Widgets
//!
//! Overlay panels that show recent game and private chat while the client's
//! chatbox is collapsed. Buffers incoming messages, parses the client's
//! inline markup, wraps and fades lines, and draws them onto any surface.

pub mod config;
pub mod error;
pub mod event;
pub mod host;
pub mod markup;
pub mod message;
pub mod plugin;
pub mod render;
pub mod widget;

pub use config::WidgetConfig;
pub use error::{Error, Result};
pub use host::{GameState, HostState, StaticHost};
pub use plugin::{ChatWidgets, ClearTarget};
