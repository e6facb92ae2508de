//! The game client as seen by the widgets.
//!
//! Everything here is polled: the controller and overlays ask for the state
//! they need on each event or frame and never cache it.

use std::cell::Cell;

use serde::{Deserialize, Serialize};

use crate::config::WidgetPosition;
use crate::event::HostEvent;
use crate::widget::color::Rgba;

/// Client connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameState {
    Starting,
    #[default]
    LoginScreen,
    Loading,
    LoggedIn,
    ConnectionLost,
    Hopping,
}

/// Canvas position in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

/// Host queries and side effects the widgets depend on.
pub trait HostState {
    /// Resizable (modern) client layout rather than fixed.
    fn is_resized(&self) -> bool;
    /// The native chatbox is collapsed.
    fn is_chatbox_hidden(&self) -> bool;
    fn game_state(&self) -> GameState;
    /// Game chat filter: hides spam-classified messages.
    fn spam_filter_enabled(&self) -> bool;
    fn boss_kill_count_filter_enabled(&self) -> bool;
    fn camera_zoom(&self) -> i32;
    /// Canvas point a player-following panel centres on, if the player is
    /// on screen.
    fn player_anchor(&self, position: WidgetPosition) -> Option<Point>;
    /// Theme colour for `<colHIGHLIGHT>`.
    fn highlight_color(&self) -> Option<Rgba> {
        None
    }
    /// Show or hide the client's own private message widgets.
    fn set_native_private_chat_hidden(&self, hidden: bool);
}

/// A host whose state is plain data, used for transcript replay and tests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticHost {
    pub resized: bool,
    pub chatbox_hidden: bool,
    pub game_state: GameState,
    pub spam_filter: bool,
    pub boss_kill_count_filter: bool,
    pub zoom: i32,
    /// Player's feet on the canvas.
    pub player: Option<Point>,
    /// Pixel height from the player's feet to the top of their model.
    pub player_height: i32,
    pub highlight: Option<Rgba>,
    pub native_private_chat_hidden: Cell<bool>,
}

impl Default for StaticHost {
    fn default() -> Self {
        Self {
            resized: true,
            chatbox_hidden: true,
            game_state: GameState::LoggedIn,
            spam_filter: false,
            boss_kill_count_filter: false,
            zoom: 512,
            player: None,
            player_height: 80,
            highlight: None,
            native_private_chat_hidden: Cell::new(false),
        }
    }
}

impl StaticHost {
    /// Mirror state changes carried by a replayed event.
    pub fn apply(&mut self, event: &HostEvent) {
        match event {
            HostEvent::GameStateChanged { state } => self.game_state = *state,
            HostEvent::ResizeableChanged { resized } => self.resized = *resized,
            HostEvent::ChatViewChanged { hidden } => self.chatbox_hidden = *hidden,
            _ => {}
        }
    }
}

impl HostState for StaticHost {
    fn is_resized(&self) -> bool {
        self.resized
    }

    fn is_chatbox_hidden(&self) -> bool {
        self.chatbox_hidden
    }

    fn game_state(&self) -> GameState {
        self.game_state
    }

    fn spam_filter_enabled(&self) -> bool {
        self.spam_filter
    }

    fn boss_kill_count_filter_enabled(&self) -> bool {
        self.boss_kill_count_filter
    }

    fn camera_zoom(&self) -> i32 {
        self.zoom
    }

    fn player_anchor(&self, position: WidgetPosition) -> Option<Point> {
        let feet = self.player?;
        match position {
            WidgetPosition::AbovePlayer => Some(Point { x: feet.x, y: feet.y - self.player_height }),
            _ => Some(feet),
        }
    }

    fn highlight_color(&self) -> Option<Rgba> {
        self.highlight
    }

    fn set_native_private_chat_hidden(&self, hidden: bool) {
        self.native_private_chat_hidden.set(hidden);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchors_follow_position() {
        let host = StaticHost {
            player: Some(Point { x: 100, y: 200 }),
            player_height: 60,
            ..StaticHost::default()
        };
        assert_eq!(host.player_anchor(WidgetPosition::BelowPlayer), Some(Point { x: 100, y: 200 }));
        assert_eq!(host.player_anchor(WidgetPosition::AbovePlayer), Some(Point { x: 100, y: 140 }));
        assert_eq!(StaticHost::default().player_anchor(WidgetPosition::AbovePlayer), None);
    }

    #[test]
    fn apply_mirrors_state_events() {
        let mut host = StaticHost::default();
        host.apply(&HostEvent::ResizeableChanged { resized: false });
        host.apply(&HostEvent::GameStateChanged { state: GameState::LoginScreen });
        assert!(!host.is_resized());
        assert_eq!(host.game_state(), GameState::LoginScreen);
    }

    #[test]
    fn deserializes_partial_json() {
        let host: StaticHost = serde_json::from_str(r#"{ "zoom": 900, "game_state": "logged_in" }"#).unwrap();
        assert_eq!(host.zoom, 900);
        assert!(host.resized);
        assert!(!host.native_private_chat_hidden.get());
    }
}
