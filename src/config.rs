//! Widget configuration persistence.
//!
//! Settings mirror the three groups the host's settings panel shows (game
//! messages, private messages, shared appearance). Stored as JSON at
//! `~/.config/chat-widgets/config.json`. The controller re-reads the active
//! config at the start of every render pass, so edits apply on the next frame.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::message::store::MergeRule;
use crate::widget::color::Rgba;

/// Default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("chat-widgets")
        .join("config.json")
}

/// Font size mode. Small mode also scales icons to 75%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontSize {
    #[default]
    Regular,
    Small,
}

/// Where the game panel is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetPosition {
    /// A fixed panel placed by the host's overlay layout.
    #[default]
    Default,
    BelowPlayer,
    AbovePlayer,
}

impl WidgetPosition {
    pub fn follows_player(self) -> bool {
        self != WidgetPosition::Default
    }
}

/// Game message panel settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSection {
    pub enabled: bool,
    pub position: WidgetPosition,
    pub max_messages: u32,
    pub text_color: Rgba,
    pub background_color: Rgba,
    pub dynamic_height: bool,
    /// Keep `<col=...>` tags and per-type colours instead of the flat text colour.
    pub retain_contextual_colours: bool,
    pub collapse_duplicates: bool,
    pub hide_duplicate_count: bool,
    /// Seconds before messages start fading (0 = never fade).
    pub fade_out_seconds: u32,
    pub width: u32,
    pub margin_top: u32,
    pub margin_bottom: u32,
    /// Extra vertical offset for player-relative positions (0 = position default).
    pub player_offset: i32,
    pub merge_rules: Vec<MergeRule>,
}

impl Default for GameSection {
    fn default() -> Self {
        Self {
            enabled: true,
            position: WidgetPosition::Default,
            max_messages: 5,
            text_color: Rgba::WHITE,
            background_color: Rgba::TRANSPARENT,
            dynamic_height: false,
            retain_contextual_colours: true,
            collapse_duplicates: false,
            hide_duplicate_count: false,
            fade_out_seconds: 0,
            width: 512,
            margin_top: 0,
            margin_bottom: 0,
            player_offset: 0,
            merge_rules: default_merge_rules(),
        }
    }
}

/// Two-part game messages the client sends as separate events.
fn default_merge_rules() -> Vec<MergeRule> {
    vec![
        MergeRule::new("You eat", "It heals", false),
        MergeRule::new("You drink", "It heals", false),
        MergeRule::new("You drink", "You have", false),
    ]
}

/// Private message panel settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrivateSection {
    pub enabled: bool,
    pub max_messages: u32,
    pub text_color: Rgba,
    /// Only drawn when the panel is not merged into the game panel.
    pub background_color: Rgba,
    pub dynamic_height: bool,
    pub fade_out_seconds: u32,
    pub width: u32,
    pub margin_top: u32,
    pub margin_bottom: u32,
    pub login_notifications: bool,
    /// Fade ceiling applied to login/logout notices.
    pub notification_fade_seconds: u32,
}

impl Default for PrivateSection {
    fn default() -> Self {
        Self {
            enabled: true,
            max_messages: 5,
            text_color: Rgba::CYAN,
            background_color: Rgba::TRANSPARENT,
            dynamic_height: false,
            fade_out_seconds: 0,
            width: 512,
            margin_top: 0,
            margin_bottom: 0,
            login_notifications: true,
            notification_fade_seconds: 5,
        }
    }
}

/// Appearance settings shared by both panels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppearanceSection {
    pub font_size: FontSize,
    pub merge_with_game_widget: bool,
    pub swap_stacking_order: bool,
    pub smart_positioning: bool,
    pub wrap_text: bool,
    pub text_shadow: bool,
    pub show_timestamp: bool,
    /// Date pattern such as `[HH:mm:ss]` or `[HH:mm]`.
    pub timestamp_format: String,
}

impl Default for AppearanceSection {
    fn default() -> Self {
        Self {
            font_size: FontSize::Regular,
            merge_with_game_widget: true,
            swap_stacking_order: false,
            smart_positioning: true,
            wrap_text: true,
            text_shadow: true,
            show_timestamp: false,
            timestamp_format: "[HH:mm]".into(),
        }
    }
}

/// Persisted widget settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    pub game: GameSection,
    pub private: PrivateSection,
    pub appearance: AppearanceSection,
}

impl WidgetConfig {
    /// Load from the default path, falling back to defaults on any error.
    pub fn load() -> Self {
        let path = default_path();
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                if path.exists() {
                    tracing::warn!("Failed to load config {}: {}", path.display(), e);
                }
                Self::default()
            }
        }
    }

    /// Load and sanitize a config file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        Ok(config.sanitized())
    }

    /// Persist as pretty JSON, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Clamp numeric settings into the ranges the settings panel allows.
    pub fn sanitized(mut self) -> Self {
        self.game.max_messages = self.game.max_messages.clamp(1, 20);
        self.game.fade_out_seconds = self.game.fade_out_seconds.min(300);
        self.game.width = self.game.width.clamp(150, 1024);
        self.game.margin_top = self.game.margin_top.min(200);
        self.game.margin_bottom = self.game.margin_bottom.min(200);
        self.game.player_offset = self.game.player_offset.clamp(-50, 50);

        self.private.max_messages = self.private.max_messages.clamp(1, 20);
        self.private.fade_out_seconds = self.private.fade_out_seconds.min(300);
        self.private.notification_fade_seconds = self.private.notification_fade_seconds.min(300);
        self.private.width = self.private.width.clamp(150, 1024);
        self.private.margin_top = self.private.margin_top.min(200);
        self.private.margin_bottom = self.private.margin_bottom.min(200);
        self
    }
}
