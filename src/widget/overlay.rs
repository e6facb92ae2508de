//! The two chat panels as the host's overlay manager sees them.
//!
//! Each overlay keeps its own placement state and icon cache, and on every
//! frame turns the controller's filtered entries into render lines and draws
//! them. Visibility and merging are decided by the controller.

use crate::config::WidgetConfig;
use crate::event::HostEvent;
use crate::host::HostState;
use crate::message::ChatEntry;
use crate::plugin::ChatWidgets;
use crate::render::font::{FontMetrics, FontProvider};
use crate::render::icon::{IconCache, IconResolver};
use crate::render::lines::{build_entry_lines, LineStyle, RenderLine};
use crate::render::panel::{draw_panel, Dimension, FloatingAnchor, PanelLayout, Placement};
use crate::render::surface::Surface;
use crate::widget::position::{
    clamped_player_offset, default_position, smart_position, zoom_offset, OverlayPosition,
};

const GAME_PRIORITY: u8 = 10;
const PRIVATE_PRIORITY: u8 = 9;

/// Context menu entry shown when the overlay is right-clicked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
    pub option: String,
    pub target: String,
}

impl MenuEntry {
    fn clear(target: &str) -> Self {
        Self { option: "Clear".into(), target: target.into() }
    }
}

/// Everything a render pass reads from the outside world.
#[derive(Clone, Copy)]
pub struct RenderContext<'a> {
    pub host: &'a dyn HostState,
    pub fonts: &'a dyn FontProvider,
    pub icons: &'a dyn IconResolver,
    pub now_ms: i64,
}

/// One frame's worth of panel content, ready to draw.
#[derive(Debug, Clone)]
pub struct PreparedPanel {
    /// Oldest first.
    pub lines: Vec<RenderLine>,
    pub layout: PanelLayout,
    /// Private lines are included.
    pub merged: bool,
}

/// Placement and caches shared by both overlays.
#[derive(Debug)]
struct OverlayFrame {
    position: OverlayPosition,
    /// Slot chosen by the user or by smart positioning.
    preferred_position: Option<OverlayPosition>,
    /// Size the user dragged the overlay to.
    preferred_size: Option<Dimension>,
    icon_cache: IconCache,
    menu_entries: Vec<MenuEntry>,
}

impl OverlayFrame {
    fn new(resized: bool, menu_target: &str) -> Self {
        Self {
            position: default_position(resized),
            preferred_position: None,
            preferred_size: None,
            icon_cache: IconCache::new(),
            menu_entries: vec![MenuEntry::clear(menu_target)],
        }
    }

    fn current_position(&self) -> OverlayPosition {
        self.preferred_position.unwrap_or(self.position)
    }

    fn update_smart_position(&mut self, enabled: bool, host: &dyn HostState) {
        let target = smart_position(
            enabled,
            self.current_position(),
            host.is_resized(),
            host.is_chatbox_hidden(),
        );
        if let Some(target) = target {
            tracing::debug!("Smart positioning moved overlay to {target:?}");
            self.preferred_position = Some(target);
        }
    }

    fn draw(
        &mut self,
        panel: &PreparedPanel,
        ctx: &RenderContext<'_>,
        surface: &mut dyn Surface,
    ) -> Option<Dimension> {
        let metrics = ctx.fonts.metrics(panel.layout.font_size)?;
        draw_panel(&panel.lines, &panel.layout, metrics, ctx.icons, &mut self.icon_cache, surface)
    }

    fn width(&self, configured: u32) -> i32 {
        match self.preferred_size {
            Some(size) if size.width > 0 => size.width,
            _ => configured as i32,
        }
    }
}

fn game_style<'a>(config: &'a WidgetConfig, host: &dyn HostState, width: i32) -> LineStyle<'a> {
    LineStyle {
        text_color: config.game.text_color,
        highlight_color: host.highlight_color(),
        retain_contextual_colours: config.game.retain_contextual_colours,
        font_size: config.appearance.font_size,
        wrap: config.appearance.wrap_text,
        width,
        timestamp_format: timestamp_format(config),
        hide_repeat_count: config.game.hide_duplicate_count,
        fade_seconds: config.game.fade_out_seconds,
    }
}

fn private_style<'a>(config: &'a WidgetConfig, host: &dyn HostState, width: i32) -> LineStyle<'a> {
    LineStyle {
        text_color: config.private.text_color,
        highlight_color: host.highlight_color(),
        retain_contextual_colours: false,
        font_size: config.appearance.font_size,
        wrap: config.appearance.wrap_text,
        width,
        timestamp_format: timestamp_format(config),
        hide_repeat_count: true,
        fade_seconds: config.private.fade_out_seconds,
    }
}

fn timestamp_format(config: &WidgetConfig) -> Option<&str> {
    config.appearance.show_timestamp.then_some(config.appearance.timestamp_format.as_str())
}

fn collect_lines(
    entries: &[ChatEntry],
    style: &LineStyle<'_>,
    now_ms: i64,
    metrics: &dyn FontMetrics,
    icons: &dyn IconResolver,
    out: &mut Vec<RenderLine>,
) {
    for entry in entries {
        out.extend(build_entry_lines(entry, style, now_ms, metrics, icons));
    }
}

/// Game message panel. Also hosts private messages when merged.
#[derive(Debug)]
pub struct GameOverlay {
    frame: OverlayFrame,
}

impl GameOverlay {
    pub fn new(resized: bool) -> Self {
        Self { frame: OverlayFrame::new(resized, "Game chat history") }
    }

    /// Slot requested from the host. Player-following panels place
    /// themselves.
    pub fn position(&self, config: &WidgetConfig) -> OverlayPosition {
        if config.game.position.follows_player() {
            OverlayPosition::Dynamic
        } else {
            self.frame.current_position()
        }
    }

    pub fn preferred_position(&self) -> Option<OverlayPosition> {
        self.frame.preferred_position
    }

    pub fn set_preferred_position(&mut self, position: Option<OverlayPosition>) {
        self.frame.preferred_position = position;
    }

    pub fn set_preferred_size(&mut self, size: Option<Dimension>) {
        self.frame.preferred_size = size;
    }

    pub fn priority(&self, config: &WidgetConfig) -> u8 {
        if config.appearance.swap_stacking_order { PRIVATE_PRIORITY } else { GAME_PRIORITY }
    }

    pub fn menu_entries(&self) -> &[MenuEntry] {
        &self.frame.menu_entries
    }

    /// Lines and layout for this frame, or `None` when the panel is hidden.
    pub fn prepare(&self, plugin: &ChatWidgets, ctx: &RenderContext<'_>) -> Option<PreparedPanel> {
        let config = plugin.config();
        if !plugin.should_show_game_overlay(ctx.host) {
            return None;
        }
        let metrics = ctx.fonts.metrics(config.appearance.font_size)?;
        let merged = plugin.is_merged(ctx.host);

        let position = config.game.position;
        let follows = position.follows_player();
        let placement = if follows {
            let point = ctx.host.player_anchor(position)?;
            let vertical_offset = zoom_offset(ctx.host.camera_zoom(), position)
                + clamped_player_offset(config.game.player_offset, position);
            Placement::Floating(Some(FloatingAnchor { point, vertical_offset }))
        } else {
            Placement::Fixed
        };

        // lines wrap at the full panel width, padding included
        let width = self.frame.width(config.game.width);

        let mut lines = Vec::new();
        let game_entries = plugin.game_messages(ctx.host, ctx.now_ms);
        let game_style = game_style(&config, ctx.host, width);
        if merged {
            let private_entries = plugin.private_messages(ctx.now_ms);
            let private_style = private_style(&config, ctx.host, width);
            if config.appearance.swap_stacking_order {
                collect_lines(&game_entries, &game_style, ctx.now_ms, metrics, ctx.icons, &mut lines);
                collect_lines(&private_entries, &private_style, ctx.now_ms, metrics, ctx.icons, &mut lines);
            } else {
                collect_lines(&private_entries, &private_style, ctx.now_ms, metrics, ctx.icons, &mut lines);
                collect_lines(&game_entries, &game_style, ctx.now_ms, metrics, ctx.icons, &mut lines);
            }
        } else {
            collect_lines(&game_entries, &game_style, ctx.now_ms, metrics, ctx.icons, &mut lines);
        }

        let slot_count = config.game.max_messages as usize
            + if merged { config.private.max_messages as usize } else { 0 };
        let layout = PanelLayout {
            width,
            font_size: config.appearance.font_size,
            background: config.game.background_color,
            margin_top: config.game.margin_top as i32,
            margin_bottom: config.game.margin_bottom as i32,
            dynamic_height: follows || config.game.dynamic_height,
            slot_count,
            text_shadow: config.appearance.text_shadow,
            placement,
        };
        Some(PreparedPanel { lines, layout, merged })
    }

    pub fn render(
        &mut self,
        plugin: &ChatWidgets,
        ctx: &RenderContext<'_>,
        surface: &mut dyn Surface,
    ) -> Option<Dimension> {
        let panel = self.prepare(plugin, ctx)?;
        let target = if panel.merged { "Merged chat history" } else { "Game chat history" };
        self.frame.menu_entries = vec![MenuEntry::clear(target)];
        self.frame.draw(&panel, ctx, surface)
    }
}

/// Private message panel. Hidden while merged into the game panel.
#[derive(Debug)]
pub struct PrivateOverlay {
    frame: OverlayFrame,
}

impl PrivateOverlay {
    pub fn new(resized: bool) -> Self {
        Self { frame: OverlayFrame::new(resized, "Private chat history") }
    }

    pub fn position(&self) -> OverlayPosition {
        self.frame.current_position()
    }

    pub fn preferred_position(&self) -> Option<OverlayPosition> {
        self.frame.preferred_position
    }

    pub fn set_preferred_position(&mut self, position: Option<OverlayPosition>) {
        self.frame.preferred_position = position;
    }

    pub fn set_preferred_size(&mut self, size: Option<Dimension>) {
        self.frame.preferred_size = size;
    }

    pub fn priority(&self, config: &WidgetConfig) -> u8 {
        if config.appearance.swap_stacking_order { GAME_PRIORITY } else { PRIVATE_PRIORITY }
    }

    pub fn menu_entries(&self) -> &[MenuEntry] {
        &self.frame.menu_entries
    }

    /// Lines and layout for this frame, or `None` when the panel is hidden
    /// or merged.
    pub fn prepare(&self, plugin: &ChatWidgets, ctx: &RenderContext<'_>) -> Option<PreparedPanel> {
        if !plugin.should_show_private_overlay() || plugin.is_merged(ctx.host) {
            return None;
        }
        let config = plugin.config();
        let metrics = ctx.fonts.metrics(config.appearance.font_size)?;

        let width = self.frame.width(config.private.width);
        let style = private_style(&config, ctx.host, width);

        let mut lines = Vec::new();
        let entries = plugin.private_messages(ctx.now_ms);
        collect_lines(&entries, &style, ctx.now_ms, metrics, ctx.icons, &mut lines);

        let layout = PanelLayout {
            width,
            font_size: config.appearance.font_size,
            background: config.private.background_color,
            margin_top: config.private.margin_top as i32,
            margin_bottom: config.private.margin_bottom as i32,
            dynamic_height: config.private.dynamic_height,
            slot_count: config.private.max_messages as usize,
            text_shadow: config.appearance.text_shadow,
            placement: Placement::Fixed,
        };
        Some(PreparedPanel { lines, layout, merged: false })
    }

    pub fn render(
        &mut self,
        plugin: &ChatWidgets,
        ctx: &RenderContext<'_>,
        surface: &mut dyn Surface,
    ) -> Option<Dimension> {
        let panel = self.prepare(plugin, ctx)?;
        self.frame.draw(&panel, ctx, surface)
    }
}

/// Both overlays plus the layout bookkeeping host events trigger.
#[derive(Debug)]
pub struct OverlaySet {
    pub game: GameOverlay,
    pub private: PrivateOverlay,
}

impl OverlaySet {
    pub fn new(resized: bool) -> Self {
        Self { game: GameOverlay::new(resized), private: PrivateOverlay::new(resized) }
    }

    /// Feed an event to the controller, then move overlays if the client
    /// layout changed. `host` must already reflect the event.
    pub fn dispatch(&mut self, plugin: &ChatWidgets, event: &HostEvent, host: &dyn HostState, now_ms: i64) {
        plugin.handle_event(event, host, now_ms);

        let smart = plugin.config().appearance.smart_positioning;
        match event {
            HostEvent::ResizeableChanged { resized } => {
                self.game.frame.position = default_position(*resized);
                self.private.frame.position = default_position(*resized);
                self.game.frame.update_smart_position(smart, host);
                self.private.frame.update_smart_position(smart, host);
            }
            HostEvent::ChatViewChanged { .. } => {
                self.game.frame.update_smart_position(smart, host);
                self.private.frame.update_smart_position(smart, host);
            }
            _ => {}
        }
    }
}
