//! Headless sessions: a controller, both overlays and a scripted host.

use crate::config::WidgetConfig;
use crate::host::StaticHost;
use crate::plugin::ChatWidgets;
use crate::render::font::FontProvider;
use crate::render::icon::IconResolver;
use crate::render::panel::Dimension;
use crate::render::surface::Surface;
use crate::widget::overlay::{OverlaySet, PreparedPanel, RenderContext};
use crate::widget::position::OverlayPosition;

use super::{TimedEvent, Transcript};

/// Which overlay a frame belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelKind {
    Game,
    Private,
}

impl PanelKind {
    pub fn name(self) -> &'static str {
        match self {
            PanelKind::Game => "game",
            PanelKind::Private => "private",
        }
    }
}

/// Placement metadata plus prepared content for one overlay.
#[derive(Debug, Clone)]
pub struct PanelFrame {
    pub kind: PanelKind,
    pub position: OverlayPosition,
    pub priority: u8,
    /// `None` when the overlay is hidden this frame.
    pub prepared: Option<PreparedPanel>,
}

#[derive(Debug)]
pub struct Session {
    pub plugin: ChatWidgets,
    pub overlays: OverlaySet,
    pub host: StaticHost,
    pub now_ms: i64,
}

impl Session {
    pub fn start(host: StaticHost, config: WidgetConfig) -> Self {
        let plugin = ChatWidgets::new(config);
        plugin.start_up(&host);
        let overlays = OverlaySet::new(host.resized);
        Self { plugin, overlays, host, now_ms: 0 }
    }

    /// Start from the transcript's host and run every event. `config` wins
    /// over the transcript's own config.
    pub fn replay(transcript: &Transcript, config: Option<WidgetConfig>) -> Self {
        let config = config.or_else(|| transcript.config.clone()).unwrap_or_default();
        let mut session = Self::start(transcript.host.clone(), config);
        for event in transcript.queue().drain() {
            session.apply(&event);
        }
        session.now_ms = transcript.end_ms();
        tracing::debug!("Replayed {} event(s) up to {} ms", transcript.events.len(), session.now_ms);
        session
    }

    pub fn apply(&mut self, event: &TimedEvent) {
        self.now_ms = event.at_ms;
        self.host.apply(&event.event);
        self.overlays.dispatch(&self.plugin, &event.event, &self.host, event.at_ms);
    }

    /// Both overlays, highest priority first.
    pub fn panels(&self, fonts: &dyn FontProvider, icons: &dyn IconResolver) -> Vec<PanelFrame> {
        let config = self.plugin.config();
        let ctx = RenderContext { host: &self.host, fonts, icons, now_ms: self.now_ms };
        let mut frames = vec![
            PanelFrame {
                kind: PanelKind::Game,
                position: self.overlays.game.position(&config),
                priority: self.overlays.game.priority(&config),
                prepared: self.overlays.game.prepare(&self.plugin, &ctx),
            },
            PanelFrame {
                kind: PanelKind::Private,
                position: self.overlays.private.position(),
                priority: self.overlays.private.priority(&config),
                prepared: self.overlays.private.prepare(&self.plugin, &ctx),
            },
        ];
        frames.sort_by(|a, b| b.priority.cmp(&a.priority));
        frames
    }

    pub fn render(
        &mut self,
        kind: PanelKind,
        fonts: &dyn FontProvider,
        icons: &dyn IconResolver,
        surface: &mut dyn Surface,
    ) -> Option<Dimension> {
        let ctx = RenderContext { host: &self.host, fonts, icons, now_ms: self.now_ms };
        match kind {
            PanelKind::Game => self.overlays.game.render(&self.plugin, &ctx, surface),
            PanelKind::Private => self.overlays.private.render(&self.plugin, &ctx, surface),
        }
    }

    pub fn shut_down(&self) {
        self.plugin.shut_down(&self.host);
    }
}
