//! Shared test helpers.

use chat_widgets::config::WidgetConfig;
use chat_widgets::event::{HostEvent, PanelKind, Session, TimedEvent, Transcript};
use chat_widgets::host::StaticHost;
use chat_widgets::message::ChatEvent;
use chat_widgets::render::{FixedFonts, IconResolver, NoIcons, RecordingSurface};

/// Defaults with shadows off so draw dumps stay short.
#[allow(dead_code)]
pub fn quiet_config() -> WidgetConfig {
    let mut config = WidgetConfig::default();
    config.appearance.text_shadow = false;
    config
}

#[allow(dead_code)]
pub fn game(at_ms: i64, text: &str) -> TimedEvent {
    TimedEvent { at_ms, event: HostEvent::ChatMessage(ChatEvent::new("GAMEMESSAGE", text, None)) }
}

#[allow(dead_code)]
pub fn private_from(at_ms: i64, sender: &str, text: &str) -> TimedEvent {
    TimedEvent {
        at_ms,
        event: HostEvent::ChatMessage(ChatEvent::new("PRIVATECHAT", text, Some(sender))),
    }
}

#[allow(dead_code)]
pub fn event(at_ms: i64, event: HostEvent) -> TimedEvent {
    TimedEvent { at_ms, event }
}

/// Replay `events` on `host` with `config`, rendering at `render_at_ms`.
#[allow(dead_code)]
pub fn replay(host: StaticHost, config: WidgetConfig, events: Vec<TimedEvent>, render_at_ms: i64) -> Session {
    let transcript = Transcript {
        host,
        config: Some(config),
        render_at_ms: Some(render_at_ms),
        events,
    };
    Session::replay(&transcript, None)
}

/// Render one panel with fixed metrics and return its draw dump.
#[allow(dead_code)]
pub fn dump_panel(session: &mut Session, kind: PanelKind, icons: &dyn IconResolver) -> String {
    let mut surface = RecordingSurface::new();
    session.render(kind, &FixedFonts::default(), icons, &mut surface);
    surface.dump()
}

/// Flattened text of each line a panel would draw, oldest first.
#[allow(dead_code)]
pub fn panel_lines(session: &Session, kind: PanelKind) -> Vec<String> {
    session
        .panels(&FixedFonts::default(), &NoIcons)
        .into_iter()
        .find(|frame| frame.kind == kind)
        .and_then(|frame| frame.prepared)
        .map(|panel| panel.lines.iter().map(|line| line.text()).collect())
        .unwrap_or_default()
}
