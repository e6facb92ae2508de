//! Host events and transcript replay.
//!
//! The live host delivers these through its event bus; transcripts record
//! them as JSON so a session can be replayed headless.

pub mod replay;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::WidgetConfig;
use crate::error::Result;
use crate::host::{GameState, StaticHost};
use crate::message::ChatEvent;

pub use replay::{PanelFrame, PanelKind, Session};

/// Host notifications the widgets react to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostEvent {
    ChatMessage(ChatEvent),
    GameStateChanged { state: GameState },
    MenuOptionClicked { option: String, target: String },
    /// The native private chat interface was (re)built.
    PrivateChatLoaded,
    ResizeableChanged { resized: bool },
    ChatViewChanged { hidden: bool },
}

impl HostEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ChatMessage(_) => "chat_message",
            Self::GameStateChanged { .. } => "game_state_changed",
            Self::MenuOptionClicked { .. } => "menu_option_clicked",
            Self::PrivateChatLoaded => "private_chat_loaded",
            Self::ResizeableChanged { .. } => "resizeable_changed",
            Self::ChatViewChanged { .. } => "chat_view_changed",
        }
    }
}

/// An event stamped with the host clock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedEvent {
    pub at_ms: i64,
    #[serde(flatten)]
    pub event: HostEvent,
}

/// Pending events, released in timestamp order.
#[derive(Debug, Default)]
pub struct EventQueue {
    pending: Vec<TimedEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an event. Events with equal timestamps keep insertion order.
    pub fn push(&mut self, event: TimedEvent) {
        let index = self.pending.partition_point(|e| e.at_ms <= event.at_ms);
        self.pending.insert(index, event);
    }

    /// Remove and return every event due at or before `now_ms`.
    pub fn drain_until(&mut self, now_ms: i64) -> Vec<TimedEvent> {
        let due = self.pending.partition_point(|e| e.at_ms <= now_ms);
        self.pending.drain(..due).collect()
    }

    pub fn drain(&mut self) -> Vec<TimedEvent> {
        std::mem::take(&mut self.pending)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// A recorded session: starting host state, optional config and events.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Transcript {
    pub host: StaticHost,
    pub config: Option<WidgetConfig>,
    /// Clock value for the final render; defaults to the last event time.
    pub render_at_ms: Option<i64>,
    pub events: Vec<TimedEvent>,
}

impl Transcript {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn end_ms(&self) -> i64 {
        self.render_at_ms
            .or_else(|| self.events.iter().map(|e| e.at_ms).max())
            .unwrap_or(0)
    }

    pub fn queue(&self) -> EventQueue {
        let mut queue = EventQueue::new();
        for event in &self.events {
            queue.push(event.clone());
        }
        queue
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(at_ms: i64, event: HostEvent) -> TimedEvent {
        TimedEvent { at_ms, event }
    }

    #[test]
    fn queue_orders_by_time() {
        let mut queue = EventQueue::new();
        queue.push(at(30, HostEvent::PrivateChatLoaded));
        queue.push(at(10, HostEvent::ChatViewChanged { hidden: true }));
        queue.push(at(30, HostEvent::ResizeableChanged { resized: false }));
        queue.push(at(20, HostEvent::PrivateChatLoaded));

        let first = queue.drain_until(20);
        assert_eq!(first.iter().map(|e| e.at_ms).collect::<Vec<_>>(), [10, 20]);
        assert_eq!(queue.len(), 2);

        let rest = queue.drain();
        assert_eq!(rest[0].event, HostEvent::PrivateChatLoaded);
        assert_eq!(rest[1].event.name(), "resizeable_changed");
        assert!(queue.is_empty());
    }

    #[test]
    fn parses_transcript_json() {
        let json = r#"{
            "host": { "zoom": 100 },
            "events": [
                { "at_ms": 5, "type": "chat_message", "message_type": "GAMEMESSAGE", "text": "Hi" },
                { "at_ms": 9, "type": "private_chat_loaded" },
                { "at_ms": 7, "type": "menu_option_clicked", "option": "Clear", "target": "Game chat history" }
            ]
        }"#;
        let transcript: Transcript = serde_json::from_str(json).unwrap();
        assert_eq!(transcript.host.zoom, 100);
        assert_eq!(transcript.end_ms(), 9);
        assert_eq!(
            transcript.events[0].event,
            HostEvent::ChatMessage(ChatEvent::new("GAMEMESSAGE", "Hi", None))
        );
        let order: Vec<_> = transcript.queue().drain().iter().map(|e| e.at_ms).collect();
        assert_eq!(order, [5, 7, 9]);
    }
}
