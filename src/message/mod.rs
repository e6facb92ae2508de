//! Chat entries and the classification of raw host chat events.

pub mod filter;
pub mod store;

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static TAG_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("invalid regex"));
static BOSS_KC_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"Your .+ count is:").expect("invalid regex"));

/// Message type tags as the host reports them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MessageType {
    GameMessage,
    Spam,
    Console,
    Welcome,
    Engine,
    Broadcast,
    DidYouKnow,
    TradeReq,
    PrivateChat,
    PrivateChatOut,
    LoginLogoutNotification,
}

impl MessageType {
    /// Parse a host tag such as `GAMEMESSAGE`. Unknown tags return `None`.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(tag: &str) -> Option<Self> {
        let upper = tag.trim().to_ascii_uppercase();
        match upper.as_str() {
            "GAMEMESSAGE" => Some(Self::GameMessage),
            "SPAM" => Some(Self::Spam),
            "CONSOLE" => Some(Self::Console),
            "WELCOME" => Some(Self::Welcome),
            "ENGINE" => Some(Self::Engine),
            "BROADCAST" => Some(Self::Broadcast),
            "DIDYOUKNOW" => Some(Self::DidYouKnow),
            "TRADEREQ" => Some(Self::TradeReq),
            "PRIVATECHAT" => Some(Self::PrivateChat),
            "PRIVATECHATOUT" => Some(Self::PrivateChatOut),
            "LOGINLOGOUTNOTIFICATION" => Some(Self::LoginLogoutNotification),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GameMessage => "GAMEMESSAGE",
            Self::Spam => "SPAM",
            Self::Console => "CONSOLE",
            Self::Welcome => "WELCOME",
            Self::Engine => "ENGINE",
            Self::Broadcast => "BROADCAST",
            Self::DidYouKnow => "DIDYOUKNOW",
            Self::TradeReq => "TRADEREQ",
            Self::PrivateChat => "PRIVATECHAT",
            Self::PrivateChatOut => "PRIVATECHATOUT",
            Self::LoginLogoutNotification => "LOGINLOGOUTNOTIFICATION",
        }
    }
}

/// Routing decision for one raw chat event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventClass {
    Game(MessageType),
    PrivateIncoming,
    PrivateOutgoing,
    SystemNotice,
    Ignored,
}

/// Map a host tag to its routing class.
pub fn classify(tag: &str) -> EventClass {
    match MessageType::from_str(tag) {
        Some(
            t @ (MessageType::GameMessage
            | MessageType::Spam
            | MessageType::Console
            | MessageType::Welcome
            | MessageType::Engine
            | MessageType::Broadcast
            | MessageType::DidYouKnow
            | MessageType::TradeReq),
        ) => EventClass::Game(t),
        Some(MessageType::PrivateChat) => EventClass::PrivateIncoming,
        Some(MessageType::PrivateChatOut) => EventClass::PrivateOutgoing,
        Some(MessageType::LoginLogoutNotification) => EventClass::SystemNotice,
        None => EventClass::Ignored,
    }
}

/// A raw chat event delivered by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatEvent {
    pub message_type: String,
    pub text: String,
    #[serde(default)]
    pub sender: Option<String>,
}

impl ChatEvent {
    pub fn new(message_type: impl Into<String>, text: impl Into<String>, sender: Option<&str>) -> Self {
        Self {
            message_type: message_type.into(),
            text: text.into(),
            sender: sender.map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Incoming,
    Outgoing,
}

/// Channel-specific part of an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    Game { message_type: MessageType, boss_kill_count: bool },
    Private { direction: Direction, sender: String },
    SystemNotice { sender: String },
}

/// One stored chat event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEntry {
    pub text: String,
    pub timestamp_ms: i64,
    pub kind: EntryKind,
    pub repeat_count: u32,
    pub max_fade_override_seconds: Option<u32>,
}

impl ChatEntry {
    pub fn game(text: impl Into<String>, timestamp_ms: i64, message_type: MessageType) -> Self {
        let text = text.into();
        let boss_kill_count = is_boss_kill_count(&text);
        Self {
            text,
            timestamp_ms,
            kind: EntryKind::Game { message_type, boss_kill_count },
            repeat_count: 1,
            max_fade_override_seconds: None,
        }
    }

    pub fn private(
        sender: impl Into<String>,
        text: impl Into<String>,
        timestamp_ms: i64,
        direction: Direction,
    ) -> Self {
        Self {
            text: text.into(),
            timestamp_ms,
            kind: EntryKind::Private { direction, sender: sender.into() },
            repeat_count: 1,
            max_fade_override_seconds: None,
        }
    }

    pub fn system_notice(
        sender: impl Into<String>,
        text: impl Into<String>,
        timestamp_ms: i64,
        max_fade_seconds: u32,
    ) -> Self {
        Self {
            text: text.into(),
            timestamp_ms,
            kind: EntryKind::SystemNotice { sender: sender.into() },
            repeat_count: 1,
            max_fade_override_seconds: Some(max_fade_seconds),
        }
    }

    pub fn sender(&self) -> Option<&str> {
        match &self.kind {
            EntryKind::Game { .. } => None,
            EntryKind::Private { sender, .. } | EntryKind::SystemNotice { sender } => Some(sender),
        }
    }

    pub fn is_system_notice(&self) -> bool {
        matches!(self.kind, EntryKind::SystemNotice { .. })
    }

    /// Text with all markup tags removed, used for duplicate detection.
    pub fn stripped_text(&self) -> String {
        strip_tags(&self.text)
    }
}

/// Remove every `<...>` tag.
pub fn strip_tags(text: &str) -> String {
    TAG_PATTERN.replace_all(text, "").into_owned()
}

/// Kill count announcements ("Your Zulrah kill count is: 12.").
pub fn is_boss_kill_count(text: &str) -> bool {
    BOSS_KC_PATTERN.is_match(text)
}

/// Normalize a sender display name: non-breaking spaces become spaces.
pub fn normalize_sender(sender: Option<&str>) -> String {
    match sender {
        Some(name) => name.replace('\u{00A0}', " ").trim().to_string(),
        None => "Unknown".to_string(),
    }
}
