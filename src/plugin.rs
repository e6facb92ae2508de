//! The widget controller: owns both message stores and the active config,
//! ingests host events and answers the overlays' per-frame queries.
//!
//! Ingestion and rendering may run on different threads. Both stores and the
//! config sit behind `ArcSwap`, so every method takes `&self` and nothing
//! blocks.

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::config::{WidgetConfig, WidgetPosition};
use crate::event::HostEvent;
use crate::host::{GameState, HostState};
use crate::message::filter::{visible_entries, Exclusion, VisibilityRules};
use crate::message::store::{AppendOutcome, MessageStore, StorePolicy};
use crate::message::{classify, normalize_sender, ChatEntry, ChatEvent, Direction, EventClass};

/// Which history a clear command empties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearTarget {
    Game,
    Private,
    /// Both channels, as shown in a merged panel.
    Merged,
}

/// Current wall-clock time in milliseconds.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

fn game_policy(config: &WidgetConfig) -> StorePolicy {
    StorePolicy {
        capacity: config.game.max_messages as usize * 2,
        collapse_duplicates: config.game.collapse_duplicates,
        merge_rules: config.game.merge_rules.clone(),
    }
}

fn private_policy(config: &WidgetConfig) -> StorePolicy {
    StorePolicy::with_capacity(config.private.max_messages as usize * 2)
}

#[derive(Debug)]
pub struct ChatWidgets {
    config: ArcSwap<WidgetConfig>,
    game: MessageStore,
    private: MessageStore,
}

impl ChatWidgets {
    pub fn new(config: WidgetConfig) -> Self {
        let config = config.sanitized();
        Self {
            game: MessageStore::new(game_policy(&config)),
            private: MessageStore::new(private_policy(&config)),
            config: ArcSwap::from_pointee(config),
        }
    }

    /// Snapshot of the active config. Overlays take one per render pass.
    pub fn config(&self) -> Arc<WidgetConfig> {
        self.config.load_full()
    }

    pub fn game_store(&self) -> &MessageStore {
        &self.game
    }

    pub fn private_store(&self) -> &MessageStore {
        &self.private
    }

    pub fn start_up(&self, host: &dyn HostState) {
        tracing::info!("Chat widgets starting");
        if self.config.load().private.enabled {
            set_native_private_chat(host, true);
        }
    }

    pub fn shut_down(&self, host: &dyn HostState) {
        tracing::info!("Chat widgets shutting down");
        self.clear(ClearTarget::Merged);
        set_native_private_chat(host, false);
    }

    /// Swap in a new config. Store capacities and rules follow immediately;
    /// toggling private messages hides or restores the native widgets.
    pub fn apply_config(&self, config: WidgetConfig, host: &dyn HostState) {
        let config = config.sanitized();
        let previous = self.config.swap(Arc::new(config.clone()));

        self.game.set_policy(game_policy(&config));
        self.private.set_policy(private_policy(&config));

        if previous.private.enabled != config.private.enabled {
            set_native_private_chat(host, config.private.enabled);
        }
        if previous.appearance.swap_stacking_order != config.appearance.swap_stacking_order {
            tracing::debug!("Stacking order swapped");
        }
    }

    /// Route one chat event into its store. Returns `None` when the event is
    /// ignored.
    pub fn on_chat_message(&self, event: &ChatEvent, now_ms: i64) -> Option<AppendOutcome> {
        let text = event.text.trim();
        if text.is_empty() {
            return None;
        }

        let outcome = match classify(&event.message_type) {
            EventClass::Game(message_type) => self.game.append(ChatEntry::game(text, now_ms, message_type)),
            EventClass::PrivateIncoming => self.append_private(event, text, now_ms, Direction::Incoming),
            EventClass::PrivateOutgoing => self.append_private(event, text, now_ms, Direction::Outgoing),
            EventClass::SystemNotice => {
                let config = self.config.load();
                if !config.private.login_notifications {
                    return None;
                }
                let sender = normalize_sender(event.sender.as_deref());
                self.private.append(ChatEntry::system_notice(
                    sender,
                    text,
                    now_ms,
                    config.private.notification_fade_seconds,
                ))
            }
            EventClass::Ignored => return None,
        };
        Some(outcome)
    }

    fn append_private(&self, event: &ChatEvent, text: &str, now_ms: i64, direction: Direction) -> AppendOutcome {
        let sender = normalize_sender(event.sender.as_deref());
        self.private.append(ChatEntry::private(sender, text, now_ms, direction))
    }

    pub fn on_game_state_changed(&self, state: GameState, host: &dyn HostState) {
        match state {
            GameState::LoginScreen => self.clear(ClearTarget::Game),
            GameState::LoggedIn if self.config.load().private.enabled => {
                set_native_private_chat(host, true);
            }
            _ => {}
        }
    }

    /// The host rebuilt its private chat interface, which shows it again.
    pub fn on_private_chat_loaded(&self, host: &dyn HostState) {
        if self.config.load().private.enabled {
            set_native_private_chat(host, true);
        }
    }

    /// Handle an overlay context-menu click. Returns what was cleared.
    pub fn on_menu_option_clicked(&self, option: &str, target: &str) -> Option<ClearTarget> {
        let cleared = if option.contains("Game:") && option.contains("Clear") {
            Some(ClearTarget::Game)
        } else if option.contains("Private:") && option.contains("Clear") {
            Some(ClearTarget::Private)
        } else if option == "Clear" {
            if target.contains("Merged") {
                Some(ClearTarget::Merged)
            } else if target.contains("Game") {
                Some(ClearTarget::Game)
            } else if target.contains("Private") {
                Some(ClearTarget::Private)
            } else {
                None
            }
        } else {
            None
        };

        if let Some(target) = cleared {
            self.clear(target);
        }
        cleared
    }

    pub fn clear(&self, target: ClearTarget) {
        tracing::debug!("Clearing {target:?} history");
        match target {
            ClearTarget::Game => self.game.clear(),
            ClearTarget::Private => self.private.clear(),
            ClearTarget::Merged => {
                self.game.clear();
                self.private.clear();
            }
        }
    }

    /// Feed a host event to the matching handler.
    pub fn handle_event(&self, event: &HostEvent, host: &dyn HostState, now_ms: i64) {
        match event {
            HostEvent::ChatMessage(chat) => {
                self.on_chat_message(chat, now_ms);
            }
            HostEvent::GameStateChanged { state } => self.on_game_state_changed(*state, host),
            HostEvent::MenuOptionClicked { option, target } => {
                self.on_menu_option_clicked(option, target);
            }
            HostEvent::PrivateChatLoaded => self.on_private_chat_loaded(host),
            // layout changes only move overlays
            HostEvent::ResizeableChanged { .. } | HostEvent::ChatViewChanged { .. } => {}
        }
    }

    pub fn should_show_game_overlay(&self, host: &dyn HostState) -> bool {
        self.config.load().game.enabled
            && host.game_state() == GameState::LoggedIn
            && host.is_resized()
            && host.is_chatbox_hidden()
    }

    pub fn should_show_private_overlay(&self) -> bool {
        self.config.load().private.enabled
    }

    /// Private messages are drawn inside the game panel.
    pub fn is_merged(&self, host: &dyn HostState) -> bool {
        let config = self.config.load();
        host.is_resized()
            && host.is_chatbox_hidden()
            && config.appearance.merge_with_game_widget
            && config.game.enabled
            && config.private.enabled
            && config.game.position == WidgetPosition::Default
    }

    /// Game entries to show this frame, oldest first.
    pub fn game_messages(&self, host: &dyn HostState, now_ms: i64) -> Vec<ChatEntry> {
        let config = self.config.load();
        let mut exclusions = Vec::with_capacity(2);
        if host.spam_filter_enabled() {
            exclusions.push(Exclusion::Spam);
        }
        if host.boss_kill_count_filter_enabled() {
            exclusions.push(Exclusion::BossKillCount);
        }
        let rules = VisibilityRules {
            now_ms,
            fade_seconds: config.game.fade_out_seconds,
            max_count: config.game.max_messages as usize,
            exclusions: &exclusions,
        };
        visible_entries(&self.game.snapshot(), &rules)
    }

    /// Private entries (including notices) to show this frame, oldest first.
    pub fn private_messages(&self, now_ms: i64) -> Vec<ChatEntry> {
        let config = self.config.load();
        let rules = VisibilityRules {
            now_ms,
            fade_seconds: config.private.fade_out_seconds,
            max_count: config.private.max_messages as usize,
            exclusions: &[],
        };
        visible_entries(&self.private.snapshot(), &rules)
    }
}

fn set_native_private_chat(host: &dyn HostState, hidden: bool) {
    tracing::info!("{} native private chat", if hidden { "Hiding" } else { "Restoring" });
    host.set_native_private_chat_hidden(hidden);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::StaticHost;

    fn widgets() -> ChatWidgets {
        ChatWidgets::new(WidgetConfig::default())
    }

    #[test]
    fn routes_events_by_type() {
        let w = widgets();
        w.on_chat_message(&ChatEvent::new("GAMEMESSAGE", "  Welcome  ", None), 1);
        w.on_chat_message(&ChatEvent::new("PRIVATECHAT", "hey", Some("Bob")), 2);
        w.on_chat_message(&ChatEvent::new("PRIVATECHATOUT", "yo", Some("Bob")), 3);
        assert_eq!(w.on_chat_message(&ChatEvent::new("PUBLICCHAT", "lol", Some("x")), 4), None);
        assert_eq!(w.on_chat_message(&ChatEvent::new("GAMEMESSAGE", "   ", None), 5), None);

        let game = w.game_store().snapshot();
        assert_eq!(game.len(), 1);
        assert_eq!(game[0].text, "Welcome");

        let private = w.private_store().snapshot();
        assert_eq!(private.len(), 2);
        assert!(matches!(
            private[1].kind,
            crate::message::EntryKind::Private { direction: Direction::Outgoing, .. }
        ));
    }

    #[test]
    fn login_notices_respect_toggle() {
        let w = widgets();
        w.on_chat_message(&ChatEvent::new("LOGINLOGOUTNOTIFICATION", "Bob has logged in.", Some("Bob")), 1);
        assert_eq!(w.private_store().snapshot()[0].max_fade_override_seconds, Some(5));

        let mut config = WidgetConfig::default();
        config.private.login_notifications = false;
        w.apply_config(config, &StaticHost::default());
        assert_eq!(
            w.on_chat_message(&ChatEvent::new("LOGINLOGOUTNOTIFICATION", "x", Some("Bob")), 2),
            None
        );
    }

    #[test]
    fn menu_clear_variants() {
        let w = widgets();
        let fill = || {
            w.on_chat_message(&ChatEvent::new("GAMEMESSAGE", "g", None), 1);
            w.on_chat_message(&ChatEvent::new("PRIVATECHAT", "p", Some("B")), 1);
        };

        fill();
        assert_eq!(w.on_menu_option_clicked("Clear", "Game chat history"), Some(ClearTarget::Game));
        assert!(w.game_store().is_empty());
        assert!(!w.private_store().is_empty());

        fill();
        assert_eq!(w.on_menu_option_clicked("Clear", "Merged chat history"), Some(ClearTarget::Merged));
        assert!(w.game_store().is_empty() && w.private_store().is_empty());

        fill();
        assert_eq!(w.on_menu_option_clicked("Private: Clear", ""), Some(ClearTarget::Private));
        assert!(w.private_store().is_empty());

        assert_eq!(w.on_menu_option_clicked("Move", "Game chat history"), None);
        assert_eq!(w.on_menu_option_clicked("Clear", "Something else"), None);
    }

    #[test]
    fn capacity_follows_config() {
        let w = widgets();
        for i in 0..30 {
            w.on_chat_message(&ChatEvent::new("GAMEMESSAGE", format!("m{i}"), None), i);
        }
        assert_eq!(w.game_store().len(), 10);

        let mut config = WidgetConfig::default();
        config.game.max_messages = 2;
        w.apply_config(config, &StaticHost::default());
        assert_eq!(w.game_store().len(), 4);
    }

    #[test]
    fn merged_requires_all_conditions() {
        let w = widgets();
        let host = StaticHost::default();
        assert!(w.is_merged(&host));
        assert!(!w.is_merged(&StaticHost { chatbox_hidden: false, ..StaticHost::default() }));

        let mut config = WidgetConfig::default();
        config.game.position = WidgetPosition::AbovePlayer;
        w.apply_config(config, &host);
        assert!(!w.is_merged(&host));
    }
}
