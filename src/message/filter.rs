//! Per-frame selection of the entries a panel should show.

use super::{ChatEntry, EntryKind, MessageType};

/// Extra time an entry stays selectable past its fade window so the fade-out
/// animation can finish.
pub const GRACE_PERIOD_MS: i64 = 2000;

/// Host-side chat filter toggles that hide entries outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusion {
    /// The game filter is on: hide spam-classified game messages.
    Spam,
    /// Boss kill count messages are filtered.
    BossKillCount,
}

impl Exclusion {
    pub fn matches(self, entry: &ChatEntry) -> bool {
        match (self, &entry.kind) {
            (Exclusion::Spam, EntryKind::Game { message_type, .. }) => *message_type == MessageType::Spam,
            (Exclusion::BossKillCount, EntryKind::Game { boss_kill_count, .. }) => *boss_kill_count,
            _ => false,
        }
    }
}

/// Inputs to one visibility pass.
#[derive(Debug, Clone, Copy)]
pub struct VisibilityRules<'a> {
    pub now_ms: i64,
    /// Channel fade window in seconds; 0 disables aging.
    pub fade_seconds: u32,
    pub max_count: usize,
    pub exclusions: &'a [Exclusion],
}

/// Effective fade window for an entry, in seconds (0 = never fades).
pub fn effective_fade_seconds(entry: &ChatEntry, channel_fade_seconds: u32) -> u32 {
    entry.max_fade_override_seconds.unwrap_or(channel_fade_seconds)
}

fn is_current(entry: &ChatEntry, rules: &VisibilityRules<'_>) -> bool {
    let fade = effective_fade_seconds(entry, rules.fade_seconds);
    if fade == 0 {
        return true;
    }
    rules.now_ms - entry.timestamp_ms < i64::from(fade) * 1000 + GRACE_PERIOD_MS
}

/// Select the most recent `max_count` entries that are still current and not
/// excluded, returned oldest first. System notices do not use up a slot.
pub fn visible_entries(entries: &[ChatEntry], rules: &VisibilityRules<'_>) -> Vec<ChatEntry> {
    let mut selected = Vec::with_capacity(rules.max_count.min(entries.len()));
    let mut counted = 0;

    for entry in entries.iter().rev() {
        if counted >= rules.max_count {
            break;
        }
        if !is_current(entry, rules) {
            continue;
        }
        if rules.exclusions.iter().any(|ex| ex.matches(entry)) {
            continue;
        }
        if !entry.is_system_notice() {
            counted += 1;
        }
        selected.push(entry.clone());
    }

    selected.reverse();
    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Direction;

    fn rules(now_ms: i64, fade_seconds: u32, max_count: usize) -> VisibilityRules<'static> {
        VisibilityRules { now_ms, fade_seconds, max_count, exclusions: &[] }
    }

    fn game(text: &str, ts: i64) -> ChatEntry {
        ChatEntry::game(text, ts, MessageType::GameMessage)
    }

    fn texts(entries: &[ChatEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.text.as_str()).collect()
    }

    #[test]
    fn keeps_most_recent_in_chronological_order() {
        let entries: Vec<_> = (0..10).map(|i| game(&format!("m{i}"), i)).collect();
        let visible = visible_entries(&entries, &rules(100, 0, 3));
        assert_eq!(texts(&visible), ["m7", "m8", "m9"]);
    }

    #[test]
    fn drops_entries_past_fade_and_grace() {
        let entries = vec![game("old", 0), game("edge", 3_001), game("new", 9_000)];
        // fade 5s + 2s grace: anything 7s or older is gone
        let visible = visible_entries(&entries, &rules(10_000, 5, 10));
        assert_eq!(texts(&visible), ["edge", "new"]);
        let visible = visible_entries(&entries, &rules(10_001, 5, 10));
        assert_eq!(texts(&visible), ["new"]);
    }

    #[test]
    fn zero_fade_never_ages_out() {
        let entries = vec![game("ancient", 0)];
        let visible = visible_entries(&entries, &rules(i64::MAX / 2, 0, 10));
        assert_eq!(visible.len(), 1);
    }

    #[test]
    fn exclusions_hide_matching_entries() {
        let entries = vec![
            ChatEntry::game("spammy", 1, MessageType::Spam),
            game("Your Zulrah kill count is: 5.", 2),
            game("normal", 3),
        ];
        let ex = [Exclusion::Spam, Exclusion::BossKillCount];
        let visible = visible_entries(
            &entries,
            &VisibilityRules { now_ms: 10, fade_seconds: 0, max_count: 5, exclusions: &ex },
        );
        assert_eq!(texts(&visible), ["normal"]);
    }

    #[test]
    fn excluded_entries_do_not_take_slots() {
        let entries = vec![game("a", 1), ChatEntry::game("s", 2, MessageType::Spam), game("b", 3)];
        let ex = [Exclusion::Spam];
        let visible = visible_entries(
            &entries,
            &VisibilityRules { now_ms: 10, fade_seconds: 0, max_count: 2, exclusions: &ex },
        );
        assert_eq!(texts(&visible), ["a", "b"]);
    }

    #[test]
    fn system_notices_are_exempt_from_count() {
        let entries = vec![
            ChatEntry::private("A", "one", 1, Direction::Incoming),
            ChatEntry::private("C", "two", 2, Direction::Incoming),
            ChatEntry::system_notice("B", "B has logged in.", 3, 5),
        ];
        let visible = visible_entries(&entries, &rules(10, 0, 1));
        assert_eq!(texts(&visible), ["two", "B has logged in."]);
    }

    #[test]
    fn override_replaces_channel_fade() {
        let notice = ChatEntry::system_notice("B", "notice", 0, 5);
        // channel never fades, notice fades after 5s + grace
        assert_eq!(visible_entries(&[notice.clone()], &rules(6_999, 0, 5)).len(), 1);
        assert!(visible_entries(&[notice], &rules(7_000, 0, 5)).is_empty());
    }

    #[test]
    fn never_exceeds_max_count() {
        let mut entries: Vec<_> = (0..40).map(|i| game(&format!("m{i}"), i)).collect();
        entries.push(ChatEntry::system_notice("x", "n", 41, 5));
        for max in 0..8 {
            let visible = visible_entries(&entries, &rules(50, 0, max));
            let non_notice = visible.iter().filter(|e| !e.is_system_notice()).count();
            assert!(non_notice <= max);
        }
    }
}
