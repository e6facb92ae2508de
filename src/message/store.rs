//! Per-channel message buffer shared by the ingestion and render paths.
//!
//! The entry list lives behind an [`ArcSwap`]: writers build a new list and
//! swap it in (`rcu`), readers take an `Arc` snapshot that stays valid no
//! matter what the writer does next. Neither side ever blocks the other.

use std::sync::Arc;

use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};

use super::ChatEntry;

/// Fuses a follow-up message onto the entry immediately before it.
///
/// The client sends some single events as two messages ("You eat a shark."
/// then "It heals some health."); a rule matches when the previous text starts
/// with `previous_prefix` and the new text equals (`exact`) or starts with
/// `next_pattern`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeRule {
    pub previous_prefix: String,
    pub next_pattern: String,
    #[serde(default)]
    pub exact: bool,
}

impl MergeRule {
    pub fn new(previous_prefix: impl Into<String>, next_pattern: impl Into<String>, exact: bool) -> Self {
        Self {
            previous_prefix: previous_prefix.into(),
            next_pattern: next_pattern.into(),
            exact,
        }
    }

    pub fn matches(&self, previous: &str, next: &str) -> bool {
        if !previous.starts_with(&self.previous_prefix) {
            return false;
        }
        if self.exact {
            next == self.next_pattern
        } else {
            next.starts_with(&self.next_pattern)
        }
    }

    pub fn merge(&self, previous: &str, next: &str) -> String {
        format!("{previous}<br>{next}")
    }
}

/// Append behaviour for one channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorePolicy {
    /// Hard cap on stored entries, independent of how many are displayed.
    pub capacity: usize,
    pub collapse_duplicates: bool,
    pub merge_rules: Vec<MergeRule>,
}

impl StorePolicy {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            collapse_duplicates: false,
            merge_rules: Vec::new(),
        }
    }
}

/// What `append` did with the new entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    Appended,
    /// An earlier identical entry was removed and its count carried forward.
    Collapsed { repeat_count: u32 },
    /// The text was fused onto the previous entry.
    Merged,
}

/// Capacity-bounded ordered buffer of chat entries for one channel.
#[derive(Debug)]
pub struct MessageStore {
    entries: ArcSwap<Vec<ChatEntry>>,
    policy: ArcSwap<StorePolicy>,
}

impl MessageStore {
    pub fn new(policy: StorePolicy) -> Self {
        Self {
            entries: ArcSwap::from_pointee(Vec::new()),
            policy: ArcSwap::from_pointee(policy),
        }
    }

    pub fn policy(&self) -> Arc<StorePolicy> {
        self.policy.load_full()
    }

    /// Replace the policy. A smaller capacity evicts immediately.
    pub fn set_policy(&self, policy: StorePolicy) {
        let capacity = policy.capacity;
        self.policy.store(Arc::new(policy));
        self.entries.rcu(|current| {
            let mut next = (**current).clone();
            evict_to(&mut next, capacity);
            next
        });
    }

    /// Insert an entry at the tail, applying merge and collapse rules, then
    /// evict from the head down to capacity.
    pub fn append(&self, entry: ChatEntry) -> AppendOutcome {
        let policy = self.policy.load_full();
        let mut outcome = AppendOutcome::Appended;
        self.entries.rcu(|current| {
            let mut next = (**current).clone();
            outcome = insert(&mut next, entry.clone(), &policy);
            evict_to(&mut next, policy.capacity);
            next
        });

        match outcome {
            AppendOutcome::Collapsed { repeat_count } => {
                tracing::debug!("Collapsed duplicate message (x{repeat_count})");
            }
            AppendOutcome::Merged => tracing::debug!("Merged message onto previous entry"),
            AppendOutcome::Appended => {}
        }
        outcome
    }

    pub fn clear(&self) {
        self.entries.store(Arc::new(Vec::new()));
    }

    /// Immutable view of the current entries, oldest first.
    pub fn snapshot(&self) -> Arc<Vec<ChatEntry>> {
        self.entries.load_full()
    }

    pub fn len(&self) -> usize {
        self.entries.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.load().is_empty()
    }
}

fn insert(entries: &mut Vec<ChatEntry>, mut entry: ChatEntry, policy: &StorePolicy) -> AppendOutcome {
    if let Some(previous) = entries.last_mut()
        && let Some(rule) = policy
            .merge_rules
            .iter()
            .find(|rule| rule.matches(&previous.text, &entry.text))
    {
        let merged = ChatEntry {
            text: rule.merge(&previous.text, &entry.text),
            timestamp_ms: entry.timestamp_ms,
            kind: previous.kind.clone(),
            repeat_count: previous.repeat_count,
            max_fade_override_seconds: previous.max_fade_override_seconds,
        };
        *previous = merged;
        return AppendOutcome::Merged;
    }

    let mut outcome = AppendOutcome::Appended;
    if policy.collapse_duplicates {
        let stripped = entry.stripped_text();
        if let Some(index) = entries.iter().rposition(|e| e.stripped_text() == stripped) {
            let existing = entries.remove(index);
            entry.repeat_count = existing.repeat_count + 1;
            outcome = AppendOutcome::Collapsed { repeat_count: entry.repeat_count };
        }
    }
    entries.push(entry);
    outcome
}

fn evict_to(entries: &mut Vec<ChatEntry>, capacity: usize) {
    if entries.len() > capacity {
        let excess = entries.len() - capacity;
        entries.drain(..excess);
        tracing::debug!("Evicted {excess} oldest message(s)");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{Direction, MessageType};

    fn game(text: &str, ts: i64) -> ChatEntry {
        ChatEntry::game(text, ts, MessageType::GameMessage)
    }

    fn collapsing(capacity: usize) -> MessageStore {
        MessageStore::new(StorePolicy {
            capacity,
            collapse_duplicates: true,
            merge_rules: Vec::new(),
        })
    }

    #[test]
    fn append_keeps_insertion_order() {
        let store = MessageStore::new(StorePolicy::with_capacity(10));
        store.append(game("one", 1));
        store.append(game("two", 2));
        let snap = store.snapshot();
        assert_eq!(snap.iter().map(|e| e.text.as_str()).collect::<Vec<_>>(), ["one", "two"]);
    }

    #[test]
    fn collapse_counts_duplicates() {
        let store = collapsing(10);
        for ts in 0..3 {
            store.append(game("Welcome", ts));
        }
        let snap = store.snapshot();
        assert_eq!(snap.len(), 1);
        assert_eq!(snap[0].text, "Welcome");
        assert_eq!(snap[0].repeat_count, 3);
        assert_eq!(snap[0].timestamp_ms, 2);
    }

    #[test]
    fn collapse_ignores_tags_and_moves_entry_to_tail() {
        let store = collapsing(10);
        store.append(game("<col=ff0000>Oops</col>", 1));
        store.append(game("other", 2));
        let outcome = store.append(game("Oops", 3));
        assert_eq!(outcome, AppendOutcome::Collapsed { repeat_count: 2 });
        let snap = store.snapshot();
        assert_eq!(snap.iter().map(|e| e.text.as_str()).collect::<Vec<_>>(), ["other", "Oops"]);
    }

    #[test]
    fn no_collapse_when_disabled() {
        let store = MessageStore::new(StorePolicy::with_capacity(10));
        store.append(game("same", 1));
        store.append(game("same", 2));
        assert_eq!(store.len(), 2);
        assert!(store.snapshot().iter().all(|e| e.repeat_count == 1));
    }

    #[test]
    fn evicts_oldest_at_capacity() {
        let store = MessageStore::new(StorePolicy::with_capacity(50));
        for i in 0..51 {
            store.append(ChatEntry::private("Bob", format!("msg {i}"), i, Direction::Incoming));
        }
        let snap = store.snapshot();
        assert_eq!(snap.len(), 50);
        assert_eq!(snap[0].text, "msg 1");
        assert_eq!(snap[49].text, "msg 50");
    }

    #[test]
    fn prefix_merge_rule_fuses_onto_previous() {
        let store = MessageStore::new(StorePolicy {
            capacity: 10,
            collapse_duplicates: false,
            merge_rules: vec![MergeRule::new("You eat", "It heals", false)],
        });
        store.append(game("You eat a shark.", 1));
        let outcome = store.append(game("It heals some health.", 2));
        assert_eq!(outcome, AppendOutcome::Merged);
        let snap = store.snapshot();
        assert_eq!(snap.len(), 1);
        assert_eq!(snap[0].text, "You eat a shark.<br>It heals some health.");
    }

    #[test]
    fn exact_merge_rule_requires_equality() {
        let rule = MergeRule::new("You drink", "You have 2 doses left.", true);
        assert!(rule.matches("You drink some potion.", "You have 2 doses left."));
        assert!(!rule.matches("You drink some potion.", "You have 2 doses left. Extra"));
        assert!(!rule.matches("You eat", "You have 2 doses left."));
    }

    #[test]
    fn merge_only_looks_at_immediately_previous_entry() {
        let store = MessageStore::new(StorePolicy {
            capacity: 10,
            collapse_duplicates: false,
            merge_rules: vec![MergeRule::new("You eat", "It heals", false)],
        });
        store.append(game("You eat a shark.", 1));
        store.append(game("Something else.", 2));
        assert_eq!(store.append(game("It heals some health.", 3)), AppendOutcome::Appended);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn clear_empties_buffer() {
        let store = MessageStore::new(StorePolicy::with_capacity(10));
        store.append(game("a", 1));
        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn snapshot_survives_later_writes() {
        let store = MessageStore::new(StorePolicy::with_capacity(2));
        store.append(game("a", 1));
        let snap = store.snapshot();
        store.append(game("b", 2));
        store.append(game("c", 3));
        store.clear();
        assert_eq!(snap.len(), 1);
        assert_eq!(snap[0].text, "a");
    }

    #[test]
    fn shrinking_capacity_evicts() {
        let store = MessageStore::new(StorePolicy::with_capacity(10));
        for i in 0..6 {
            store.append(game(&format!("m{i}"), i));
        }
        store.set_policy(StorePolicy::with_capacity(4));
        let snap = store.snapshot();
        assert_eq!(snap.len(), 4);
        assert_eq!(snap[0].text, "m2");
    }

    #[test]
    fn concurrent_appends_and_reads() {
        let store = Arc::new(MessageStore::new(StorePolicy::with_capacity(1000)));
        let writer = {
            let store = Arc::clone(&store);
            std::thread::spawn(move || {
                for i in 0..200 {
                    store.append(game(&format!("m{i}"), i));
                }
            })
        };
        for _ in 0..200 {
            let snap = store.snapshot();
            for pair in snap.windows(2) {
                assert!(pair[0].timestamp_ms < pair[1].timestamp_ms);
            }
        }
        writer.join().unwrap();
        assert_eq!(store.len(), 200);
    }
}
