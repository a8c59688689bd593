use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

pub const SCHEMA_VERSION: u32 = 1;

const USER_ID_MAX_LEN: usize = 128;

/// Opaque user identifier. It becomes part of a store path, so only a
/// conservative character set is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserId(String);

impl UserId {
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let valid = !raw.is_empty()
            && raw.len() <= USER_ID_MAX_LEN
            && raw
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        valid.then(|| Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-user progress as held in memory between a load and a save.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressRecord {
    pub completed: BTreeSet<u32>,
    pub favorites: BTreeSet<u32>,
    pub reactions: BTreeMap<u32, String>,
    /// First visit, only consulted by the per-user unlock mode.
    pub started_on: Option<NaiveDate>,
    /// Revision token of the remote document; `None` means none exists yet.
    pub version: Option<String>,
}

impl ProgressRecord {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Completion is additive; marking twice is a no-op.
    pub fn mark_completed(&mut self, day: u32) {
        self.completed.insert(day);
    }

    /// Flips the favorite flag and returns the new state.
    pub fn toggle_favorite(&mut self, day: u32) -> bool {
        if self.favorites.remove(&day) {
            false
        } else {
            self.favorites.insert(day);
            true
        }
    }

    pub fn set_reaction(&mut self, day: u32, tag: impl Into<String>) {
        self.reactions.insert(day, tag.into());
    }

    pub fn is_completed(&self, day: u32) -> bool {
        self.completed.contains(&day)
    }

    pub fn is_favorite(&self, day: u32) -> bool {
        self.favorites.contains(&day)
    }

    pub fn reaction(&self, day: u32) -> Option<&str> {
        self.reactions.get(&day).map(String::as_str)
    }
}

/// Canonical shape written to the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProgressDocument {
    pub uid: String,
    pub updated_at: String,
    pub completed: Vec<u32>,
    pub favorites: Vec<u32>,
    pub reactions: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_on: Option<NaiveDate>,
    pub schema_version: u32,
}

/// Loose view of a stored document. Every field is optional and untyped so
/// a bad entry never fails the whole parse.
#[derive(Debug, Default, Deserialize)]
pub struct RawProgressDocument {
    #[serde(default)]
    pub completed: Option<serde_json::Value>,
    #[serde(default)]
    pub favorites: Option<serde_json::Value>,
    #[serde(default)]
    pub reactions: Option<serde_json::Value>,
    #[serde(default)]
    pub started_on: Option<serde_json::Value>,
    #[serde(default)]
    pub schema_version: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct UidQuery {
    pub uid: String,
    #[serde(default)]
    pub day: Option<u32>,
    #[serde(default)]
    pub view: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UidRequest {
    pub uid: String,
}

#[derive(Debug, Deserialize)]
pub struct ReactionRequest {
    pub uid: String,
    pub tag: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DayStatus {
    pub day: u32,
    pub title: String,
    /// The user's reaction, or the card's own emoji when none was chosen.
    pub emoji: String,
    pub unlocked: bool,
    pub completed: bool,
    pub favorite: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OverviewResponse {
    pub uid: String,
    pub today: String,
    pub start_date: String,
    pub active_day: u32,
    pub total_days: u32,
    pub progress_percent: u32,
    pub completed_count: usize,
    pub days: Vec<DayStatus>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DayCardResponse {
    pub day: u32,
    pub title: String,
    pub unlocked: bool,
    /// Withheld while the card is locked.
    pub task: Option<String>,
    pub duration: String,
    pub reaction: String,
    pub completed: bool,
    pub favorite: bool,
    pub next_day: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_accepts_uuid_like_values() {
        let id = UserId::parse(" 3f2b9c1e-7d4a-4e8f-9a0b-1c2d3e4f5a6b ").unwrap();
        assert_eq!(id.as_str(), "3f2b9c1e-7d4a-4e8f-9a0b-1c2d3e4f5a6b");
    }

    #[test]
    fn user_id_rejects_path_tricks() {
        assert!(UserId::parse("").is_none());
        assert!(UserId::parse("../secrets").is_none());
        assert!(UserId::parse("a/b").is_none());
        assert!(UserId::parse(&"x".repeat(129)).is_none());
    }

    #[test]
    fn toggle_favorite_flips() {
        let mut record = ProgressRecord::empty();
        assert!(record.toggle_favorite(3));
        assert!(record.is_favorite(3));
        assert!(!record.toggle_favorite(3));
        assert!(!record.is_favorite(3));
    }

    #[test]
    fn reactions_overwrite_per_day() {
        let mut record = ProgressRecord::empty();
        record.set_reaction(2, "🔥");
        record.set_reaction(2, "🌙");
        assert_eq!(record.reaction(2), Some("🌙"));
        assert_eq!(record.reactions.len(), 1);
    }

    #[test]
    fn document_omits_missing_start() {
        let doc = ProgressDocument {
            uid: "u1".into(),
            updated_at: "2026-01-05T12:00:00+01:00".into(),
            completed: vec![1, 2],
            favorites: vec![],
            reactions: BTreeMap::new(),
            started_on: None,
            schema_version: SCHEMA_VERSION,
        };
        let value = serde_json::to_value(&doc).unwrap();
        assert!(value.get("started_on").is_none());
        assert_eq!(value["schema_version"], 1);
    }
}
