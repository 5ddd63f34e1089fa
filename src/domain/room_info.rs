//! Room record and the read model returned to callers.

use std::collections::HashSet;

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;

use super::RoomCode;

/// Snapshot of a room as stored by a registry backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomInfo {
    /// Room code.
    pub code: RoomCode,
    /// Creation time, whole seconds.
    pub created: DateTime<Utc>,
    /// Current game identifier; `None` until a game is started.
    pub game: Option<u64>,
    /// Current members. Sorted for stable output; order carries no meaning.
    pub players: Vec<String>,
}

/// Mutable per-room state kept by the in-process backend.
#[derive(Debug, Clone)]
pub struct RoomRecord {
    /// Creation time, whole seconds.
    pub created: DateTime<Utc>,
    /// Current game identifier.
    pub game: Option<u64>,
    /// Member usernames.
    pub players: HashSet<String>,
}

impl RoomRecord {
    /// Creates an empty record stamped with `created`, truncated to whole
    /// seconds so every backend persists the same representation.
    #[must_use]
    pub fn new(created: DateTime<Utc>) -> Self {
        Self {
            created: truncate_to_seconds(created),
            game: None,
            players: HashSet::new(),
        }
    }

    /// Builds the read model for this record.
    #[must_use]
    pub fn to_info(&self, code: &RoomCode) -> RoomInfo {
        let mut players: Vec<String> = self.players.iter().cloned().collect();
        players.sort_unstable();
        RoomInfo {
            code: code.clone(),
            created: self.created,
            game: self.game,
            players,
        }
    }
}

/// Drops the sub-second part of a timestamp.
#[must_use]
pub fn truncate_to_seconds(ts: DateTime<Utc>) -> DateTime<Utc> {
    Utc.timestamp_opt(ts.timestamp(), 0).single().unwrap_or(ts)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn new_record_is_empty_and_truncated() {
        let Some(now) = Utc.timestamp_opt(1_700_000_000, 123_456_789).single() else {
            panic!("valid timestamp");
        };
        let record = RoomRecord::new(now);
        assert_eq!(record.created.timestamp(), 1_700_000_000);
        assert_eq!(record.created.timestamp_subsec_nanos(), 0);
        assert!(record.players.is_empty());
        assert_eq!(record.game, None);
    }

    #[test]
    fn info_lists_players_sorted() {
        let Ok(code) = RoomCode::parse("QX7HC") else {
            panic!("valid code");
        };
        let mut record = RoomRecord::new(Utc::now());
        record.players.insert("zoe".to_string());
        record.players.insert("alice".to_string());

        let info = record.to_info(&code);
        assert_eq!(info.players, vec!["alice".to_string(), "zoe".to_string()]);
        assert_eq!(info.code, code);
    }
}
