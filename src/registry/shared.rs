//! Registry backed by a network-addressable store.
//!
//! [`SharedStore`] is the minimal store contract the registry needs: hash
//! records plus sets. A room `QX7HC` lives under two keys:
//!
//! - `room:QX7HC`: hash with fields `created` (unix seconds) and `game`
//!   (empty, or the current game identifier).
//! - `room:QX7HC:players`: set of member usernames.
//!
//! Join uniqueness relies on the store's add-to-set reporting how many
//! members were newly inserted; no extra lock is taken.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use super::RoomRegistry;
use crate::domain::{RoomCode, RoomInfo, room_info::truncate_to_seconds};
use crate::error::QuizError;

/// Prefix shared by every room key.
pub const ROOM_KEY_PREFIX: &str = "room:";

const FIELD_CREATED: &str = "created";
const FIELD_GAME: &str = "game";

/// Operations the shared registry needs from its store. Every operation
/// must be atomic on the store side.
///
/// # Errors
///
/// Every method returns [`QuizError::BackendUnavailable`] when the store
/// cannot be reached or rejects the command.
#[allow(clippy::missing_errors_doc)]
#[async_trait]
pub trait SharedStore: Send + Sync + std::fmt::Debug {
    /// Writes `fields` into the hash at `key`.
    async fn create_hash(&self, key: &str, fields: &[(&str, String)]) -> Result<(), QuizError>;

    /// Reads every field of the hash at `key`; empty if absent.
    async fn get_all(&self, key: &str) -> Result<HashMap<String, String>, QuizError>;

    /// Sets one field if the hash at `key` exists. Returns whether it did.
    async fn set_field_if_exists(
        &self,
        key: &str,
        field: &str,
        value: &str,
    ) -> Result<bool, QuizError>;

    /// Adds `member` to the set at `key`. Returns the number of members
    /// newly inserted (0 if already present).
    async fn add_member(&self, key: &str, member: &str) -> Result<u64, QuizError>;

    /// Lists the set at `key`; empty if absent.
    async fn members(&self, key: &str) -> Result<Vec<String>, QuizError>;

    /// Removes `key` whatever its type. Absent keys are not an error.
    async fn delete(&self, key: &str) -> Result<(), QuizError>;
}

/// Room registry on top of a [`SharedStore`].
#[derive(Debug, Clone)]
pub struct SharedRegistry<S> {
    store: S,
}

impl<S: SharedStore> SharedRegistry<S> {
    /// Wraps a store.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Writes a fresh record under `code`. A member set left over from an
    /// earlier room with the same code is dropped first.
    async fn create_with_code(&self, code: &RoomCode) -> Result<(), QuizError> {
        let created = truncate_to_seconds(Utc::now()).timestamp();
        self.store.delete(&players_key(code)).await?;
        self.store
            .create_hash(
                &room_key(code),
                &[
                    (FIELD_CREATED, created.to_string()),
                    (FIELD_GAME, String::new()),
                ],
            )
            .await
    }

    #[cfg(test)]
    pub(crate) const fn store(&self) -> &S {
        &self.store
    }
}

fn parse_created(
    code: &RoomCode,
    fields: &HashMap<String, String>,
) -> Result<DateTime<Utc>, QuizError> {
    fields
        .get(FIELD_CREATED)
        .and_then(|raw| raw.parse::<i64>().ok())
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
        .ok_or_else(|| QuizError::Internal(format!("room {code} has no valid creation time")))
}

/// Hash key of a room.
#[must_use]
pub fn room_key(code: &RoomCode) -> String {
    format!("{ROOM_KEY_PREFIX}{code}")
}

/// Set key of a room's members.
#[must_use]
pub fn players_key(code: &RoomCode) -> String {
    format!("{ROOM_KEY_PREFIX}{code}:players")
}

#[async_trait]
impl<S: SharedStore> RoomRegistry for SharedRegistry<S> {
    fn backend_name(&self) -> &'static str {
        "shared"
    }

    async fn create_room(&self) -> Result<RoomCode, QuizError> {
        let code = RoomCode::generate();
        self.create_with_code(&code).await?;
        Ok(code)
    }

    async fn join_room(
        &self,
        code: &RoomCode,
        username: &str,
    ) -> Result<DateTime<Utc>, QuizError> {
        let fields = self.store.get_all(&room_key(code)).await?;
        if fields.is_empty() {
            return Err(QuizError::RoomNotFound(code.to_string()));
        }
        let created = parse_created(code, &fields)?;
        let added = self.store.add_member(&players_key(code), username).await?;
        if added == 0 {
            return Err(QuizError::UsernameTaken {
                room: code.to_string(),
                username: username.to_string(),
            });
        }
        Ok(created)
    }

    async fn room_info(&self, code: &RoomCode) -> Result<RoomInfo, QuizError> {
        let fields = self.store.get_all(&room_key(code)).await?;
        if fields.is_empty() {
            return Err(QuizError::RoomNotFound(code.to_string()));
        }

        let created = parse_created(code, &fields)?;

        let game = match fields.get(FIELD_GAME).map(String::as_str) {
            None | Some("") => None,
            Some(raw) => Some(raw.parse::<u64>().map_err(|_| {
                QuizError::Internal(format!("room {code} has malformed game id {raw:?}"))
            })?),
        };

        let mut players = self.store.members(&players_key(code)).await?;
        players.sort_unstable();

        Ok(RoomInfo {
            code: code.clone(),
            created,
            game,
            players,
        })
    }

    async fn start_game(&self, code: &RoomCode, game: u64) -> Result<(), QuizError> {
        let updated = self
            .store
            .set_field_if_exists(&room_key(code), FIELD_GAME, &game.to_string())
            .await?;
        if !updated {
            return Err(QuizError::RoomNotFound(code.to_string()));
        }
        Ok(())
    }
}
