//! In-process room registry.
//!
//! [`MemoryRegistry`] keeps every room in a `HashMap` behind a single
//! [`tokio::sync::RwLock`]. Joins take the write lock for the whole
//! check-and-insert, so two joins on the same room never interleave.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::RoomRegistry;
use crate::domain::{RoomCode, RoomInfo, RoomRecord};
use crate::error::QuizError;

/// Room registry living in process memory.
///
/// # Concurrency
///
/// - Reads (`room_info`) run concurrently.
/// - Mutations are serialized across all rooms.
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    rooms: RwLock<HashMap<RoomCode, RoomRecord>>,
}

impl MemoryRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoomRegistry for MemoryRegistry {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn create_room(&self) -> Result<RoomCode, QuizError> {
        let code = RoomCode::generate();
        self.rooms
            .write()
            .await
            .insert(code.clone(), RoomRecord::new(Utc::now()));
        Ok(code)
    }

    async fn join_room(
        &self,
        code: &RoomCode,
        username: &str,
    ) -> Result<DateTime<Utc>, QuizError> {
        let mut rooms = self.rooms.write().await;
        let record = rooms
            .get_mut(code)
            .ok_or_else(|| QuizError::RoomNotFound(code.to_string()))?;
        if !record.players.insert(username.to_string()) {
            return Err(QuizError::UsernameTaken {
                room: code.to_string(),
                username: username.to_string(),
            });
        }
        Ok(record.created)
    }

    async fn room_info(&self, code: &RoomCode) -> Result<RoomInfo, QuizError> {
        let rooms = self.rooms.read().await;
        rooms
            .get(code)
            .map(|record| record.to_info(code))
            .ok_or_else(|| QuizError::RoomNotFound(code.to_string()))
    }

    async fn start_game(&self, code: &RoomCode, game: u64) -> Result<(), QuizError> {
        let mut rooms = self.rooms.write().await;
        let record = rooms
            .get_mut(code)
            .ok_or_else(|| QuizError::RoomNotFound(code.to_string()))?;
        record.game = Some(game);
        Ok(())
    }
}
