//! Room service: orchestrates registry calls and derives room seeds.

use std::sync::Arc;

use crate::domain::{RoomCode, RoomInfo, RoomSeed};
use crate::error::QuizError;
use crate::registry::RoomRegistry;

/// Longest accepted username, in bytes.
pub const MAX_USERNAME_LEN: usize = 64;

/// Outcome of a successful join: everything a session needs to run.
#[derive(Debug, Clone)]
pub struct JoinedRoom {
    /// Room joined.
    pub code: RoomCode,
    /// Member name the session runs under.
    pub username: String,
    /// Seed for the room's question rotation.
    pub seed: RoomSeed,
}

/// Orchestration layer over a [`RoomRegistry`].
///
/// Stateless coordinator: holds the registry and the server secret and
/// never touches room state except through the registry.
#[derive(Clone)]
pub struct RoomService {
    registry: Arc<dyn RoomRegistry>,
    secret: Arc<[u8]>,
}

impl RoomService {
    /// Creates a new `RoomService`.
    #[must_use]
    pub fn new(registry: Arc<dyn RoomRegistry>, secret: &[u8]) -> Self {
        Self {
            registry,
            secret: Arc::from(secret),
        }
    }

    /// Name of the registry backend in use.
    #[must_use]
    pub fn backend_name(&self) -> &'static str {
        self.registry.backend_name()
    }

    /// Creates a room and returns its initial state.
    ///
    /// # Errors
    ///
    /// Returns a [`QuizError`] if the registry fails.
    pub async fn create_room(&self) -> Result<RoomInfo, QuizError> {
        let code = self.registry.create_room().await?;
        let info = self.registry.room_info(&code).await?;
        tracing::info!(room = %code, backend = self.backend_name(), "room created");
        Ok(info)
    }

    /// Validates join parameters and adds `username` to the room.
    ///
    /// A room code that cannot be parsed is reported as
    /// [`QuizError::RoomNotFound`]: no such room can exist.
    ///
    /// # Errors
    ///
    /// - [`QuizError::InvalidRequest`] for an empty or oversized username.
    /// - [`QuizError::RoomNotFound`], [`QuizError::UsernameTaken`] or
    ///   [`QuizError::BackendUnavailable`] from the registry.
    pub async fn join_room(&self, room: &str, username: &str) -> Result<JoinedRoom, QuizError> {
        validate_username(username)?;
        let code = RoomCode::parse(room).map_err(|_| QuizError::RoomNotFound(room.to_string()))?;

        let created = self.registry.join_room(&code, username).await?;

        tracing::info!(room = %code, username, "player joined");
        Ok(JoinedRoom {
            seed: RoomSeed::derive(&self.secret, created),
            code,
            username: username.to_string(),
        })
    }

    /// Returns the current state of a room.
    ///
    /// # Errors
    ///
    /// Returns [`QuizError::RoomNotFound`] for an unknown or malformed
    /// code, or a backend error.
    pub async fn room_info(&self, room: &str) -> Result<RoomInfo, QuizError> {
        let code = RoomCode::parse(room).map_err(|_| QuizError::RoomNotFound(room.to_string()))?;
        self.registry.room_info(&code).await
    }

    /// Sets the room's current game and returns the updated state.
    ///
    /// # Errors
    ///
    /// Returns [`QuizError::RoomNotFound`] for an unknown or malformed
    /// code, or a backend error.
    pub async fn start_game(&self, room: &str, game: u64) -> Result<RoomInfo, QuizError> {
        let code = RoomCode::parse(room).map_err(|_| QuizError::RoomNotFound(room.to_string()))?;
        self.registry.start_game(&code, game).await?;
        tracing::info!(room = %code, game, "game started");
        self.registry.room_info(&code).await
    }
}

impl std::fmt::Debug for RoomService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoomService")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

fn validate_username(username: &str) -> Result<(), QuizError> {
    if username.trim().is_empty() {
        return Err(QuizError::InvalidRequest(
            "username must not be blank".to_string(),
        ));
    }
    if username.len() > MAX_USERNAME_LEN {
        return Err(QuizError::InvalidRequest(format!(
            "username longer than {MAX_USERNAME_LEN} bytes"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::registry::shared::tests::FakeStore;
    use crate::registry::{MemoryRegistry, SharedRegistry};

    fn services() -> Vec<RoomService> {
        vec![
            RoomService::new(Arc::new(MemoryRegistry::new()), b"SEED_TEST"),
            RoomService::new(
                Arc::new(SharedRegistry::new(FakeStore::default())),
                b"SEED_TEST",
            ),
        ]
    }

    #[tokio::test]
    async fn join_returns_seed_derived_from_creation_time() {
        for service in services() {
            let Ok(info) = service.create_room().await else {
                panic!("create failed");
            };
            let Ok(joined) = service.join_room(info.code.as_str(), "alice").await else {
                panic!("join failed");
            };
            assert_eq!(joined.code, info.code);
            assert_eq!(joined.username, "alice");
            assert_eq!(joined.seed, RoomSeed::derive(b"SEED_TEST", info.created));
        }
    }

    #[tokio::test]
    async fn backends_agree_on_error_kinds() {
        for service in services() {
            assert!(matches!(
                service.join_room("NOPE", "x").await,
                Err(QuizError::RoomNotFound(_))
            ));
            assert!(matches!(
                service.room_info("NOPE").await,
                Err(QuizError::RoomNotFound(_))
            ));

            let Ok(info) = service.create_room().await else {
                panic!("create failed");
            };
            let room = info.code.as_str();
            tokio_test::assert_ok!(service.join_room(room, "alice").await);
            assert!(matches!(
                service.join_room(room, "alice").await,
                Err(QuizError::UsernameTaken { .. })
            ));
        }
    }

    #[tokio::test]
    async fn blank_or_long_usernames_are_rejected_before_registry() {
        let service = RoomService::new(Arc::new(MemoryRegistry::new()), b"s");
        // Room does not exist: an InvalidRequest proves validation ran first.
        assert!(matches!(
            service.join_room("QX7HC", "  ").await,
            Err(QuizError::InvalidRequest(_))
        ));
        let long = "x".repeat(MAX_USERNAME_LEN + 1);
        assert!(matches!(
            service.join_room("QX7HC", &long).await,
            Err(QuizError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn lower_case_room_codes_join() {
        let service = RoomService::new(Arc::new(MemoryRegistry::new()), b"s");
        let Ok(info) = service.create_room().await else {
            panic!("create failed");
        };
        let lower = info.code.as_str().to_ascii_lowercase();
        tokio_test::assert_ok!(service.join_room(&lower, "bob").await);
    }

    #[tokio::test]
    async fn start_game_updates_info() {
        for service in services() {
            let Ok(info) = service.create_room().await else {
                panic!("create failed");
            };
            let Ok(updated) = service.start_game(info.code.as_str(), 9).await else {
                panic!("start_game failed");
            };
            assert_eq!(updated.game, Some(9));
        }
    }
}
