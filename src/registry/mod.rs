//! Room registry: room existence, creation metadata, and membership.
//!
//! [`RoomRegistry`] is the one capability the rest of the service sees.
//! Two backends implement it:
//!
//! - [`MemoryRegistry`]: in-process map, process lifetime.
//! - [`SharedRegistry`]: any [`SharedStore`] (Redis via [`RedisStore`]),
//!   shared between service instances.
//!
//! Both guarantee that concurrent joins with the same username on the
//! same room admit exactly one caller.

pub mod memory;
pub mod redis_store;
pub mod shared;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub use memory::MemoryRegistry;
pub use redis_store::RedisStore;
pub use shared::{SharedRegistry, SharedStore};

use crate::config::RegistryBackend;
use crate::domain::{RoomCode, RoomInfo};
use crate::error::QuizError;

/// Storage-agnostic room registry.
#[async_trait]
pub trait RoomRegistry: Send + Sync + std::fmt::Debug {
    /// Short backend name for logs and the health endpoint.
    fn backend_name(&self) -> &'static str;

    /// Creates a room with a freshly drawn code, no members and no game.
    ///
    /// # Errors
    ///
    /// Returns [`QuizError::BackendUnavailable`] if the store fails.
    async fn create_room(&self) -> Result<RoomCode, QuizError>;

    /// Adds `username` to the room's members and returns the room's
    /// creation time, the input to its question seed.
    ///
    /// # Errors
    ///
    /// - [`QuizError::RoomNotFound`] if the room was never created.
    /// - [`QuizError::UsernameTaken`] if `username` is already a member;
    ///   membership is left untouched.
    /// - [`QuizError::BackendUnavailable`] if the store fails.
    async fn join_room(
        &self,
        code: &RoomCode,
        username: &str,
    ) -> Result<DateTime<Utc>, QuizError>;

    /// Returns the room's creation time, game and members.
    ///
    /// # Errors
    ///
    /// Returns [`QuizError::RoomNotFound`] or
    /// [`QuizError::BackendUnavailable`].
    async fn room_info(&self, code: &RoomCode) -> Result<RoomInfo, QuizError>;

    /// Sets the room's current game identifier.
    ///
    /// # Errors
    ///
    /// Returns [`QuizError::RoomNotFound`] or
    /// [`QuizError::BackendUnavailable`].
    async fn start_game(&self, code: &RoomCode, game: u64) -> Result<(), QuizError>;
}

/// Builds the registry selected by configuration.
///
/// # Errors
///
/// Returns [`QuizError::BackendUnavailable`] if the shared store cannot
/// be reached.
pub async fn connect(backend: &RegistryBackend) -> Result<Arc<dyn RoomRegistry>, QuizError> {
    match backend {
        RegistryBackend::Memory => Ok(Arc::new(MemoryRegistry::new())),
        RegistryBackend::Redis { url } => {
            let store = RedisStore::connect(url).await?;
            Ok(Arc::new(SharedRegistry::new(store)))
        }
    }
}
