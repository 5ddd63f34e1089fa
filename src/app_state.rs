//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::domain::QuestionSchedule;
use crate::registry::RoomRegistry;
use crate::service::RoomService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Room service for all registry operations.
    pub rooms: RoomService,
    /// Bucket grid every session follows.
    pub schedule: QuestionSchedule,
}

impl AppState {
    /// Wires the service layer over `registry`.
    #[must_use]
    pub fn new(registry: Arc<dyn RoomRegistry>, config: &ServerConfig) -> Self {
        Self {
            rooms: RoomService::new(registry, &config.secret),
            schedule: config.schedule,
        }
    }
}
