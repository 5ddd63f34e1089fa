//! Room request/response bodies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::RoomInfo;

/// Response body of `POST /api/v1/rooms`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateRoomResponse {
    /// Code to share with players.
    #[schema(example = "QX7HC")]
    pub room: String,
    /// Creation time, whole seconds.
    pub created: DateTime<Utc>,
}

/// Full room state.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RoomInfoDto {
    /// Room code.
    #[schema(example = "QX7HC")]
    pub room: String,
    /// Creation time, whole seconds.
    pub created: DateTime<Utc>,
    /// Current game identifier, absent until a game is started.
    pub game: Option<u64>,
    /// Current members, sorted.
    pub players: Vec<String>,
}

/// Request body of `PUT /api/v1/rooms/{code}/game`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StartGameRequest {
    /// Identifier of the game now being played.
    pub game: u64,
}

impl From<RoomInfo> for CreateRoomResponse {
    fn from(info: RoomInfo) -> Self {
        Self {
            room: info.code.into(),
            created: info.created,
        }
    }
}

impl From<RoomInfo> for RoomInfoDto {
    fn from(info: RoomInfo) -> Self {
        Self {
            room: info.code.into(),
            created: info.created,
            game: info.game,
            players: info.players,
        }
    }
}
