//! OpenAPI document for the HTTP surface.

use utoipa::OpenApi;

use super::handlers::{rooms, system};
use crate::ws::handler as play;

/// Generated OpenAPI 3.1 description of every HTTP endpoint.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "quizsync",
        description = "Time-synchronized quiz rooms. Create a room over REST, then join it over WebSocket at `/play`."
    ),
    paths(
        rooms::create_room,
        rooms::get_room,
        rooms::start_game,
        system::health_handler,
        system::schedule_handler,
        play::play_handler,
    ),
    tags(
        (name = "Rooms", description = "Room lifecycle"),
        (name = "Play", description = "WebSocket join"),
        (name = "System", description = "Health and configuration"),
    )
)]
pub struct ApiDoc;
