//! Room handlers: create, inspect, start a game.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};

use crate::api::dto::{CreateRoomResponse, RoomInfoDto, StartGameRequest};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, QuizError};

/// `POST /rooms` — Create a new room.
///
/// # Errors
///
/// Returns [`QuizError::BackendUnavailable`] if the room store fails.
#[utoipa::path(
    post,
    path = "/api/v1/rooms",
    tag = "Rooms",
    summary = "Create a room",
    description = "Creates an empty room under a fresh five-character code.",
    responses(
        (status = 201, description = "Room created", body = CreateRoomResponse),
        (status = 503, description = "Room store unavailable", body = ErrorResponse),
    )
)]
pub async fn create_room(State(state): State<AppState>) -> Result<impl IntoResponse, QuizError> {
    let info = state.rooms.create_room().await?;
    Ok((StatusCode::CREATED, Json(CreateRoomResponse::from(info))))
}

/// `GET /rooms/{code}` — Room state and members.
///
/// # Errors
///
/// Returns [`QuizError::RoomNotFound`] or a backend error.
#[utoipa::path(
    get,
    path = "/api/v1/rooms/{code}",
    tag = "Rooms",
    summary = "Get room",
    description = "Returns the room's creation time, current game and members.",
    params(("code" = String, Path, description = "Room code")),
    responses(
        (status = 200, description = "Room state", body = RoomInfoDto),
        (status = 404, description = "Room not found", body = ErrorResponse),
        (status = 503, description = "Room store unavailable", body = ErrorResponse),
    )
)]
pub async fn get_room(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, QuizError> {
    let info = state.rooms.room_info(&code).await?;
    Ok(Json(RoomInfoDto::from(info)))
}

/// `PUT /rooms/{code}/game` — Record the game the room is playing.
///
/// # Errors
///
/// Returns [`QuizError::RoomNotFound`] or a backend error.
#[utoipa::path(
    put,
    path = "/api/v1/rooms/{code}/game",
    tag = "Rooms",
    summary = "Start a game",
    description = "Sets the room's current game identifier. The room must exist.",
    params(("code" = String, Path, description = "Room code")),
    request_body = StartGameRequest,
    responses(
        (status = 200, description = "Updated room state", body = RoomInfoDto),
        (status = 404, description = "Room not found", body = ErrorResponse),
        (status = 503, description = "Room store unavailable", body = ErrorResponse),
    )
)]
pub async fn start_game(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(req): Json<StartGameRequest>,
) -> Result<impl IntoResponse, QuizError> {
    let info = state.rooms.start_game(&code, req.game).await?;
    Ok(Json(RoomInfoDto::from(info)))
}

/// Room routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/rooms", post(create_room))
        .route("/rooms/{code}", get(get_room))
        .route("/rooms/{code}/game", put(start_game))
}
