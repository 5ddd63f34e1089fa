//! Axum WebSocket upgrade handler.

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use utoipa::IntoParams;

use super::session::run_session;
use crate::app_state::AppState;
use crate::error::{ErrorResponse, QuizError};

/// Query parameters of a join request.
#[derive(Debug, Default, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct JoinParams {
    /// Room code to join.
    pub room: Option<String>,
    /// Username to join under; must be unique within the room.
    pub username: Option<String>,
}

impl JoinParams {
    /// Returns `(room, username)` if both are present and non-empty.
    ///
    /// # Errors
    ///
    /// Returns [`QuizError::MissingParameter`] naming the first absent one.
    pub fn require(self) -> Result<(String, String), QuizError> {
        let room = self
            .room
            .filter(|r| !r.is_empty())
            .ok_or(QuizError::MissingParameter("room"))?;
        let username = self
            .username
            .filter(|u| !u.is_empty())
            .ok_or(QuizError::MissingParameter("username"))?;
        Ok((room, username))
    }
}

/// `GET /play?room=..&username=..` — Join a room and upgrade to WebSocket.
///
/// Parameters are checked first, then the upgrade headers, then the join.
/// Any failure is answered with a plain HTTP error and the connection is
/// never upgraded.
#[utoipa::path(
    get,
    path = "/play",
    tag = "Play",
    summary = "Join a room",
    description = "Joins `room` as `username` and upgrades to WebSocket. The server then sends one question per bucket and acknowledges every client frame.",
    params(JoinParams),
    responses(
        (status = 101, description = "Joined; connection upgraded"),
        (status = 400, description = "Missing `room` or `username`", body = ErrorResponse),
        (status = 404, description = "Room not found", body = ErrorResponse),
        (status = 409, description = "Username already taken", body = ErrorResponse),
        (status = 503, description = "Room store unavailable", body = ErrorResponse),
    )
)]
pub async fn play_handler(
    State(state): State<AppState>,
    Query(params): Query<JoinParams>,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    let (room, username) = match params.require() {
        Ok(pair) => pair,
        Err(e) => {
            tracing::debug!(error = %e, "join rejected");
            return e.into_response();
        }
    };
    let ws = match ws {
        Ok(ws) => ws,
        Err(rejection) => return rejection.into_response(),
    };

    let joined = match state.rooms.join_room(&room, &username).await {
        Ok(joined) => joined,
        Err(e) => {
            tracing::info!(room = %room, username = %username, error = %e, "join rejected");
            return e.into_response();
        }
    };

    let schedule = state.schedule;
    ws.on_upgrade(move |socket| run_session(socket, joined, schedule))
}
