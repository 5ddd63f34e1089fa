//! REST API layer: route handlers, DTOs, OpenAPI, and router composition.
//!
//! Resource endpoints are mounted under `/api/v1`; system endpoints and the
//! WebSocket join live at the root.

pub mod dto;
pub mod handlers;
pub mod openapi;

use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;
use crate::ws::handler::play_handler;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes())
}

/// Builds the full application: REST, WebSocket, API docs and HTTP layers.
pub fn build_app(state: AppState) -> Router {
    let router = build_router().route("/play", get(play_handler));

    #[cfg(feature = "swagger-ui")]
    let router = {
        use utoipa::OpenApi;
        router.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", openapi::ApiDoc::openapi()),
        )
    };

    #[cfg(not(feature = "swagger-ui"))]
    let router = router.route("/api-docs/openapi.json", get(openapi_json));

    router
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(not(feature = "swagger-ui"))]
async fn openapi_json() -> axum::Json<utoipa::openapi::OpenApi> {
    use utoipa::OpenApi;
    axum::Json(openapi::ApiDoc::openapi())
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::{TimeZone, Utc};
    use tower::ServiceExt;

    use super::*;
    use crate::api::dto::{CreateRoomResponse, RoomInfoDto};
    use crate::config::ServerConfig;
    use crate::domain::QuestionSchedule;
    use crate::registry::MemoryRegistry;

    fn app() -> Router {
        let Some(epoch) = Utc.timestamp_opt(1_637_082_262, 0).single() else {
            panic!("valid epoch");
        };
        let Ok(schedule) =
            QuestionSchedule::new(Duration::from_secs(15), Duration::from_secs(2), epoch)
        else {
            panic!("valid schedule");
        };
        let config = ServerConfig::local(b"SEED_TEST".to_vec(), schedule);
        build_app(AppState::new(Arc::new(MemoryRegistry::new()), &config))
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
        let Ok(response) = app.clone().oneshot(req).await else {
            panic!("router failed");
        };
        let status = response.status();
        let Ok(bytes) = axum::body::to_bytes(response.into_body(), 1 << 16).await else {
            panic!("body read failed");
        };
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    fn request(method: &str, uri: &str, body: Option<&str>) -> Request<Body> {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        let Ok(req) = builder.body(body.map_or_else(Body::empty, |b| Body::from(b.to_string())))
        else {
            panic!("valid request");
        };
        req
    }

    #[tokio::test]
    async fn create_then_get_room() {
        let app = app();
        let (status, json) = send(&app, request("POST", "/api/v1/rooms", None)).await;
        assert_eq!(status, StatusCode::CREATED);
        let Ok(created) = serde_json::from_value::<CreateRoomResponse>(json) else {
            panic!("unexpected create body");
        };
        assert_eq!(created.room.len(), 5);

        let uri = format!("/api/v1/rooms/{}", created.room);
        let (status, json) = send(&app, request("GET", &uri, None)).await;
        assert_eq!(status, StatusCode::OK);
        let Ok(info) = serde_json::from_value::<RoomInfoDto>(json) else {
            panic!("unexpected info body");
        };
        assert_eq!(info.room, created.room);
        assert_eq!(info.created, created.created);
        assert!(info.players.is_empty());
        assert_eq!(info.game, None);
    }

    #[tokio::test]
    async fn unknown_room_is_404() {
        let app = app();
        let (status, json) = send(&app, request("GET", "/api/v1/rooms/NOPE", None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"]["code"], 2001);
    }

    #[tokio::test]
    async fn start_game_round_trip() {
        let app = app();
        let (_, json) = send(&app, request("POST", "/api/v1/rooms", None)).await;
        let Ok(created) = serde_json::from_value::<CreateRoomResponse>(json) else {
            panic!("unexpected create body");
        };

        let uri = format!("/api/v1/rooms/{}/game", created.room);
        let (status, json) = send(&app, request("PUT", &uri, Some(r#"{"game":4}"#))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["game"], 4);

        let (status, _) = send(
            &app,
            request("PUT", "/api/v1/rooms/NOPE/game", Some(r#"{"game":4}"#)),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn play_without_params_is_400() {
        let app = app();
        let (status, json) = send(&app, request("GET", "/play", None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], 1001);

        let (status, _) = send(&app, request("GET", "/play?room=QX7HC", None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, request("GET", "/play?username=alice", None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn play_without_upgrade_leaves_room_untouched() {
        let app = app();
        let (_, json) = send(&app, request("POST", "/api/v1/rooms", None)).await;
        let Ok(created) = serde_json::from_value::<CreateRoomResponse>(json) else {
            panic!("unexpected create body");
        };

        let uri = format!("/play?room={}&username=alice", created.room);
        let (status, _) = send(&app, request("GET", &uri, None)).await;
        assert!(status.is_client_error());

        let info_uri = format!("/api/v1/rooms/{}", created.room);
        let (_, json) = send(&app, request("GET", &info_uri, None)).await;
        assert_eq!(json["players"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn health_and_schedule() {
        let app = app();
        let (status, json) = send(&app, request("GET", "/health", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["backend"], "memory");

        let (status, json) = send(&app, request("GET", "/config/schedule", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["interval_ms"], 15_000);
        assert_eq!(json["margin_ms"], 2_000);
        assert_eq!(json["question_range"], 500);
    }

    #[tokio::test]
    async fn openapi_document_is_served() {
        let app = app();
        let (status, json) = send(&app, request("GET", "/api-docs/openapi.json", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(json["paths"]["/play"].is_object());
    }
}
