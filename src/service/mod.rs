//! Service layer: business logic orchestration.

pub mod room_service;

pub use room_service::{JoinedRoom, RoomService};
