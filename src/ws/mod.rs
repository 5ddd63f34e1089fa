//! WebSocket layer: join handshake and per-connection sessions.
//!
//! The endpoint at `/play` joins a room and then streams the room's
//! question rotation, one message per bucket, while acknowledging every
//! frame the client sends.

pub mod handler;
pub mod messages;
pub mod session;
pub mod writer;
