//! # quizsync
//!
//! Time-synchronized quiz rooms over WebSocket.
//!
//! Clients join a room and receive one question per fixed interval. The
//! question is a pure function of the room's seed and the current time
//! bucket, so every connection of a room sees the same question at the
//! same moment without any broadcast between them.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── Join handler + sessions (ws/)
//!     │
//!     ├── RoomService (service/)
//!     ├── Question generator, bucket schedule (domain/)
//!     │
//!     └── RoomRegistry (registry/)
//!         ├── MemoryRegistry
//!         └── SharedRegistry ── Redis
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod registry;
pub mod service;
pub mod ws;
