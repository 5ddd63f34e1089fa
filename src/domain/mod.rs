//! Domain layer: room identity, room state, and the question rotation.
//!
//! This module holds the pure parts of the service: room codes, the
//! room read model, bucket arithmetic, and the deterministic question
//! generator. Nothing here performs I/O.

pub mod question;
pub mod room_code;
pub mod room_info;
pub mod schedule;

pub use question::{QUESTION_RANGE, RoomSeed};
pub use room_code::RoomCode;
pub use room_info::{RoomInfo, RoomRecord};
pub use schedule::{QuestionSchedule, Tick};
