//! WebSocket payloads: question deliveries and acknowledgements.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Server → client: the question of the current bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionMessage {
    /// Member the session runs under.
    pub username: String,
    /// Question number, `0..QUESTION_RANGE`.
    pub question: u32,
    /// Instant after which the question is stale (RFC-3339).
    pub exp: DateTime<Utc>,
    /// Room code.
    pub room: String,
}

/// Server → client: acknowledgement of one client frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AckMessage {
    /// Payload received, verbatim.
    pub msg: String,
    /// Server UTC time of receipt (RFC-3339).
    pub now: DateTime<Utc>,
}
