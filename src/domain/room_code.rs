//! Type-safe room code.
//!
//! [`RoomCode`] is a five-character newtype over a restricted alphabet
//! that leaves out glyphs people confuse when reading a code aloud or off
//! a screen (`0`/`O`, `1`/`I`/`L`, ...).

use std::fmt;
use std::str::FromStr;

use rand::distributions::Uniform;
use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::QuizError;

/// Symbols a room code is drawn from. 20 symbols, 20^5 = 3 200 000 codes.
pub const ROOM_CODE_ALPHABET: &[u8] = b"23456789CFGHJMPQRVWX";

/// Number of symbols in a room code.
pub const ROOM_CODE_LEN: usize = 5;

/// Identifier of a quiz room.
///
/// Generated once at room creation and immutable thereafter. Used as the
/// key in every registry backend and as the `room` join parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomCode(String);

impl RoomCode {
    /// Draws a fresh code: five independent uniform picks over
    /// [`ROOM_CODE_ALPHABET`].
    ///
    /// Codes are not checked against existing rooms.
    #[must_use]
    pub fn generate() -> Self {
        let mut rng = thread_rng();
        let dist = Uniform::from(0..ROOM_CODE_ALPHABET.len());

        let code = (0..ROOM_CODE_LEN)
            .filter_map(|_| ROOM_CODE_ALPHABET.get(dist.sample(&mut rng)))
            .map(|b| char::from(*b))
            .collect();
        Self(code)
    }

    /// Parses a user-supplied code. Lower-case input is accepted and
    /// normalized.
    ///
    /// # Errors
    ///
    /// Returns [`QuizError::InvalidRequest`] if the code has the wrong
    /// length or contains a symbol outside [`ROOM_CODE_ALPHABET`].
    pub fn parse(raw: &str) -> Result<Self, QuizError> {
        let code = raw.trim().to_ascii_uppercase();
        if code.len() != ROOM_CODE_LEN {
            return Err(QuizError::InvalidRequest(format!(
                "room code must be {ROOM_CODE_LEN} characters, got {raw:?}"
            )));
        }
        if let Some(bad) = code.bytes().find(|b| !ROOM_CODE_ALPHABET.contains(b)) {
            return Err(QuizError::InvalidRequest(format!(
                "room code contains invalid symbol {:?}",
                char::from(bad)
            )));
        }
        Ok(Self(code))
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RoomCode {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for RoomCode {
    type Error = QuizError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RoomCode> for String {
    fn from(code: RoomCode) -> Self {
        code.0
    }
}
