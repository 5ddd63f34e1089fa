//! Service configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`). Configuration is read once at startup
//! and shared immutably; nothing here is reloadable.
//!
//! | Variable               | Default                            |
//! |------------------------|------------------------------------|
//! | `LISTEN_ADDR`          | `127.0.0.1:8080`                   |
//! | `APP_SECRET`           | `this_is_secret`                   |
//! | `QUESTION_INTERVAL_MS` | `15000`                            |
//! | `EXPIRY_MARGIN_MS`     | `2000`                             |
//! | `SCHEDULE_EPOCH`       | `2021-11-16T17:04:22.000324243Z`   |
//! | `REGISTRY_BACKEND`     | `memory` (or `redis`)              |
//! | `REDIS_URL`            | `redis://127.0.0.1:6379/0`         |

use std::net::SocketAddr;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::domain::QuestionSchedule;
use crate::error::QuizError;

/// Default bucket width.
pub const DEFAULT_INTERVAL_MS: u64 = 15_000;

/// Default grace period added to each question's expiry.
pub const DEFAULT_MARGIN_MS: u64 = 2_000;

/// Default origin of the bucket grid.
pub const DEFAULT_EPOCH: &str = "2021-11-16T17:04:22.000324243Z";

/// Which registry backend to run against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryBackend {
    /// In-process map.
    Memory,
    /// Redis at the given URL.
    Redis {
        /// Connection URL.
        url: String,
    },
}

/// Top-level service configuration.
///
/// Loaded once at startup via [`ServerConfig::from_env`].
#[derive(Clone)]
pub struct ServerConfig {
    /// Socket address to bind the HTTP server to.
    pub listen_addr: SocketAddr,

    /// Server secret mixed into every room seed.
    pub secret: Vec<u8>,

    /// Bucket grid for the question rotation.
    pub schedule: QuestionSchedule,

    /// Registry backend.
    pub backend: RegistryBackend,
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to defaults when a variable is not set.
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns [`QuizError::InvalidRequest`] if `LISTEN_ADDR` or
    /// `SCHEDULE_EPOCH` cannot be parsed, the interval is zero, the epoch
    /// lies in the future, or the backend name is unknown.
    pub fn from_env() -> Result<Self, QuizError> {
        dotenvy::dotenv().ok();

        let listen_addr: SocketAddr = env_or("LISTEN_ADDR", "127.0.0.1:8080")
            .parse()
            .map_err(|e| QuizError::InvalidRequest(format!("LISTEN_ADDR: {e}")))?;

        let secret = env_or("APP_SECRET", "this_is_secret").into_bytes();

        let epoch = parse_epoch(&env_or("SCHEDULE_EPOCH", DEFAULT_EPOCH))?;
        let schedule = build_schedule(
            parse_env("QUESTION_INTERVAL_MS", DEFAULT_INTERVAL_MS),
            parse_env("EXPIRY_MARGIN_MS", DEFAULT_MARGIN_MS),
            epoch,
            Utc::now(),
        )?;

        let backend = parse_backend(
            &env_or("REGISTRY_BACKEND", "memory"),
            env_or("REDIS_URL", "redis://127.0.0.1:6379/0"),
        )?;

        Ok(Self {
            listen_addr,
            secret,
            schedule,
            backend,
        })
    }

    /// Configuration with defaults and an in-memory registry, bound to an
    /// ephemeral local port.
    #[must_use]
    pub fn local(secret: impl Into<Vec<u8>>, schedule: QuestionSchedule) -> Self {
        Self {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            secret: secret.into(),
            schedule,
            backend: RegistryBackend::Memory,
        }
    }
}

// The secret never reaches logs.
impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("listen_addr", &self.listen_addr)
            .field("schedule", &self.schedule)
            .field("backend", &self.backend)
            .finish_non_exhaustive()
    }
}

/// Parses an RFC-3339 epoch.
fn parse_epoch(raw: &str) -> Result<DateTime<Utc>, QuizError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| QuizError::InvalidRequest(format!("SCHEDULE_EPOCH {raw:?}: {e}")))
}

/// Validates the schedule against the current time.
fn build_schedule(
    interval_ms: u64,
    margin_ms: u64,
    epoch: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<QuestionSchedule, QuizError> {
    if epoch > now {
        return Err(QuizError::InvalidRequest(format!(
            "SCHEDULE_EPOCH {epoch} lies in the future"
        )));
    }
    QuestionSchedule::new(
        Duration::from_millis(interval_ms),
        Duration::from_millis(margin_ms),
        epoch,
    )
}

fn parse_backend(name: &str, redis_url: String) -> Result<RegistryBackend, QuizError> {
    match name.to_ascii_lowercase().as_str() {
        "memory" => Ok(RegistryBackend::Memory),
        "redis" => Ok(RegistryBackend::Redis { url: redis_url }),
        other => Err(QuizError::InvalidRequest(format!(
            "REGISTRY_BACKEND must be `memory` or `redis`, got {other:?}"
        ))),
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
