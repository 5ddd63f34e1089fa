//! Serialized write half of a session's socket.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::SplitSink;
use futures_util::{Sink, SinkExt};
use serde::Serialize;
use tokio::sync::Mutex;

use crate::error::QuizError;

/// Shared handle on the socket's write half.
///
/// Every frame goes through one mutex, so the scheduler and the reader's
/// acknowledgements never interleave on the wire. Clones share the lock.
pub struct SessionWriter<S = SplitSink<WebSocket, Message>> {
    sink: Arc<Mutex<S>>,
}

impl<S> Clone for SessionWriter<S> {
    fn clone(&self) -> Self {
        Self {
            sink: Arc::clone(&self.sink),
        }
    }
}

impl<S> SessionWriter<S>
where
    S: Sink<Message, Error = axum::Error> + Unpin,
{
    /// Wraps the write half of a socket.
    #[must_use]
    pub fn new(sink: S) -> Self {
        Self {
            sink: Arc::new(Mutex::new(sink)),
        }
    }

    /// Sends `payload` as one JSON text frame.
    ///
    /// # Errors
    ///
    /// Returns [`QuizError::ConnectionTerminal`] if the frame cannot be
    /// written, or [`QuizError::Internal`] if `payload` does not serialize.
    pub async fn send_json<T: Serialize>(&self, payload: &T) -> Result<(), QuizError> {
        let json =
            serde_json::to_string(payload).map_err(|e| QuizError::Internal(e.to_string()))?;
        self.sink.lock().await.send(Message::text(json)).await?;
        Ok(())
    }

    /// Sends a close frame and flushes. Errors are ignored: the peer may
    /// already be gone.
    pub async fn close(&self) {
        let _ = self.sink.lock().await.close().await;
    }
}

impl<S> std::fmt::Debug for SessionWriter<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionWriter").finish_non_exhaustive()
    }
}
