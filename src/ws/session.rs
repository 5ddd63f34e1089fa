//! Per-connection session: question scheduler plus inbound reader.
//!
//! A session runs two activities against one socket:
//!
//! - the scheduler, on its own task, sends the current question at every
//!   bucket boundary;
//! - the reader, on the connection task, acknowledges every client frame.
//!
//! Whichever stops first ends the session. Both write through the same
//! [`SessionWriter`].

use std::convert::Infallible;

use axum::extract::ws::{Message, WebSocket};
use chrono::Utc;
use futures_util::{Sink, Stream, StreamExt};
use tokio::time::Instant;
use tracing::Instrument;

use super::messages::{AckMessage, QuestionMessage};
use super::writer::SessionWriter;
use crate::domain::QuestionSchedule;
use crate::error::QuizError;
use crate::service::JoinedRoom;

/// Why a session stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SessionEnd {
    /// The peer sent a close frame or the stream ended.
    PeerClosed,
    /// Reading from the peer failed.
    ReadFailed,
    /// Writing to the peer failed.
    WriteFailed,
}

/// Drives an upgraded connection until the peer leaves or a read/write
/// fails. Nothing is retried.
pub async fn run_session(socket: WebSocket, joined: JoinedRoom, schedule: QuestionSchedule) {
    let span = tracing::info_span!(
        "session",
        session_id = %uuid::Uuid::new_v4(),
        room = %joined.code,
        username = %joined.username,
    );

    let (sink, stream) = socket.split();
    drive_session(sink, stream, joined, schedule)
        .instrument(span)
        .await;
}

/// Runs both halves of a session over an already split connection.
///
/// The scheduler task has fully stopped by the time this returns, so no
/// frame is written after the session ends.
pub(crate) async fn drive_session<S, R>(
    sink: S,
    stream: R,
    joined: JoinedRoom,
    schedule: QuestionSchedule,
) -> SessionEnd
where
    S: Sink<Message, Error = axum::Error> + Unpin + Send + 'static,
    R: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    let writer = SessionWriter::new(sink);
    tracing::info!("session active");

    let mut scheduler = tokio::spawn(
        run_scheduler(writer.clone(), joined, schedule).instrument(tracing::Span::current()),
    );

    let end = tokio::select! {
        outcome = &mut scheduler => match outcome {
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "question delivery failed");
                SessionEnd::WriteFailed
            }
            Ok(Ok(never)) => match never {},
            Err(e) => {
                tracing::error!(error = %e, "scheduler task failed");
                SessionEnd::WriteFailed
            }
        },
        outcome = run_reader(stream, &writer) => {
            scheduler.abort();
            let _ = scheduler.await;
            outcome
        }
    };

    writer.close().await;
    tracing::info!(?end, "session closed");
    end
}

/// Sends the current question, then sleeps until the next bucket starts.
///
/// The wake-up target is taken from the same instant the bucket was
/// computed at, so time spent serializing and writing does not push later
/// deliveries off the boundary. A wake-up that still lands in an already
/// delivered bucket sends nothing; a late wake-up sends the bucket current
/// at that moment, never the missed ones.
async fn run_scheduler<S>(
    writer: SessionWriter<S>,
    joined: JoinedRoom,
    schedule: QuestionSchedule,
) -> Result<Infallible, QuizError>
where
    S: Sink<Message, Error = axum::Error> + Unpin,
{
    let room = joined.code.to_string();
    let mut last_round: Option<u64> = None;

    loop {
        let started = Instant::now();
        let tick = schedule.tick(Utc::now());

        if last_round.is_none_or(|last| tick.round > last) {
            let question = joined.seed.question(tick.bucket);
            writer
                .send_json(&QuestionMessage {
                    username: joined.username.clone(),
                    question,
                    exp: tick.expires_at,
                    room: room.clone(),
                })
                .await?;
            tracing::debug!(bucket = tick.bucket, question, "question sent");
            last_round = Some(tick.round);
        }

        tokio::time::sleep_until(started + tick.remaining).await;
    }
}

/// Acknowledges client frames until the peer closes or a read or an
/// acknowledgement write fails.
async fn run_reader<S, R>(mut stream: R, writer: &SessionWriter<S>) -> SessionEnd
where
    S: Sink<Message, Error = axum::Error> + Unpin,
    R: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    while let Some(frame) = stream.next().await {
        let msg = match frame {
            Ok(Message::Text(text)) => text.as_str().to_owned(),
            Ok(Message::Binary(bytes)) => String::from_utf8_lossy(&bytes).into_owned(),
            Ok(Message::Close(_)) => return SessionEnd::PeerClosed,
            Ok(Message::Ping(_) | Message::Pong(_)) => continue,
            Err(e) => {
                tracing::warn!(error = %e, "read failed");
                return SessionEnd::ReadFailed;
            }
        };
        let ack = AckMessage {
            msg,
            now: Utc::now(),
        };
        if let Err(e) = writer.send_json(&ack).await {
            tracing::warn!(error = %e, "acknowledgement failed");
            return SessionEnd::WriteFailed;
        }
    }
    SessionEnd::PeerClosed
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use std::time::Duration;

    use chrono::TimeZone;
    use tokio::sync::mpsc;

    use super::*;
    use crate::domain::{RoomCode, RoomSeed};

    const INTERVAL: Duration = Duration::from_millis(50);

    type Inbound = Result<Message, axum::Error>;

    fn joined() -> JoinedRoom {
        let Ok(code) = RoomCode::parse("QX7HC") else {
            panic!("valid code");
        };
        let Some(created) = Utc.timestamp_opt(1_637_082_262, 0).single() else {
            panic!("valid timestamp");
        };
        JoinedRoom {
            code,
            username: "alice".to_string(),
            seed: RoomSeed::derive(b"SEED_TEST", created),
        }
    }

    fn schedule() -> QuestionSchedule {
        let Some(epoch) = Utc.timestamp_opt(1_637_082_262, 0).single() else {
            panic!("valid epoch");
        };
        let Ok(schedule) = QuestionSchedule::new(INTERVAL, Duration::from_millis(10), epoch)
        else {
            panic!("valid schedule");
        };
        schedule
    }

    /// Sink forwarding every text frame to a channel.
    fn recording_sink(
        frames: mpsc::UnboundedSender<String>,
    ) -> impl Sink<Message, Error = axum::Error> + Unpin + Send + 'static {
        Box::pin(futures_util::sink::unfold(
            frames,
            |frames, msg: Message| async move {
                if let Message::Text(text) = msg {
                    frames.send(text.as_str().to_owned()).map_err(axum::Error::new)?;
                }
                Ok::<_, axum::Error>(frames)
            },
        ))
    }

    /// Stream fed by the test through a channel.
    fn scripted_stream(
        frames: mpsc::UnboundedReceiver<Inbound>,
    ) -> impl Stream<Item = Inbound> + Unpin {
        Box::pin(futures_util::stream::unfold(frames, |mut frames| async move {
            frames.recv().await.map(|frame| (frame, frames))
        }))
    }

    /// Sink whose every write fails as if the peer had reset the connection.
    struct BrokenSink;

    impl Sink<Message> for BrokenSink {
        type Error = axum::Error;

        fn poll_ready(self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Err(axum::Error::new(std::io::Error::from(
                std::io::ErrorKind::ConnectionReset,
            ))))
        }

        fn start_send(self: Pin<&mut Self>, _: Message) -> Result<(), Self::Error> {
            Ok(())
        }

        fn poll_flush(self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }

        fn poll_close(self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }
    }

    async fn next_frame(frames: &mut mpsc::UnboundedReceiver<String>) -> String {
        let Ok(Some(frame)) = tokio::time::timeout(Duration::from_secs(2), frames.recv()).await
        else {
            panic!("no frame written");
        };
        frame
    }

    async fn finished(session: tokio::task::JoinHandle<SessionEnd>) -> SessionEnd {
        let Ok(Ok(end)) = tokio::time::timeout(Duration::from_secs(2), session).await else {
            panic!("session did not end");
        };
        end
    }

    /// Completes once every writer handle is gone, i.e. nothing can write
    /// to the sink any more.
    async fn assert_sink_released(frames: &mut mpsc::UnboundedReceiver<String>) {
        let drained = tokio::time::timeout(INTERVAL * 4, async {
            while frames.recv().await.is_some() {}
        })
        .await;
        assert!(drained.is_ok(), "scheduler still holds the sink");
    }

    #[tokio::test]
    async fn close_frame_stops_the_scheduler() {
        let (out_tx, mut out_rx) = mpsc::unbounded_channel();
        let (in_tx, in_rx) = mpsc::unbounded_channel();
        let session = tokio::spawn(drive_session(
            recording_sink(out_tx),
            scripted_stream(in_rx),
            joined(),
            schedule(),
        ));

        let first = next_frame(&mut out_rx).await;
        assert!(serde_json::from_str::<QuestionMessage>(&first).is_ok());

        let _ = in_tx.send(Ok(Message::Close(None)));
        assert_eq!(finished(session).await, SessionEnd::PeerClosed);
        assert_sink_released(&mut out_rx).await;
    }

    #[tokio::test]
    async fn read_error_stops_the_scheduler() {
        let (out_tx, mut out_rx) = mpsc::unbounded_channel();
        let (in_tx, in_rx) = mpsc::unbounded_channel();
        let session = tokio::spawn(drive_session(
            recording_sink(out_tx),
            scripted_stream(in_rx),
            joined(),
            schedule(),
        ));

        let _ = next_frame(&mut out_rx).await;
        let _ = in_tx.send(Err(axum::Error::new(std::io::Error::from(
            std::io::ErrorKind::ConnectionReset,
        ))));
        assert_eq!(finished(session).await, SessionEnd::ReadFailed);
        assert_sink_released(&mut out_rx).await;
    }

    #[tokio::test]
    async fn dropped_inbound_stream_ends_the_session() {
        let (out_tx, mut out_rx) = mpsc::unbounded_channel();
        let (in_tx, in_rx) = mpsc::unbounded_channel::<Inbound>();
        let session = tokio::spawn(drive_session(
            recording_sink(out_tx),
            scripted_stream(in_rx),
            joined(),
            schedule(),
        ));

        let _ = next_frame(&mut out_rx).await;
        drop(in_tx);
        assert_eq!(finished(session).await, SessionEnd::PeerClosed);
        assert_sink_released(&mut out_rx).await;
    }

    #[tokio::test]
    async fn write_failure_ends_a_silent_session() {
        let session = tokio::spawn(drive_session(
            BrokenSink,
            futures_util::stream::pending::<Inbound>(),
            joined(),
            schedule(),
        ));
        assert_eq!(finished(session).await, SessionEnd::WriteFailed);
    }

    #[tokio::test]
    async fn frames_are_acknowledged_in_order() {
        let (out_tx, mut out_rx) = mpsc::unbounded_channel();
        let (in_tx, in_rx) = mpsc::unbounded_channel();
        let session = tokio::spawn(drive_session(
            recording_sink(out_tx),
            scripted_stream(in_rx),
            joined(),
            schedule(),
        ));

        for payload in ["one", "two"] {
            let _ = in_tx.send(Ok(Message::text(payload)));
        }
        let _ = in_tx.send(Ok(Message::Ping(Vec::new().into())));
        let _ = in_tx.send(Ok(Message::Binary(b"three".to_vec().into())));

        let mut acks = Vec::new();
        while acks.len() < 3 {
            let frame = next_frame(&mut out_rx).await;
            if let Ok(ack) = serde_json::from_str::<AckMessage>(&frame) {
                acks.push(ack.msg);
            }
        }
        assert_eq!(acks, ["one", "two", "three"]);

        let _ = in_tx.send(Ok(Message::Close(None)));
        assert_eq!(finished(session).await, SessionEnd::PeerClosed);
    }
}
