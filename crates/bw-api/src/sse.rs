//! Progress delivery over Server-Sent Events.
//!
//! A [`ProgressStream`] is the workflow's only view of the client. It either
//! feeds an SSE response through a bounded channel, or, when the client
//! cannot consume an event stream, buffers every event for a single JSON
//! response at the end.

use std::convert::Infallible;

use axum::http::{header, HeaderMap};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures_util::stream::{self, Stream};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::debug;

use bw_models::ProgressEvent;

use crate::metrics;

/// Events queued between the workflow and the response body.
pub const EVENT_BUFFER: usize = 32;

const EVENT_STREAM_MIME: &str = "text/event-stream";

/// Errors raised when opening a stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    #[error("transport does not support streamed delivery")]
    UnsupportedTransport,
}

pub type StreamResult<T> = Result<T, StreamError>;

enum Sink {
    Channel(mpsc::Sender<ProgressEvent>),
    Buffered(Vec<ProgressEvent>),
}

/// Ordered, write-only progress channel for one request.
pub struct ProgressStream {
    sink: Sink,
    closed: bool,
}

/// Read side of a streaming [`ProgressStream`].
pub type EventReceiver = mpsc::Receiver<ProgressEvent>;

impl ProgressStream {
    /// Open a streaming channel for a request with the given headers.
    ///
    /// Fails with [`StreamError::UnsupportedTransport`] when the client's
    /// `Accept` header rules out `text/event-stream`.
    pub fn open(headers: &HeaderMap) -> StreamResult<(Self, EventReceiver)> {
        if !accepts_event_stream(headers) {
            return Err(StreamError::UnsupportedTransport);
        }

        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let stream = Self {
            sink: Sink::Channel(tx),
            closed: false,
        };
        Ok((stream, rx))
    }

    /// Collect events in memory for one non-streamed response.
    pub fn buffered() -> Self {
        Self {
            sink: Sink::Buffered(Vec::new()),
            closed: false,
        }
    }

    pub fn is_streaming(&self) -> bool {
        matches!(self.sink, Sink::Channel(_))
    }

    /// Whether the client side has gone away.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Deliver one event.
    ///
    /// Never fails: once the receiving side is gone the stream is marked
    /// closed and this and every later call is a no-op.
    pub async fn emit(&mut self, event: ProgressEvent) {
        if self.closed {
            return;
        }

        let kind = event.kind();
        match &mut self.sink {
            Sink::Channel(tx) => {
                if tx.send(event).await.is_err() {
                    debug!("Progress stream receiver dropped, discarding further events");
                    self.closed = true;
                    return;
                }
            }
            Sink::Buffered(events) => events.push(event),
        }

        metrics::record_event(kind);
    }

    /// Finish the stream. Returns the buffered events, if any.
    pub fn close(self) -> Vec<ProgressEvent> {
        match self.sink {
            Sink::Channel(_) => Vec::new(),
            Sink::Buffered(events) => events,
        }
    }
}

/// `Accept` absent, `*/*`, `text/*` or `text/event-stream`.
fn accepts_event_stream(headers: &HeaderMap) -> bool {
    let values: Vec<&str> = headers
        .get_all(header::ACCEPT)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect();

    if values.is_empty() {
        return true;
    }

    values
        .iter()
        .flat_map(|v| v.split(','))
        .filter_map(|range| {
            let mut parts = range.split(';');
            let mime = parts.next()?.trim().to_ascii_lowercase();
            let rejected = parts.any(|p| {
                p.trim()
                    .strip_prefix("q=")
                    .and_then(|q| q.trim().parse::<f32>().ok())
                    == Some(0.0)
            });
            (!rejected).then_some(mime)
        })
        .any(|mime| mime == EVENT_STREAM_MIME || mime == "*/*" || mime == "text/*")
}

/// Encode one progress event as an SSE frame.
///
/// Carriage returns cannot be framed and are stripped; newlines become
/// continuation `data:` lines.
pub fn to_sse_event(event: &ProgressEvent) -> Event {
    Event::default()
        .event(event.kind().as_str())
        .data(event.data().replace('\r', ""))
}

/// Tracks the active-stream gauge and cancels the workflow when dropped.
struct StreamGuard {
    _cancel: DropGuard,
}

impl StreamGuard {
    fn new(ctx: CancellationToken) -> Self {
        metrics::record_stream_opened();
        Self {
            _cancel: ctx.drop_guard(),
        }
    }
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        metrics::record_stream_closed();
    }
}

/// Turn the read side into an SSE response body.
///
/// Dropping the body, because the client disconnected or the workflow
/// finished, cancels `ctx`.
pub fn sse_response(
    rx: EventReceiver,
    ctx: CancellationToken,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let guard = StreamGuard::new(ctx);
    let events = stream::unfold((rx, guard), |(mut rx, guard)| async move {
        let event = rx.recv().await?;
        Some((Ok(to_sse_event(&event)), (rx, guard)))
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}
