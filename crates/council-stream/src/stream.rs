use std::collections::VecDeque;

use futures::StreamExt as _;
use futures::stream::{self, BoxStream};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::decoder::EventDecoder;
use crate::errors::TransportError;
use crate::event::Event;
use crate::session::{SessionBuilder, SessionState};
use crate::transport::ByteStream;

/// Decodes a byte stream into events, lazily.
///
/// A chunk is read only when no decoded event is waiting. After an `error`
/// event the byte stream is dropped and nothing more is read. A read failure
/// ends the stream with that error.
pub fn event_stream(
    bytes: ByteStream,
) -> impl futures::Stream<Item = Result<Event, TransportError>> + Send {
    struct State {
        bytes: Option<ByteStream>,
        decoder: EventDecoder,
        pending: VecDeque<Event>,
    }

    stream::try_unfold(
        State {
            bytes: Some(bytes),
            decoder: EventDecoder::new(),
            pending: VecDeque::new(),
        },
        |mut state| async move {
            loop {
                if let Some(event) = state.pending.pop_front() {
                    return Ok(Some((event, state)));
                }
                let Some(bytes) = state.bytes.as_mut() else {
                    return Ok(None);
                };

                match bytes.next().await {
                    Some(Ok(chunk)) => {
                        state.pending.extend(state.decoder.push_chunk(&chunk));
                        if state.decoder.is_halted() {
                            state.bytes = None;
                        }
                    }
                    Some(Err(err)) => {
                        state.bytes = None;
                        return Err(err);
                    }
                    None => {
                        state.bytes = None;
                        let malformed = state.decoder.malformed_frames();
                        let dropped = std::mem::take(&mut state.decoder).finish();
                        debug!(malformed_frames = malformed, dropped_bytes = dropped, "byte stream ended");
                    }
                }
            }
        },
    )
}

/// Pull-based session: each `next_event` call decodes and applies at most one
/// event, and `session()` can be read between calls.
///
/// The session reaches `Done` when the byte stream ends cleanly, or `Error`
/// on an error event or a read failure. Transport failures are reported as one
/// synthetic `Event::Error`.
pub struct SessionStream {
    events: Option<BoxStream<'static, Result<Event, TransportError>>>,
    builder: SessionBuilder,
}

impl SessionStream {
    pub fn from_bytes(bytes: ByteStream) -> Self {
        Self {
            events: Some(event_stream(bytes).boxed()),
            builder: SessionBuilder::new(),
        }
    }

    /// A session that failed before any byte arrived.
    ///
    /// The session is `Error` immediately; `next_event` yields the failure once
    /// as an `Event::Error`.
    pub fn failed(err: TransportError) -> Self {
        let message = err.to_string();
        let mut builder = SessionBuilder::new();
        builder.fail(message.clone());
        Self {
            events: Some(stream::iter([Ok::<_, TransportError>(Event::Error { message })]).boxed()),
            builder,
        }
    }

    /// Current state; never blocks.
    pub fn session(&self) -> &SessionState {
        self.builder.state()
    }

    /// Waits for the next event and applies it to the session.
    ///
    /// Returns `None` once the session is terminal and every event has been
    /// handed out.
    pub async fn next_event(&mut self) -> Option<Event> {
        let events = self.events.as_mut()?;
        let event = match events.next().await {
            Some(Ok(event)) => event,
            Some(Err(err)) => Event::Error {
                message: err.to_string(),
            },
            None => {
                self.events = None;
                self.builder.complete();
                return None;
            }
        };

        self.builder.apply(event.clone());
        if self.builder.state().is_terminal() {
            // release the transport as soon as the session is over
            self.events = None;
        }
        Some(event)
    }

    /// Drains the remaining events and returns the final state.
    pub async fn finish(mut self) -> SessionState {
        while self.next_event().await.is_some() {}
        self.builder.into_state()
    }

    /// Drives the session on a tokio task and publishes its progress after
    /// every event, so readers can project while the stream is still running.
    ///
    /// The published state is updated in place; each node is copied into it
    /// once, however many events follow.
    pub fn spawn(self) -> LiveSession {
        let (tx, rx) = watch::channel(self.session().clone());
        let task = tokio::spawn(async move {
            let mut stream = self;
            while stream.next_event().await.is_some() {
                tx.send_modify(|published| published.catch_up(stream.session()));
            }
            let state = stream.builder.into_state();
            tx.send_modify(|published| published.catch_up(&state));
            state
        });
        LiveSession { rx, task }
    }
}

/// Handle to a session driven by [`SessionStream::spawn`].
pub struct LiveSession {
    rx: watch::Receiver<SessionState>,
    task: JoinHandle<SessionState>,
}

impl LiveSession {
    /// Copy of the latest published state.
    pub fn snapshot(&self) -> SessionState {
        self.rx.borrow().clone()
    }

    /// Runs `f` against the latest published state without copying it.
    ///
    /// The driver cannot publish while `f` runs, so keep it short.
    pub fn view<R>(&self, f: impl FnOnce(&SessionState) -> R) -> R {
        f(&*self.rx.borrow())
    }

    /// Waits for a new snapshot. Returns `false` once the driver has finished
    /// and the last snapshot has been seen.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }

    /// Stops reading; the transport is released when the task is dropped.
    pub fn abort(&self) {
        self.task.abort();
    }

    /// Waits for the driver to finish and returns the final state.
    ///
    /// If the task was aborted, the last published snapshot is returned.
    pub async fn wait(self) -> SessionState {
        match self.task.await {
            Ok(state) => state,
            Err(err) => {
                if !err.is_cancelled() {
                    error!(error = %err, "session driver task failed");
                }
                self.rx.borrow().clone()
            }
        }
    }
}
