use std::fmt;
use std::io::{self, ErrorKind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use bytes::{Buf, BytesMut};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::time::timeout;

use crate::http::parser::{parse_head, ParseError, RequestHead};
use crate::http::request::Request;

/// Upper bound on a single read from the socket.
pub const MAX_CHUNK_SIZE: usize = 64 * 1024;

/// How long one readiness wait may block before the cancellation flag is
/// looked at again.
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_millis(200);

/// Why [`Receiver::get_request`] produced no request.
#[derive(Debug)]
pub enum ReceiveError {
    /// The peer shut the connection down in an orderly way.
    Closed,
    /// [`Receiver::close`] was called while waiting for data.
    Cancelled,
    /// The bytes received do not form a request.
    Malformed(ParseError),
    /// The transport failed.
    Io(io::Error),
}

impl fmt::Display for ReceiveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReceiveError::Closed => f.write_str("connection closed by peer"),
            ReceiveError::Cancelled => f.write_str("receive cancelled"),
            ReceiveError::Malformed(e) => write!(f, "malformed request: {e}"),
            ReceiveError::Io(e) => write!(f, "receive failed: {e}"),
        }
    }
}

impl std::error::Error for ReceiveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReceiveError::Malformed(e) => Some(e),
            ReceiveError::Io(e) => Some(e),
            _ => None,
        }
    }
}

enum Phase {
    WaitingHeaders,
    ReadingBody { head: RequestHead, body_len: usize },
    Closed,
    Failed,
    Cancelled,
}

struct ReceiveState {
    /// Bytes received but not yet part of a returned request.
    pending: BytesMut,
    chunk: Vec<u8>,
    phase: Phase,
}

impl ReceiveState {
    /// Frames as much of `pending` as possible.
    ///
    /// `Ok(None)` means more bytes are needed.
    fn advance(&mut self) -> Result<Option<Request>, ParseError> {
        if matches!(self.phase, Phase::WaitingHeaders) {
            let (head, consumed) = match parse_head(&self.pending) {
                Ok(parsed) => parsed,
                Err(ParseError::Incomplete) => return Ok(None),
                Err(e) => return Err(e),
            };
            let body_len = head.body_length()?;
            self.pending.advance(consumed);
            self.phase = Phase::ReadingBody { head, body_len };
        }

        let body_len = match &self.phase {
            Phase::ReadingBody { body_len, .. } => *body_len,
            _ => return Ok(None),
        };
        if self.pending.len() < body_len {
            return Ok(None);
        }

        match std::mem::replace(&mut self.phase, Phase::WaitingHeaders) {
            Phase::ReadingBody { head, .. } => {
                let body = self.pending.split_to(body_len).to_vec();
                Ok(Some(head.into_request(body)))
            }
            _ => Ok(None),
        }
    }
}

/// Frames requests off one connection.
///
/// Waiting is readiness-based and bounded by a poll timeout, so a call
/// blocked on an idle peer notices [`Receiver::close`] within one timeout.
/// Bytes beyond the end of a request are kept for the next call.
pub struct Receiver {
    stream: Arc<TcpStream>,
    cancelled: AtomicBool,
    poll_timeout: Duration,
    state: Mutex<ReceiveState>,
}

impl Receiver {
    pub fn new(stream: Arc<TcpStream>) -> Self {
        Self::with_poll_timeout(stream, DEFAULT_POLL_TIMEOUT)
    }

    pub fn with_poll_timeout(stream: Arc<TcpStream>, poll_timeout: Duration) -> Self {
        Self {
            stream,
            cancelled: AtomicBool::new(false),
            poll_timeout,
            state: Mutex::new(ReceiveState {
                pending: BytesMut::with_capacity(MAX_CHUNK_SIZE),
                chunk: vec![0; MAX_CHUNK_SIZE],
                phase: Phase::WaitingHeaders,
            }),
        }
    }

    /// Requests cancellation of any current or future [`Receiver::get_request`].
    ///
    /// Only sets a flag; the transport stays open until the connection is dropped.
    pub fn close(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Waits for and returns the next complete request.
    ///
    /// After `Closed`, `Cancelled` or a failure, later calls fail immediately
    /// with the same kind of error.
    pub async fn get_request(&self) -> Result<Request, ReceiveError> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;

        match state.phase {
            Phase::Closed => return Err(ReceiveError::Closed),
            Phase::Cancelled => return Err(ReceiveError::Cancelled),
            Phase::Failed => {
                return Err(ReceiveError::Io(io::Error::new(
                    ErrorKind::NotConnected,
                    "receiver already failed",
                )));
            }
            Phase::WaitingHeaders | Phase::ReadingBody { .. } => {}
        }

        loop {
            // Leftover bytes may already hold a whole request
            match state.advance() {
                Ok(Some(request)) => {
                    tracing::trace!(
                        method = request.method().as_str(),
                        path = request.path(),
                        leftover = state.pending.len(),
                        "Request framed"
                    );
                    return Ok(request);
                }
                Ok(None) => {}
                Err(e) => {
                    state.phase = Phase::Failed;
                    tracing::debug!(error = %e, "Malformed request");
                    return Err(ReceiveError::Malformed(e));
                }
            }

            match timeout(self.poll_timeout, self.stream.readable()).await {
                Err(_elapsed) => {
                    if self.is_cancelled() {
                        state.phase = Phase::Cancelled;
                        tracing::debug!("Receive cancelled");
                        return Err(ReceiveError::Cancelled);
                    }
                    continue;
                }
                Ok(Err(e)) => {
                    state.phase = Phase::Failed;
                    tracing::warn!(error = %e, "Readiness wait failed");
                    return Err(ReceiveError::Io(e));
                }
                Ok(Ok(())) => {}
            }

            // A peer that keeps trickling bytes never lets a wait time out
            if self.is_cancelled() {
                state.phase = Phase::Cancelled;
                tracing::debug!("Receive cancelled");
                return Err(ReceiveError::Cancelled);
            }

            match self.stream.try_read(&mut state.chunk) {
                Ok(0) => {
                    state.phase = Phase::Closed;
                    return Err(ReceiveError::Closed);
                }
                Ok(n) => {
                    state.pending.extend_from_slice(&state.chunk[..n]);
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => continue,
                Err(e) => {
                    state.phase = Phase::Failed;
                    tracing::warn!(error = %e, "Read failed");
                    return Err(ReceiveError::Io(e));
                }
            }
        }
    }
}
