//! TCP session driving one request/response round trip at a time.
//!
//! Every call opens a fresh connection, sends the encoded request, reads the
//! response and drops the connection. Transport faults are retried with a
//! fixed backoff; a malformed response is not.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::{Mutex, MutexGuard, watch};
use tracing::{debug, error, info, warn};

use seco_protocol::{EncodedRequest, RequestType, Response, encode_request};

use crate::check::{CheckResponses, check};
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Maximum response size (64 MB).
pub const MAX_RESPONSE_SIZE: usize = 64 * 1024 * 1024;

const READ_CHUNK: usize = 8 * 1024;

/// Where a session is in its current call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Connecting,
    AwaitingResponse,
    Completed,
    Faulted,
}

/// Connection and retry settings for a [`Session`].
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// `host:port` of the catalog server.
    pub addr: String,
    /// Identifier echoed into every request header.
    pub client_id: String,
    /// Attempts per call, including the first.
    pub max_attempts: u32,
    /// Delay between attempts.
    pub backoff: Duration,
    /// Bound on establishing the connection.
    pub connect_timeout: Duration,
    /// Bound on sending the request, on waiting for the first response bytes
    /// and on completing an unterminated line.
    pub response_timeout: Duration,
    /// Silence after a complete line at which a still-open connection is taken
    /// as fully read.
    pub idle_timeout: Duration,
}

impl SessionOptions {
    pub fn new(addr: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            client_id: client_id.into(),
            max_attempts: 3,
            backoff: Duration::from_secs(2),
            connect_timeout: Duration::from_secs(5),
            response_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_millis(250),
        }
    }

    /// Builder: set the retry policy.
    #[must_use]
    pub fn with_retry(mut self, max_attempts: u32, backoff: Duration) -> Self {
        self.max_attempts = max_attempts.max(1);
        self.backoff = backoff;
        self
    }

    /// Builder: set connect and response timeouts.
    #[must_use]
    pub fn with_timeouts(mut self, connect: Duration, response: Duration) -> Self {
        self.connect_timeout = connect;
        self.response_timeout = response;
        self
    }

    /// Builder: set the idle timeout.
    #[must_use]
    pub fn with_idle_timeout(mut self, idle: Duration) -> Self {
        self.idle_timeout = idle;
        self
    }
}

impl From<&ClientConfig> for SessionOptions {
    fn from(config: &ClientConfig) -> Self {
        Self::new(config.server.addr(), config.server.client_id.clone())
            .with_retry(config.retry.max_attempts, config.retry.backoff())
            .with_timeouts(
                Duration::from_secs(config.server.connect_timeout),
                Duration::from_secs(config.server.response_timeout),
            )
            .with_idle_timeout(config.server.idle_timeout())
    }
}

/// A client session against one catalog server.
///
/// Calls are serialized: a second [`Session::execute`] waits until the first
/// has settled. Share a session between tasks with `Arc`.
pub struct Session {
    options: SessionOptions,
    call_lock: Mutex<()>,
    retries: AtomicU32,
    phase: watch::Sender<SessionPhase>,
}

/// Holds the call lock; resets per-call state however the call ends.
struct ActiveCall<'a> {
    session: &'a Session,
    _lock: MutexGuard<'a, ()>,
}

impl Drop for ActiveCall<'_> {
    fn drop(&mut self) {
        self.session.retries.store(0, Ordering::SeqCst);
        self.session.set_phase(SessionPhase::Idle);
    }
}

impl Session {
    pub fn new(options: SessionOptions) -> Self {
        let (phase, _) = watch::channel(SessionPhase::Idle);
        Self {
            options,
            call_lock: Mutex::new(()),
            retries: AtomicU32::new(0),
            phase,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(SessionOptions::from(config))
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Transport faults seen so far by the call in progress; 0 between calls.
    pub fn retry_count(&self) -> u32 {
        self.retries.load(Ordering::SeqCst)
    }

    pub fn phase(&self) -> SessionPhase {
        *self.phase.borrow()
    }

    /// Receiver that observes phase transitions.
    pub fn subscribe(&self) -> watch::Receiver<SessionPhase> {
        self.phase.subscribe()
    }

    fn set_phase(&self, phase: SessionPhase) {
        self.phase.send_replace(phase);
    }

    /// Sends one request and waits for its response.
    ///
    /// # Errors
    ///
    /// - [`ClientError::RetriesExhausted`] once every attempt hit a transport
    ///   fault.
    /// - [`ClientError::MalformedResponse`] if the status line is not an
    ///   integer; not retried.
    /// - [`ClientError::ResponseTooLarge`] if the response exceeds
    ///   [`MAX_RESPONSE_SIZE`]; not retried.
    pub async fn execute<S: AsRef<str>>(
        &self,
        request_type: RequestType,
        data: &[S],
    ) -> ClientResult<Response> {
        let _call = ActiveCall {
            session: self,
            _lock: self.call_lock.lock().await,
        };

        info!(
            request_type = %request_type,
            items = data.len(),
            addr = %self.options.addr,
            "fetching"
        );

        loop {
            let request = encode_request(request_type, &self.options.client_id, data);

            match self.attempt(&request).await {
                Ok(response) => {
                    self.set_phase(SessionPhase::Completed);
                    info!(
                        request_type = %request_type,
                        status = response.status_code,
                        records = response.records.len(),
                        "round trip complete"
                    );
                    return Ok(response);
                }
                Err(err) if err.is_transport() => {
                    self.set_phase(SessionPhase::Faulted);
                    let attempts = self.retries.fetch_add(1, Ordering::SeqCst) + 1;

                    if attempts < self.options.max_attempts {
                        warn!(
                            request_type = %request_type,
                            attempt = attempts,
                            error = %err,
                            backoff_ms = self.options.backoff.as_millis() as u64,
                            "transport fault, retrying"
                        );
                        tokio::time::sleep(self.options.backoff).await;
                        continue;
                    }

                    error!(
                        request_type = %request_type,
                        attempts,
                        error = %err,
                        "giving up"
                    );
                    return Err(ClientError::RetriesExhausted {
                        attempts,
                        last: Box::new(err),
                    });
                }
                Err(err) => {
                    self.set_phase(SessionPhase::Faulted);
                    error!(request_type = %request_type, error = %err, "request failed");
                    return Err(err);
                }
            }
        }
    }

    /// Runs the method → author → project check workflow.
    pub async fn check<S: AsRef<str>>(&self, hashes: &[S]) -> ClientResult<CheckResponses> {
        check(self, hashes).await
    }

    /// One attempt: connect, send, receive, decode. The connection is dropped
    /// on return whatever the outcome.
    async fn attempt(&self, request: &EncodedRequest) -> ClientResult<Response> {
        self.set_phase(SessionPhase::Connecting);

        let addr = &self.options.addr;
        debug!(addr = %addr, "connecting");

        let mut stream =
            tokio::time::timeout(self.options.connect_timeout, TcpStream::connect(addr))
                .await
                .map_err(|_| ClientError::timeout("connecting"))?
                .map_err(|source| ClientError::Connect {
                    addr: addr.clone(),
                    source,
                })?;

        tokio::time::timeout(self.options.response_timeout, async {
            stream.write_all(request.header.as_bytes()).await?;
            if !request.body.is_empty() {
                stream.write_all(request.body.as_bytes()).await?;
            }
            stream.flush().await
        })
        .await
        .map_err(|_| ClientError::timeout("sending request"))??;

        self.set_phase(SessionPhase::AwaitingResponse);
        debug!(bytes = request.header.len() + request.body_len(), "request sent");

        let payload = self.read_response(&mut stream).await?;
        drop(stream);

        let text = String::from_utf8_lossy(&payload);
        Ok(Response::from_payload(request.request_type, &text)?)
    }

    /// Reads until EOF, or until the server goes quiet after sending data.
    ///
    /// Silence only ends the response once the payload ends on a line
    /// boundary. An unterminated last line keeps the read going, bounded by
    /// the response timeout.
    async fn read_response(&self, stream: &mut TcpStream) -> ClientResult<Vec<u8>> {
        let mut chunk = vec![0u8; READ_CHUNK];

        let n = tokio::time::timeout(self.options.response_timeout, stream.read(&mut chunk))
            .await
            .map_err(|_| ClientError::timeout("waiting for response"))??;
        if n == 0 {
            return Err(ClientError::ConnectionClosed);
        }

        let mut payload = chunk[..n].to_vec();
        loop {
            let line_complete = payload.ends_with(b"\n");
            let wait = if line_complete {
                self.options.idle_timeout
            } else {
                self.options.response_timeout
            };

            match tokio::time::timeout(wait, stream.read(&mut chunk)).await {
                Err(_) if line_complete => {
                    debug!(bytes = payload.len(), "server idle, treating response as complete");
                    break;
                }
                Err(_) => {
                    return Err(ClientError::timeout("reading an unterminated response line"));
                }
                Ok(Ok(0)) => break,
                Ok(Ok(n)) => payload.extend_from_slice(&chunk[..n]),
                Ok(Err(e)) => return Err(e.into()),
            }

            if payload.len() > MAX_RESPONSE_SIZE {
                return Err(ClientError::ResponseTooLarge {
                    max: MAX_RESPONSE_SIZE,
                });
            }
        }

        debug!(bytes = payload.len(), "response received");
        Ok(payload)
    }
}
