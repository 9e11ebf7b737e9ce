//! One correlated control channel to a single target.
//!
//! Requests carry ids from a per-session counter starting at 1. A background
//! reader owns the read half and resolves pending requests by id; anything
//! else on the wire (events, stale ids) is dropped. When the session closes
//! or the transport goes away, every request still pending fails with
//! [`TetherError::SessionClosed`].

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::types::{Command, Method};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tether_common::TetherError;
use tether_common::protocol::Target;
use tokio::net::TcpStream;
use tokio::sync::{Mutex, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Upper bound for flushing the close frame.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(2);

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type Resolver = oneshot::Sender<Result<Value, TetherError>>;
type PendingTable = Arc<Mutex<HashMap<u64, Resolver>>>;

#[derive(Serialize)]
struct RequestEnvelope<'a> {
    id: u64,
    method: &'a str,
    params: &'a Value,
}

#[derive(Debug, Deserialize)]
struct RawFrame {
    id: Option<u64>,
    result: Option<Value>,
    error: Option<RemoteErrorBody>,
    method: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RemoteErrorBody {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

/// A decoded inbound frame.
#[derive(Debug)]
pub enum Incoming {
    Response {
        id: u64,
        outcome: Result<Value, TetherError>,
    },
    Event {
        method: String,
    },
    Unrecognized,
}

/// Classify one text frame from the control channel.
pub fn parse_incoming(text: &str) -> Incoming {
    let frame: RawFrame = match serde_json::from_str(text) {
        Ok(frame) => frame,
        Err(_) => return Incoming::Unrecognized,
    };
    match (frame.id, frame.method) {
        (Some(id), _) => {
            let outcome = match frame.error {
                Some(err) => Err(TetherError::Remote {
                    code: err.code,
                    message: err.message,
                }),
                None => Ok(frame.result.unwrap_or(Value::Null)),
            };
            Incoming::Response { id, outcome }
        }
        (None, Some(method)) => Incoming::Event { method },
        (None, None) => Incoming::Unrecognized,
    }
}

pub struct Session {
    target_id: String,
    next_id: AtomicU64,
    pending: PendingTable,
    writer: Mutex<WsSink>,
    request_timeout: Duration,
    /// Set once no new requests may be registered (closed locally or remotely).
    closed: Arc<AtomicBool>,
    close_requested: AtomicBool,
    reader: JoinHandle<()>,
}

impl Session {
    /// Connect to the target's advertised control address.
    pub async fn open(target: &Target, request_timeout: Duration) -> Result<Self, TetherError> {
        let url = target
            .web_socket_debugger_url
            .clone()
            .ok_or_else(|| TetherError::NoControlAddress {
                target_id: target.id.clone(),
            })?;

        let (stream, _) = tokio_tungstenite::connect_async(url.as_str())
            .await
            .map_err(|e| TetherError::ConnectionFailed {
                url: url.clone(),
                reason: e.to_string(),
            })?;
        let (writer, reader) = stream.split();

        let pending: PendingTable = Arc::new(Mutex::new(HashMap::new()));
        let closed = Arc::new(AtomicBool::new(false));
        let reader = tokio::spawn(read_loop(reader, Arc::clone(&pending), Arc::clone(&closed)));

        info!(target = %target.id, url = %url, "session opened");

        Ok(Self {
            target_id: target.id.clone(),
            next_id: AtomicU64::new(1),
            pending,
            writer: Mutex::new(writer),
            request_timeout,
            closed,
            close_requested: AtomicBool::new(false),
            reader,
        })
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub async fn pending_count(&self) -> usize {
        self.pending.lock().await.len()
    }

    /// Issue one correlated request and wait for its response.
    ///
    /// Several calls may be in flight at once; each resolves with the response
    /// carrying its own id, in whatever order responses arrive.
    pub async fn send(&self, method: &str, params: Value) -> Result<Value, TetherError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let frame = serde_json::to_string(&RequestEnvelope {
            id,
            method,
            params: &params,
        })?;

        let (tx, rx) = oneshot::channel();
        {
            let mut pending = self.pending.lock().await;
            if self.closed.load(Ordering::SeqCst) {
                return Err(TetherError::SessionClosed);
            }
            pending.insert(id, tx);
        }

        // One deadline covers both the write and the wait for the response.
        let deadline = Instant::now() + self.request_timeout;

        debug!(id, method, "sending request");
        let sent = tokio::time::timeout_at(deadline, async {
            let mut writer = self.writer.lock().await;
            writer.send(Message::Text(frame)).await
        })
        .await;
        match sent {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                self.pending.lock().await.remove(&id);
                return Err(TetherError::protocol(format!(
                    "failed to send {}: {}",
                    method, e
                )));
            }
            Err(_) => return Err(self.expire(id, method).await),
        }

        match tokio::time::timeout_at(deadline, rx).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(_)) => Err(TetherError::SessionClosed),
            Err(_) => Err(self.expire(id, method).await),
        }
    }

    async fn expire(&self, id: u64, method: &str) -> TetherError {
        self.pending.lock().await.remove(&id);
        warn!(id, method, timeout = ?self.request_timeout, "request timed out");
        TetherError::Timeout {
            method: method.to_string(),
            duration: self.request_timeout,
        }
    }

    /// Send a typed protocol command.
    pub async fn execute<C: Command>(&self, command: C) -> Result<Value, TetherError> {
        let method = command.identifier();
        let params = serde_json::to_value(&command)?;
        self.send(&method, params).await
    }

    /// Evaluate `expression` in the page and return its by-value result.
    ///
    /// A snippet returning `undefined` yields `Value::Null`.
    pub async fn evaluate(&self, expression: &str) -> Result<Value, TetherError> {
        let params = EvaluateParams::builder()
            .expression(expression)
            .return_by_value(true)
            .await_promise(true)
            .build()
            .map_err(TetherError::protocol)?;
        let reply = self.execute(params).await?;

        if let Some(details) = reply.get("exceptionDetails") {
            let message = details
                .pointer("/exception/description")
                .and_then(Value::as_str)
                .or_else(|| details.get("text").and_then(Value::as_str))
                .unwrap_or("uncaught exception")
                .to_string();
            return Err(TetherError::ScriptException { message });
        }

        Ok(reply.pointer("/result/value").cloned().unwrap_or(Value::Null))
    }

    /// Close the transport and fail whatever is still pending. Idempotent.
    pub async fn close(&self) {
        if self.close_requested.swap(true, Ordering::SeqCst) {
            return;
        }
        {
            // Hold the table lock so no request registers between the flag and the drain.
            let _pending = self.pending.lock().await;
            self.closed.store(true, Ordering::SeqCst);
        }

        // A stalled write may still hold the writer; the bound covers the lock too.
        let flushed = tokio::time::timeout(CLOSE_TIMEOUT, async {
            let mut writer = self.writer.lock().await;
            writer.close().await
        })
        .await;
        match flushed {
            Ok(Ok(())) => {}
            Ok(Err(e)) => debug!(error = %e, "close frame not delivered"),
            Err(_) => debug!("close frame flush timed out"),
        }

        self.reader.abort();
        let failed = fail_pending(&self.pending).await;
        info!(target = %self.target_id, failed, "session closed");
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

async fn read_loop(mut reader: SplitStream<WsStream>, pending: PendingTable, closed: Arc<AtomicBool>) {
    while let Some(frame) = reader.next().await {
        let text = match frame {
            Ok(Message::Text(text)) => text,
            Ok(Message::Binary(bytes)) => match String::from_utf8(bytes) {
                Ok(text) => text,
                Err(_) => continue,
            },
            Ok(Message::Close(_)) => {
                debug!("control channel closed by remote");
                break;
            }
            Ok(_) => continue,
            Err(e) => {
                warn!(error = %e, "control channel read error");
                break;
            }
        };

        match parse_incoming(&text) {
            Incoming::Response { id, outcome } => {
                let resolver = pending.lock().await.remove(&id);
                match resolver {
                    Some(tx) => {
                        let _ = tx.send(outcome);
                    }
                    None => debug!(id, "response for unknown request id"),
                }
            }
            Incoming::Event { method } => debug!(method = %method, "ignoring event"),
            Incoming::Unrecognized => debug!("ignoring unrecognized frame"),
        }
    }

    {
        let _guard = pending.lock().await;
        closed.store(true, Ordering::SeqCst);
    }
    fail_pending(&pending).await;
}

async fn fail_pending(pending: &PendingTable) -> usize {
    let mut table = pending.lock().await;
    let count = table.len();
    for (_, tx) in table.drain() {
        let _ = tx.send(Err(TetherError::SessionClosed));
    }
    count
}
