use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite, BufReader, BufWriter};
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tracing::warn;

use crate::rpc::codec::{self, FrameError};
use crate::rpc::message::{DecodeError, Id, Message, ResponseMessage};

/// Inbound frames are decoded by a dedicated reader task and handed to the
/// dispatch side through a bounded channel; a full channel suspends the
/// reader until the dispatcher catches up.
const INBOUND_CHANNEL_CAPACITY: usize = 16;

type SharedWriter = Arc<Mutex<Box<dyn AsyncWrite + Send + Unpin>>>;

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("must not respond to a notification")]
    NotARequest,

    #[error("request already responded to")]
    AlreadyResponded,

    #[error("connection is closed")]
    Closed,
}

impl ConnectionError {
    /// True when the error means the remote end went away rather than the
    /// stream carrying garbage.
    pub fn is_disconnect(&self) -> bool {
        match self {
            ConnectionError::Frame(FrameError::Io(e)) => matches!(
                e.kind(),
                std::io::ErrorKind::BrokenPipe
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
            ),
            ConnectionError::Closed => true,
            _ => false,
        }
    }
}

/// One inbound message paired with the capability to send exactly one
/// response through the shared writer.
pub struct Request {
    message: Message,
    writer: SharedWriter,
    responded: bool,
}

impl std::fmt::Debug for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Request")
            .field("message", &self.message)
            .field("responded", &self.responded)
            .finish_non_exhaustive()
    }
}

impl Request {
    fn new(message: Message, writer: SharedWriter) -> Self {
        Self {
            message,
            writer,
            responded: false,
        }
    }

    pub fn message(&self) -> &Message {
        &self.message
    }

    pub fn method(&self) -> &str {
        self.message.method().unwrap_or_default()
    }

    pub fn params(&self) -> Option<&Value> {
        self.message.params()
    }

    pub fn is_request(&self) -> bool {
        matches!(self.message, Message::Request(_))
    }

    pub async fn respond<T: Serialize>(&mut self, result: T) -> Result<(), ConnectionError> {
        let id = self.take_id()?;
        let result = serde_json::to_value(result).map_err(DecodeError::Json)?;
        self.write_response(ResponseMessage::success(id, result))
            .await
    }

    pub async fn respond_error(
        &mut self,
        code: i32,
        message: impl Into<String>,
        data: Option<Value>,
    ) -> Result<(), ConnectionError> {
        let id = self.take_id()?;
        self.write_response(ResponseMessage::failure(id, code, message, data))
            .await
    }

    fn take_id(&mut self) -> Result<Id, ConnectionError> {
        let Message::Request(request) = &self.message else {
            return Err(ConnectionError::NotARequest);
        };
        if self.responded {
            return Err(ConnectionError::AlreadyResponded);
        }
        self.responded = true;
        Ok(request.id.clone())
    }

    async fn write_response(&self, response: ResponseMessage) -> Result<(), ConnectionError> {
        let body = serde_json::to_vec(&response).map_err(DecodeError::Json)?;
        let mut writer = self.writer.lock().await;
        codec::write_frame(&mut *writer, &body).await?;
        Ok(())
    }
}

/// Wraps a readable/writable stream pair and yields inbound requests one at
/// a time, in arrival order.
pub struct Connection {
    inbound: mpsc::Receiver<Result<Message, ConnectionError>>,
    writer: SharedWriter,
    reader_task: JoinHandle<()>,
    closed: bool,
}

impl Connection {
    pub fn new<R, W>(reader: R, writer: W) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let (tx, rx) = mpsc::channel(INBOUND_CHANNEL_CAPACITY);
        let reader_task = tokio::spawn(read_loop(BufReader::new(reader), tx));
        Self {
            inbound: rx,
            writer: Arc::new(Mutex::new(Box::new(BufWriter::new(writer)))),
            reader_task,
            closed: false,
        }
    }

    /// Next inbound request or notification. `None` means the remote side
    /// closed the stream cleanly.
    pub async fn next_request(&mut self) -> Option<Result<Request, ConnectionError>> {
        if self.closed {
            return Some(Err(ConnectionError::Closed));
        }
        match self.inbound.recv().await? {
            Ok(message) => Some(Ok(Request::new(message, self.writer.clone()))),
            Err(e) => Some(Err(e)),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Closes both halves. Reading after close is an error.
    pub async fn close(&mut self) -> Result<(), ConnectionError> {
        if self.closed {
            return Err(ConnectionError::Closed);
        }
        self.closed = true;
        self.reader_task.abort();
        use tokio::io::AsyncWriteExt;
        let _ = self.writer.lock().await.shutdown().await;
        Ok(())
    }
}

async fn read_loop<R>(
    mut reader: BufReader<R>,
    tx: mpsc::Sender<Result<Message, ConnectionError>>,
) where
    R: AsyncRead + Send + Unpin,
{
    loop {
        match codec::read_frame(&mut reader).await {
            Ok(None) => break,
            Ok(Some(body)) => match Message::from_slice(&body) {
                Ok(Message::Response { id, .. }) => {
                    // This server never sends client-bound requests, so an
                    // inbound response correlates with nothing.
                    warn!(?id, "discarding unexpected inbound response");
                }
                Ok(message) => {
                    if tx.send(Ok(message)).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    let _ = tx.send(Err(e.into())).await;
                    break;
                }
            },
            Err(e) => {
                let _ = tx.send(Err(e.into())).await;
                break;
            }
        }
    }
}
