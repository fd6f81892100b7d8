use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;

use crate::error::{io_err, DaemonError};

/// JSON newline-delimited request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonRequest {
    pub cmd: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub args: Value,
}

impl DaemonRequest {
    pub fn new(cmd: impl Into<String>, args: Value) -> Self {
        Self {
            cmd: cmd.into(),
            args,
        }
    }
}

/// JSON newline-delimited response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DaemonResponse {
    pub fn ok(data: Value) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(message.into()),
        }
    }

    /// Unwrap the payload of a response to `cmd`.
    pub fn into_data(self, cmd: &str) -> Result<Value, DaemonError> {
        if self.ok {
            Ok(self.data.unwrap_or(Value::Null))
        } else {
            Err(DaemonError::Command {
                cmd: cmd.to_string(),
                message: self
                    .error
                    .unwrap_or_else(|| "unknown daemon error".to_string()),
            })
        }
    }
}

/// Generic command channel: invoke a named remote procedure with JSON args.
///
/// Implementations never retry; a failure is returned to the caller as is.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn invoke(&self, cmd: &str, args: Value) -> Result<Value, DaemonError>;
}

/// Transport over the daemon's Unix socket, one connection per command.
#[derive(Debug, Clone)]
pub struct SocketTransport {
    socket: PathBuf,
}

impl SocketTransport {
    pub fn new(socket: impl Into<PathBuf>) -> Self {
        Self {
            socket: socket.into(),
        }
    }
}

#[async_trait]
impl Transport for SocketTransport {
    async fn invoke(&self, cmd: &str, args: Value) -> Result<Value, DaemonError> {
        let request = DaemonRequest::new(cmd, args);
        tracing::debug!(cmd, socket = %self.socket.display(), "invoking daemon command");
        let response = send_request(&self.socket, &request).await?;
        response.into_data(cmd)
    }
}

/// Open a connection to the daemon socket, mapping "nobody listening" errors
/// to [`DaemonError::DaemonNotRunning`].
pub async fn connect(socket: &Path) -> Result<UnixStream, DaemonError> {
    if !socket.exists() {
        return Err(DaemonError::DaemonNotRunning {
            socket: socket.to_path_buf(),
        });
    }

    UnixStream::connect(socket).await.map_err(|err| {
        if matches!(
            err.kind(),
            ErrorKind::NotFound | ErrorKind::ConnectionRefused | ErrorKind::ConnectionReset
        ) {
            DaemonError::DaemonNotRunning {
                socket: socket.to_path_buf(),
            }
        } else {
            io_err(socket, err)
        }
    })
}

/// Write one request line to `stream`.
pub(crate) async fn write_request(
    stream: &mut UnixStream,
    socket: &Path,
    request: &DaemonRequest,
) -> Result<(), DaemonError> {
    let payload = serde_json::to_string(request)?;
    stream
        .write_all(payload.as_bytes())
        .await
        .map_err(|e| io_err(socket, e))?;
    stream.write_all(b"\n").await.map_err(|e| io_err(socket, e))?;
    stream.flush().await.map_err(|e| io_err(socket, e))?;
    Ok(())
}

/// Send one JSON request to the daemon socket and return one response.
pub async fn send_request(
    socket: &Path,
    request: &DaemonRequest,
) -> Result<DaemonResponse, DaemonError> {
    let mut stream = connect(socket).await?;
    write_request(&mut stream, socket, request).await?;

    let mut reader = BufReader::new(stream);
    let mut line = String::new();
    let read = reader
        .read_line(&mut line)
        .await
        .map_err(|e| io_err(socket, e))?;
    if read == 0 {
        return Err(DaemonError::Protocol(
            "daemon closed connection before responding".to_string(),
        ));
    }

    let response: DaemonResponse = serde_json::from_str(line.trim_end())?;
    Ok(response)
}
