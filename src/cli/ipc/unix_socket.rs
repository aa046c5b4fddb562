//! Unix Domain Socket transport between front-ends and the host

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{mpsc, oneshot};

use super::protocol::{decode_line, encode_line, Request, Response};
use crate::application::ports::{HostBoundary, HostError, SavedRecording};
use crate::domain::recording::RecordingBlob;

const SOCKET_NAME: &str = "audiorec.sock";

/// Socket path resolver
#[derive(Debug, Clone)]
pub struct SocketPath {
    path: PathBuf,
}

impl SocketPath {
    /// Create socket path, preferring XDG_RUNTIME_DIR
    pub fn new() -> Self {
        let path = std::env::var("XDG_RUNTIME_DIR")
            .map(|dir| PathBuf::from(dir).join(SOCKET_NAME))
            .unwrap_or_else(|_| std::env::temp_dir().join(SOCKET_NAME));
        Self { path }
    }

    /// Use an explicit path
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Resolve an optional override
    pub fn resolve(path: Option<PathBuf>) -> Self {
        path.map(Self::with_path).unwrap_or_default()
    }

    /// Get the socket path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if socket file exists
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Remove socket file if it exists
    pub fn cleanup(&self) -> io::Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

impl Default for SocketPath {
    fn default() -> Self {
        Self::new()
    }
}

/// A decoded request and the channel its reply goes back on
#[derive(Debug)]
pub struct Envelope {
    pub request: Request,
    pub reply: oneshot::Sender<Response>,
}

/// Unix Domain Socket server.
///
/// Connections are served concurrently, but every request is forwarded to a
/// single consumer and answered in the order that consumer handles them.
pub struct UnixSocketServer {
    socket_path: SocketPath,
    listener: Option<UnixListener>,
}

impl UnixSocketServer {
    pub fn new(socket_path: SocketPath) -> Self {
        Self {
            socket_path,
            listener: None,
        }
    }

    /// Bind the listener, replacing a stale socket file
    pub fn bind(&mut self) -> io::Result<()> {
        self.socket_path.cleanup()?;
        let listener = UnixListener::bind(self.socket_path.path())?;
        self.listener = Some(listener);
        Ok(())
    }

    pub fn path(&self) -> &Path {
        self.socket_path.path()
    }

    /// Accept connections forever, forwarding requests on `tx`
    pub async fn run(&self, tx: mpsc::Sender<Envelope>) -> io::Result<()> {
        let listener = self
            .listener
            .as_ref()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "Socket not bound"))?;

        loop {
            match listener.accept().await {
                Ok((stream, _addr)) => {
                    let tx = tx.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, tx).await {
                            tracing::warn!(error = %e, "socket connection error");
                        }
                    });
                }
                Err(e) => {
                    tracing::warn!(error = %e, "socket accept error");
                }
            }
        }
    }

    pub fn cleanup(&self) {
        let _ = self.socket_path.cleanup();
    }
}

impl Drop for UnixSocketServer {
    fn drop(&mut self) {
        self.cleanup();
    }
}

/// Handle a single client connection: one request, one reply
async fn handle_connection(stream: UnixStream, tx: mpsc::Sender<Envelope>) -> io::Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut line = String::new();

    reader.read_line(&mut line).await?;

    let response = match decode_line::<Request>(&line) {
        Ok(request) => {
            tracing::debug!(kind = request.kind(), "request received");
            let (reply_tx, reply_rx) = oneshot::channel();
            let envelope = Envelope {
                request,
                reply: reply_tx,
            };
            if tx.send(envelope).await.is_err() {
                Response::error("host is shutting down")
            } else {
                reply_rx
                    .await
                    .unwrap_or_else(|_| Response::error("host is shutting down"))
            }
        }
        Err(e) => Response::error(format!("malformed request: {}", e)),
    };

    let encoded = encode_line(&response).map_err(io::Error::other)?;
    writer.write_all(encoded.as_bytes()).await?;
    writer.flush().await?;

    Ok(())
}

/// Unix Domain Socket client
#[derive(Debug, Clone)]
pub struct UnixSocketClient {
    socket_path: SocketPath,
}

impl UnixSocketClient {
    pub fn new(socket_path: SocketPath) -> Self {
        Self { socket_path }
    }

    /// Check if the host appears to be running (socket exists)
    pub fn is_host_running(&self) -> bool {
        self.socket_path.exists()
    }

    /// Send one request and wait for its reply
    pub async fn request(&self, request: &Request) -> Result<Response, HostError> {
        let stream = UnixStream::connect(self.socket_path.path())
            .await
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound | io::ErrorKind::ConnectionRefused => HostError::NotRunning,
                _ => HostError::Transport(e.to_string()),
            })?;
        let (reader, mut writer) = stream.into_split();

        let line = encode_line(request).map_err(|e| HostError::Transport(e.to_string()))?;
        writer
            .write_all(line.as_bytes())
            .await
            .map_err(|e| HostError::Transport(e.to_string()))?;
        writer
            .flush()
            .await
            .map_err(|e| HostError::Transport(e.to_string()))?;

        let mut reader = BufReader::new(reader);
        let mut response = String::new();
        let read = reader
            .read_line(&mut response)
            .await
            .map_err(|e| HostError::Transport(e.to_string()))?;
        if read == 0 {
            return Err(HostError::Transport(
                "host closed the connection".to_string(),
            ));
        }

        decode_line(&response).map_err(|e| HostError::UnexpectedReply(e.to_string()))
    }
}

/// Front-end view of the host, over the socket
#[derive(Debug, Clone)]
pub struct HostClient {
    client: UnixSocketClient,
}

impl HostClient {
    pub fn new(socket_path: SocketPath) -> Self {
        Self {
            client: UnixSocketClient::new(socket_path),
        }
    }

    /// Ask the host to show the destination folder
    pub async fn open_destination(&self) -> Result<(), HostError> {
        match self.client.request(&Request::OpenDestination).await? {
            Response::Ok => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    /// Preference file the running host writes
    pub async fn preferences_path(&self) -> Result<PathBuf, HostError> {
        match self.client.request(&Request::PreferencesPath).await? {
            Response::PreferencesPath { path } => Ok(path),
            other => Err(unexpected(other)),
        }
    }

    /// Ask the host to exit
    pub async fn quit(&self) -> Result<(), HostError> {
        match self.client.request(&Request::Quit).await? {
            Response::Ok => Ok(()),
            other => Err(unexpected(other)),
        }
    }
}

fn unexpected(response: Response) -> HostError {
    match response {
        Response::Error { message } => HostError::Rejected(message),
        other => HostError::UnexpectedReply(format!("{:?}", other)),
    }
}

#[async_trait]
impl HostBoundary for HostClient {
    async fn attach(&self) -> Result<PathBuf, HostError> {
        match self.client.request(&Request::OpenNewWindow).await? {
            Response::DestPathUpdate { destination } => Ok(destination),
            other => Err(unexpected(other)),
        }
    }

    async fn save_buffer(&self, blob: RecordingBlob) -> Result<SavedRecording, HostError> {
        let request = Request::SaveBuffer {
            data: blob.into_data(),
        };
        match self.client.request(&request).await? {
            Response::Saved { path, bytes } => Ok(SavedRecording { path, bytes }),
            Response::Error { message } => Err(HostError::Save(message)),
            other => Err(unexpected(other)),
        }
    }

    async fn choose_destination(&self) -> Result<Option<PathBuf>, HostError> {
        match self.client.request(&Request::ShowDialog).await? {
            Response::DestPathUpdate { destination } => Ok(Some(destination)),
            Response::DialogCancelled { .. } => Ok(None),
            other => Err(unexpected(other)),
        }
    }
}
