//! IPC between front-ends and the host process
//!
//! Newline-delimited JSON over a Unix Domain Socket, one request per
//! connection.

mod protocol;
mod unix_socket;

pub use protocol::{decode_line, encode_line, Request, Response};
pub use unix_socket::{Envelope, HostClient, SocketPath, UnixSocketClient, UnixSocketServer};
