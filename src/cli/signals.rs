//! OS signal handling for the host and the interactive recorder

use std::fmt;
use std::io;

use tokio::signal::unix::{signal, Signal, SignalKind};

/// Why the process was asked to stop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// SIGINT (Ctrl+C)
    Interrupt,
    /// SIGTERM
    Terminate,
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShutdownReason::Interrupt => write!(f, "SIGINT"),
            ShutdownReason::Terminate => write!(f, "SIGTERM"),
        }
    }
}

/// Listener for SIGINT and SIGTERM.
///
/// Once created, the default handlers are replaced for the rest of the
/// process lifetime, so Ctrl+C no longer kills the process outright.
pub struct ShutdownSignal {
    sigint: Signal,
    sigterm: Signal,
}

impl ShutdownSignal {
    /// Register the handlers
    pub fn new() -> Result<Self, io::Error> {
        Ok(Self {
            sigint: signal(SignalKind::interrupt())?,
            sigterm: signal(SignalKind::terminate())?,
        })
    }

    /// Wait for the next shutdown signal
    pub async fn recv(&mut self) -> ShutdownReason {
        tokio::select! {
            _ = self.sigint.recv() => ShutdownReason::Interrupt,
            _ = self.sigterm.recv() => ShutdownReason::Terminate,
        }
    }
}
