#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Message formats exchanged with the client.
pub mod protocol;

/// The websocket server and the handle used to reach its client.
pub mod server;

/// Persistence of received label sessions.
pub mod store;

pub use protocol::{ProtocolError, RelayMessage};
pub use server::{RelayConfig, RelayHandle, RelayServer};
pub use store::LabelStore;

/// An error type for the relay.
#[derive(thiserror::Error, Debug)]
pub enum RelayError {
    /// Socket error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Saving a payload failed.
    #[error(transparent)]
    Store(#[from] simlabel_io::IoError),

    /// A message could not be parsed.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// No client is connected.
    #[error("No client connected")]
    NoClient,

    /// The tracked client went away before the message was queued.
    #[error("Client {0} disconnected")]
    ClientDisconnected(u64),
}
