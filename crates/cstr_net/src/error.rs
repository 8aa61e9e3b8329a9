//! Network-layer error types.

use std::time::Duration;

use cstr_space::StatusCode;

/// Errors that can occur during network operations.
#[derive(Debug, thiserror::Error)]
pub enum NetError {
    /// Failed to encode a message to MessagePack.
    #[error("failed to encode message: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    /// Failed to decode a message from MessagePack.
    #[error("failed to decode message: {0}")]
    Decode(#[from] rmp_serde::decode::Error),

    /// NATS connection error.
    #[error("NATS connection error: {0}")]
    Connect(#[from] async_nats::ConnectError),

    /// NATS subscription error.
    #[error("NATS subscribe error: {0}")]
    Subscribe(#[from] async_nats::SubscribeError),

    /// NATS publish error.
    #[error("NATS publish error: {0}")]
    Publish(#[from] async_nats::PublishError),

    /// NATS request error (no responders, transport failure).
    #[error("NATS request error: {0}")]
    Request(#[from] async_nats::RequestError),

    /// Flushing buffered messages failed.
    #[error("NATS flush error: {0}")]
    Flush(#[from] async_nats::client::FlushError),

    /// No reply arrived in time.
    #[error("no reply within {0:?}")]
    Timeout(Duration),

    /// The server answered with a failure status.
    #[error("{status}: {message}")]
    Remote { status: StatusCode, message: String },
}
