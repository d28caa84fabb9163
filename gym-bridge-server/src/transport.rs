//! Request/reply transports.
mod channel;
mod zmq;
pub use self::zmq::ZmqTransport;
pub use channel::{channel, ChannelClient, ChannelTransport};
use thiserror::Error;

/// Errors of a [`Transport`].
#[derive(Error, Debug)]
pub enum TransportError {
    /// The ZeroMQ socket failed.
    #[error("ZeroMQ error: {0}")]
    Zmq(#[from] ::zmq::Error),

    /// The peer went away.
    #[error("Transport closed")]
    Closed,
}

/// A strict request/reply channel.
///
/// Every message returned by [`Transport::recv`] must be answered by exactly one
/// call to [`Transport::send`] before the next receive.
pub trait Transport {
    /// Waits for a request for at most the poll interval of the transport.
    ///
    /// Returns `Ok(None)` when no request arrived in time.
    fn recv(&mut self) -> Result<Option<Vec<u8>>, TransportError>;

    /// Sends the reply to the last request.
    fn send(&mut self, bytes: &[u8]) -> Result<(), TransportError>;
}
