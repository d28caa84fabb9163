use super::{Transport, TransportError};
use log::info;
use std::time::Duration;
use zmq::{Context, Socket};

/// Reply socket bound to a ZeroMQ endpoint.
pub struct ZmqTransport {
    // Keeps the context alive as long as the socket.
    _context: Context,
    socket: Socket,
}

impl ZmqTransport {
    /// Binds a REP socket to `address`, e.g. `tcp://*:10201`.
    ///
    /// Receives time out after `poll_interval` so that the caller can check
    /// for interruption between requests.
    pub fn bind(address: &str, poll_interval: Duration) -> Result<Self, TransportError> {
        let context = Context::new();
        let socket = context.socket(zmq::REP)?;
        socket.set_rcvtimeo(poll_interval.as_millis().min(i32::MAX as u128) as i32)?;
        socket.set_linger(0)?;
        socket.bind(address)?;
        info!("Listening on {}", address);
        Ok(Self {
            _context: context,
            socket,
        })
    }
}

impl Transport for ZmqTransport {
    fn recv(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        match self.socket.recv_bytes(0) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(zmq::Error::EAGAIN) | Err(zmq::Error::EINTR) => Ok(None),
            Err(zmq::Error::ETERM) => Err(TransportError::Closed),
            Err(e) => Err(e.into()),
        }
    }

    fn send(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        Ok(self.socket.send(bytes, 0)?)
    }
}
