use super::{Transport, TransportError};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

/// Creates an in-process transport and the client connected to it.
pub fn channel(poll_interval: Duration) -> (ChannelTransport, ChannelClient) {
    let (req_tx, req_rx) = bounded(1);
    let (rep_tx, rep_rx) = bounded(1);
    (
        ChannelTransport {
            requests: req_rx,
            replies: rep_tx,
            poll_interval,
        },
        ChannelClient {
            requests: req_tx,
            replies: rep_rx,
        },
    )
}

/// Server end of an in-process request/reply channel.
pub struct ChannelTransport {
    requests: Receiver<Vec<u8>>,
    replies: Sender<Vec<u8>>,
    poll_interval: Duration,
}

impl Transport for ChannelTransport {
    fn recv(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        match self.requests.recv_timeout(self.poll_interval) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(TransportError::Closed),
        }
    }

    fn send(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        self.replies
            .send(bytes.to_vec())
            .map_err(|_| TransportError::Closed)
    }
}

/// Client end of an in-process request/reply channel.
///
/// Dropping the client closes the channel and ends the server loop.
pub struct ChannelClient {
    requests: Sender<Vec<u8>>,
    replies: Receiver<Vec<u8>>,
}

impl ChannelClient {
    /// Sends a request and waits for its reply.
    pub fn request(&self, bytes: Vec<u8>) -> Result<Vec<u8>, TransportError> {
        self.requests
            .send(bytes)
            .map_err(|_| TransportError::Closed)?;
        self.replies.recv().map_err(|_| TransportError::Closed)
    }

    /// A reply sent without a pending request, if any.
    #[cfg(test)]
    pub(crate) fn try_reply(&self) -> Option<Vec<u8>> {
        self.replies.try_recv().ok()
    }
}
