//! Request loop.
use crate::{
    messages::{MakeMessage, ResetMessage, StepMessage},
    transport::{Transport, TransportError},
    Lifecycle, LifecycleState, Request, Response, ServerError, Session,
};
use log::{debug, info, warn};
use ndarray::Axis;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// Serves requests of a [`Transport`] with a [`Session`].
///
/// Requests are handled one at a time, in order, and every request gets
/// exactly one response. Failed requests are answered with an error message
/// and leave the session as it was.
pub struct Server<T: Transport> {
    transport: T,
    session: Session,
    lifecycle: Lifecycle,
    running: Arc<AtomicBool>,
}

impl<T: Transport> Server<T> {
    /// Constructs a [`Server`].
    pub fn new(transport: T, session: Session) -> Self {
        info!("Gym server initialized");
        Self {
            transport,
            session,
            lifecycle: Lifecycle::new(),
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Flag checked between requests. Clearing it stops [`Server::serve`].
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        self.running.clone()
    }

    /// The environment session.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Lifecycle state.
    pub fn state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    /// Runs the loop until the running flag is cleared or the transport closes.
    ///
    /// A request being waited for when the flag is cleared is not answered.
    pub fn serve(&mut self) -> Result<(), ServerError> {
        info!("Serving");
        while self.running.load(Ordering::SeqCst) {
            let request = match self.transport.recv() {
                Ok(Some(bytes)) => bytes,
                Ok(None) => continue,
                Err(TransportError::Closed) => break,
                Err(e) => return Err(e.into()),
            };
            let reply = self.handle(&request)?;
            match self.transport.send(&reply) {
                Ok(()) => {}
                Err(TransportError::Closed) => break,
                Err(e) => return Err(e.into()),
            }
        }
        info!("Stopped serving");
        Ok(())
    }

    /// Handles one encoded request and returns the encoded response.
    ///
    /// Only the failure to encode an error message is returned as an error.
    pub fn handle(&mut self, bytes: &[u8]) -> Result<Vec<u8>, ServerError> {
        let response = self.dispatch(bytes).unwrap_or_else(|e| {
            warn!("Rejected request: {}", e);
            Response::error(e.to_string())
        });
        response.encode().or_else(|e| {
            warn!("{}", e);
            Response::error(e.to_string()).encode()
        })
    }

    fn dispatch(&mut self, bytes: &[u8]) -> Result<Response, ServerError> {
        let request = Request::decode(bytes)?;
        let method = request.method();
        debug!("Received {}", method);
        self.lifecycle.on_request(method)?;

        let response = match request {
            Request::Info => {
                let info = self.session.info()?;
                info!("Action space type {}", info.action_space.type_name());
                info!("Action space shape {:?}", info.action_space.shape());
                info!("Observation space type {}", info.observation_space.type_name());
                info!("Observation space shape {:?}", info.observation_space.shape());
                Response::Info(info.into())
            }
            Request::Dynamics(p) => Response::Dynamics(self.session.dynamics(p.state, p.action)?.into()),
            Request::Make(p) => {
                self.session.make(&p.env_name, p.num_envs)?;
                Response::Make(MakeMessage::default())
            }
            Request::Reset => {
                info!("Resetting environments");
                let obs = self.session.reset()?;
                debug!("Observation {:?}", obs);
                Response::Reset(ResetMessage::new(obs))
            }
            Request::Step(p) => {
                if p.actions.is_none() && p.action.is_some() && self.session.count() != Some(1) {
                    return Err(ServerError::InvalidParam(
                        "a scalar action needs a single environment instance".to_string(),
                    ));
                }
                let render = p.render;
                let result = self.session.step(p.actions()?, render)?;
                Response::Step(StepMessage {
                    observation: result.obs,
                    reward: result.reward,
                    done: result.done,
                    real_reward: result.info.reward.insert_axis(Axis(1)),
                })
            }
        };

        self.lifecycle.on_success(method);
        Ok(response)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{channel, SessionConfig};
    use std::time::Duration;

    fn server() -> Server<crate::ChannelTransport> {
        let (transport, _client) = channel(Duration::from_millis(10));
        let session = Session::new(gym_bridge_envs::registry(), SessionConfig::default());
        Server::new(transport, session)
    }

    #[test]
    fn test_garbage_gets_error_reply() {
        #[derive(serde::Deserialize)]
        struct Reply {
            error: String,
        }
        let mut server = server();
        let bytes = server.handle(&[0xc1, 0x00]).unwrap();
        let reply: Reply = rmp_serde::from_slice(&bytes).unwrap();
        assert!(reply.error.starts_with("Failed to decode request"));
        assert_eq!(server.state(), LifecycleState::Uninitialized);
    }

    #[test]
    fn test_failed_make_keeps_uninitialized() {
        let mut server = server();
        let bytes = Request::Make(crate::messages::MakeParam {
            env_name: "Nope-v0".to_string(),
            num_envs: 1,
        })
        .encode()
        .unwrap();
        server.handle(&bytes).unwrap();
        assert_eq!(server.state(), LifecycleState::Uninitialized);
        assert!(!server.session().is_active());
    }

    #[test]
    fn test_serve_stops_on_flag() {
        let mut server = server();
        server.running_flag().store(false, Ordering::SeqCst);
        server.serve().unwrap();
    }

    #[test]
    fn test_serve_stops_while_waiting() {
        let (transport, client) = channel(Duration::from_millis(10));
        let session = Session::new(gym_bridge_envs::registry(), SessionConfig::default());
        let mut server = Server::new(transport, session);
        let running = server.running_flag();
        let handle = std::thread::spawn(move || {
            let result = server.serve();
            (result, server)
        });

        std::thread::sleep(Duration::from_millis(50));
        running.store(false, Ordering::SeqCst);
        let (result, server) = handle.join().unwrap();
        assert!(result.is_ok());
        assert_eq!(server.state(), LifecycleState::Uninitialized);
        assert!(client.try_reply().is_none());
    }
}
