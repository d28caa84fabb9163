#![warn(missing_docs)]
//! Request/reply server exposing gym-bridge environments to remote trainers.
//!
//! A trainer sends MessagePack requests `{method, param}` over a ZeroMQ REP
//! socket and receives one MessagePack map per request. The server owns a single
//! [`Session`], the vectorized environment created by the last successful
//! `make`. Methods other than `make` are rejected until one succeeded:
//!
//! ```no_run
//! use gym_bridge_server::{Server, ServerConfig, Session, ZmqTransport};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = ServerConfig::default();
//! let transport = ZmqTransport::bind(&config.address, config.poll_interval())?;
//! let session = Session::new(gym_bridge_envs::registry(), config.session);
//! Server::new(transport, session).serve()?;
//! # Ok(())
//! # }
//! ```
mod config;
mod error;
mod lifecycle;
pub mod messages;
mod nested;
mod server;
mod session;
mod transport;
pub use config::{ServerConfig, SessionConfig};
pub use error::ServerError;
pub use lifecycle::{Lifecycle, LifecycleState};
pub use messages::{Method, Request, Response};
pub use nested::Nested;
pub use server::Server;
pub use session::{Dynamics, Session, SpaceInfo, StepResult};
pub use transport::{
    channel, ChannelClient, ChannelTransport, Transport, TransportError, ZmqTransport,
};
