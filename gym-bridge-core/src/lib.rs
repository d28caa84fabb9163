#![warn(missing_docs)]
//! Environment contract shared by the gym-bridge crates.
//!
//! An environment is anything implementing [`Env`]: a discrete-time system with
//! [`Env::reset`] and [`Env::step`] primitives and [`Space`] descriptors for its
//! actions and observations. Tabular environments may additionally expose a
//! [`TransitionTable`], the exhaustive `(state, action) -> outcomes` mapping.
//!
//! [`VecEnv`] runs `count` instances of the same environment in lockstep and
//! batches their observations, rewards and done flags along a leading axis.
//! Environments are constructed by name through an [`EnvRegistry`].
pub mod error;
mod env;
mod space;
mod transition;
mod vec_env;
pub use env::{Act, Env, EnvBuilder, EnvRegistry, Step};
pub use error::EnvError;
pub use space::{Space, SpaceKind};
pub use transition::{Transition, TransitionTable};
pub use vec_env::{RewardNormalizer, VecAct, VecEnv, VecInfo, VecStep};
