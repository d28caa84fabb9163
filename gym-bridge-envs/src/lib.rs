//! Built-in environments served by gym-bridge.
//!
//! * `GridWorld-v0` and `FrozenLake-v1` are tabular environments built on
//!   [`DiscreteEnv`] and expose their [`TransitionTable`](gym_bridge_core::TransitionTable).
//! * `CartPole-v1` has a continuous observation and two discrete actions.
//! * `Pendulum-v1` has a continuous observation and a continuous torque action.
//!
//! [`registry()`] returns an [`EnvRegistry`] containing all of them.
mod cart_pole;
mod discrete;
mod frozen_lake;
mod grid_world;
mod pendulum;
pub use cart_pole::CartPole;
pub use discrete::DiscreteEnv;
pub use frozen_lake::{frozen_lake, MAP_4X4};
pub use grid_world::grid_world;
pub use pendulum::Pendulum;

use gym_bridge_core::{Env, EnvRegistry};

/// Registry of the built-in environments.
pub fn registry() -> EnvRegistry {
    EnvRegistry::new()
        .register("GridWorld-v0", |seed| {
            Ok(Box::new(grid_world(seed)?) as Box<dyn Env>)
        })
        .register("FrozenLake-v1", |seed| {
            Ok(Box::new(frozen_lake(&MAP_4X4, true, seed)?) as Box<dyn Env>)
        })
        .register("CartPole-v1", |seed| {
            Ok(Box::new(CartPole::new(seed)) as Box<dyn Env>)
        })
        .register("Pendulum-v1", |seed| {
            Ok(Box::new(Pendulum::new(seed)) as Box<dyn Env>)
        })
}

/// Observation holding a single state index.
pub(crate) fn state_obs(s: usize) -> ndarray::ArrayD<f32> {
    ndarray::ArrayD::from_elem(ndarray::IxDyn(&[1]), s as f32)
}
