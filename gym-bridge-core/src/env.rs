//! Environment.
mod registry;
use crate::{Space, TransitionTable};
use anyhow::Result;
use ndarray::ArrayD;
pub use registry::{EnvBuilder, EnvRegistry};

/// An action applied to a single environment instance.
#[derive(Debug, Clone, PartialEq)]
pub enum Act {
    /// Index into a [`Space::Discrete`] action space.
    Discrete(i64),

    /// Element of a [`Space::Box`] action space.
    Continuous(ArrayD<f32>),
}

/// Result of a single environment step.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    /// Observation after the step.
    pub obs: ArrayD<f32>,

    /// Reward.
    pub reward: f32,

    /// The episode reached a terminal state.
    pub is_terminated: bool,

    /// The episode was cut by a time limit.
    pub is_truncated: bool,
}

impl Step {
    /// Constructs a [`Step`] object.
    pub fn new(obs: ArrayD<f32>, reward: f32, is_terminated: bool, is_truncated: bool) -> Self {
        Self {
            obs,
            reward,
            is_terminated,
            is_truncated,
        }
    }

    #[inline]
    /// Terminated or truncated.
    pub fn is_done(&self) -> bool {
        self.is_terminated || self.is_truncated
    }
}

/// Represents an environment, typically an MDP.
///
/// Observations are arrays of shape [`Space::shape`] of the observation space,
/// except for discrete observation spaces, whose observations are one-element
/// arrays holding the state index.
pub trait Env: Send {
    /// Space of valid actions.
    fn action_space(&self) -> &Space;

    /// Space of observations.
    fn observation_space(&self) -> &Space;

    /// Reseeds the random number generator of the environment.
    fn seed(&mut self, seed: u64);

    /// Starts a new episode and returns its initial observation.
    fn reset(&mut self) -> Result<ArrayD<f32>>;

    /// Performs an environment step.
    fn step(&mut self, act: &Act) -> Result<Step>;

    /// Renders the current state.
    fn render(&mut self) -> Result<()> {
        Ok(())
    }

    /// Transition table, for environments with an explicit model.
    fn transitions(&self) -> Option<&TransitionTable> {
        None
    }
}
