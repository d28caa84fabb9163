//! Vectorized environment.
//!
//! [`VecEnv`] holds `count` instances of the same environment and drives them in
//! lockstep. Observations are stacked along a new leading axis, so a batch of
//! observations of shape `[d0, d1, ...]` becomes `[count, d0, d1, ...]`.
//! Instances whose episode ends during [`VecEnv::step`] are reset immediately
//! and the returned observation for them is the first one of the new episode.
mod normalize;
use crate::{Act, Env, EnvError, EnvRegistry, Space, TransitionTable};
use anyhow::Result;
use log::{info, trace};
use ndarray::{Array1, ArrayD, ArrayViewD, Axis};
pub use normalize::RewardNormalizer;

/// A batch of actions, one per instance of a [`VecEnv`].
#[derive(Debug, Clone, PartialEq)]
pub enum VecAct {
    /// Indices into a discrete action space, shape `[count]`.
    Discrete(Array1<i64>),

    /// Elements of a box action space, shape `[count, ...]`.
    Continuous(ArrayD<f32>),
}

impl VecAct {
    /// Number of actions in the batch.
    pub fn len(&self) -> usize {
        match self {
            VecAct::Discrete(a) => a.len(),
            VecAct::Continuous(a) => a.shape().first().copied().unwrap_or(0),
        }
    }

    /// Returns `true` if the batch holds no action.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Action of the `i`-th instance.
    fn get(&self, i: usize) -> Act {
        match self {
            VecAct::Discrete(a) => Act::Discrete(a[i]),
            VecAct::Continuous(a) => Act::Continuous(a.index_axis(Axis(0), i).to_owned()),
        }
    }
}

/// Additional information of a [`VecStep`].
#[derive(Debug, Clone, PartialEq)]
pub struct VecInfo {
    /// Rewards as returned by the instances, before any normalization.
    pub reward: Array1<f32>,
}

/// Result of a step of all instances.
#[derive(Debug, Clone, PartialEq)]
pub struct VecStep {
    /// Stacked observations, leading axis `count`.
    pub obs: ArrayD<f32>,

    /// Rewards, possibly normalized, shape `[count]`.
    pub reward: Array1<f32>,

    /// Episode ends (terminated or truncated), shape `[count]`.
    pub is_done: Array1<bool>,

    /// Raw rewards.
    pub info: VecInfo,
}

/// `count` instances of an environment stepped and reset in lockstep.
pub struct VecEnv {
    envs: Vec<Box<dyn Env>>,
    normalizer: Option<RewardNormalizer>,
}

impl VecEnv {
    /// Wraps the given instances.
    ///
    /// All instances must share the action and observation spaces of the first one.
    pub fn new(envs: Vec<Box<dyn Env>>) -> Result<Self, EnvError> {
        let first = envs.first().ok_or(EnvError::EmptyVecEnv)?;
        let (act_space, obs_space) = (first.action_space(), first.observation_space());
        for (i, env) in envs.iter().enumerate().skip(1) {
            if env.action_space() != act_space || env.observation_space() != obs_space {
                return Err(EnvError::SpaceMismatch(i));
            }
        }
        Ok(Self {
            envs,
            normalizer: None,
        })
    }

    /// Builds `count` instances of the environment registered under `name`.
    ///
    /// Instance `i` is seeded with `seed + i`.
    pub fn build(registry: &EnvRegistry, name: &str, seed: u64, count: usize) -> Result<Self> {
        info!("Making {} {}s", count, name);
        let envs = (0..count)
            .map(|i| registry.build(name, seed.wrapping_add(i as u64)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(envs)?)
    }

    /// Normalizes rewards returned by [`VecEnv::step`].
    pub fn with_reward_normalizer(mut self, normalizer: RewardNormalizer) -> Self {
        self.normalizer = Some(normalizer);
        self
    }

    /// Number of instances.
    pub fn count(&self) -> usize {
        self.envs.len()
    }

    /// Action space shared by the instances.
    pub fn action_space(&self) -> &Space {
        self.envs[0].action_space()
    }

    /// Observation space shared by the instances.
    pub fn observation_space(&self) -> &Space {
        self.envs[0].observation_space()
    }

    /// Transition table of the instances, if they expose one.
    pub fn transitions(&self) -> Option<&TransitionTable> {
        self.envs[0].transitions()
    }

    /// Resets all instances and returns their stacked initial observations.
    pub fn reset(&mut self) -> Result<ArrayD<f32>> {
        trace!("VecEnv::reset()");
        if let Some(normalizer) = self.normalizer.as_mut() {
            normalizer.reset();
        }
        let obs = self
            .envs
            .iter_mut()
            .map(|env| env.reset())
            .collect::<Result<Vec<_>>>()?;
        stack(&obs)
    }

    /// Steps every instance with its action in `act`.
    pub fn step(&mut self, act: &VecAct) -> Result<VecStep> {
        trace!("VecEnv::step()");
        if act.len() != self.count() {
            return Err(EnvError::ActionShape {
                got: match act {
                    VecAct::Discrete(a) => a.shape().to_vec(),
                    VecAct::Continuous(a) => a.shape().to_vec(),
                },
                expected: format!("leading axis of {}", self.count()),
            }
            .into());
        }

        // The whole batch is validated before any instance moves.
        let acts = (0..self.count()).map(|i| act.get(i)).collect::<Vec<_>>();
        for a in acts.iter() {
            self.action_space().check(a)?;
        }

        let n = self.count();
        let mut obs = Vec::with_capacity(n);
        let mut reward = Vec::with_capacity(n);
        let mut is_done = Vec::with_capacity(n);
        for (env, a) in self.envs.iter_mut().zip(acts.iter()) {
            let step = env.step(a)?;
            let done = step.is_done();
            obs.push(if done { env.reset()? } else { step.obs });
            reward.push(step.reward);
            is_done.push(done);
        }

        let raw = Array1::from(reward);
        let is_done = Array1::from(is_done);
        let reward = match self.normalizer.as_mut() {
            Some(normalizer) => normalizer.normalize(&raw, &is_done),
            None => raw.clone(),
        };

        Ok(VecStep {
            obs: stack(&obs)?,
            reward,
            is_done,
            info: VecInfo { reward: raw },
        })
    }

    /// Renders every instance.
    pub fn render(&mut self) -> Result<()> {
        for env in self.envs.iter_mut() {
            env.render()?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for VecEnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VecEnv")
            .field("count", &self.count())
            .field("action_space", self.action_space())
            .field("observation_space", self.observation_space())
            .field("normalizer", &self.normalizer)
            .finish()
    }
}

/// Stacks observations along a new leading axis.
fn stack(obs: &[ArrayD<f32>]) -> Result<ArrayD<f32>> {
    let views: Vec<ArrayViewD<f32>> = obs.iter().map(|o| o.view()).collect();
    Ok(ndarray::stack(Axis(0), &views)?)
}
