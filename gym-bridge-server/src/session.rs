//! The active environment.
use crate::{
    messages::{DynamicsMessage, InfoMessage},
    ServerError, SessionConfig,
};
use gym_bridge_core::{EnvRegistry, RewardNormalizer, Space, SpaceKind, VecAct, VecEnv, VecInfo};
use log::{info, trace};
use ndarray::{Array2, ArrayD, Axis, Ix1};

/// Descriptors of the spaces of the active environment.
#[derive(Debug, Clone, PartialEq)]
pub struct SpaceInfo {
    /// Action space shared by all instances.
    pub action_space: Space,

    /// Observation space shared by all instances.
    pub observation_space: Space,
}

impl From<SpaceInfo> for InfoMessage {
    fn from(info: SpaceInfo) -> Self {
        let action_space_shape = match &info.action_space {
            Space::Discrete { n } => vec![*n],
            space => space.shape(),
        };
        Self {
            action_space_type: info.action_space.type_name().to_string(),
            action_space_shape,
            observation_space_type: info.observation_space.type_name().to_string(),
            observation_space_shape: info.observation_space.shape(),
            observation_space_size: info.observation_space.size(),
        }
    }
}

/// Result of [`Session::step`].
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    /// Stacked observations, leading axis `count`.
    pub obs: ArrayD<f32>,

    /// Rewards, `[count, 1]`.
    pub reward: Array2<f32>,

    /// Episode ends, `[count, 1]`.
    pub done: Array2<bool>,

    /// Raw rewards.
    pub info: VecInfo,
}

/// Outcomes of a `(state, action)` pair, one element per outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct Dynamics {
    /// Probabilities.
    pub probability: Vec<f64>,

    /// Next states.
    pub next_state: Vec<usize>,

    /// Rewards.
    pub reward: Vec<f64>,

    /// Episode ends.
    pub done: Vec<bool>,
}

impl From<Dynamics> for DynamicsMessage {
    fn from(d: Dynamics) -> Self {
        Self {
            probability: d.probability,
            next_state: d.next_state,
            reward: d.reward,
            done: d.done,
        }
    }
}

struct ActiveEnv {
    name: String,
    env: VecEnv,
}

/// Owns the vectorized environment created by the last successful `make`.
pub struct Session {
    registry: EnvRegistry,
    config: SessionConfig,
    active: Option<ActiveEnv>,
}

impl Session {
    /// A session with no environment.
    pub fn new(registry: EnvRegistry, config: SessionConfig) -> Self {
        Self {
            registry,
            config,
            active: None,
        }
    }

    /// Returns `true` once an environment was made.
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Name of the active environment.
    pub fn env_name(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.name.as_str())
    }

    /// Number of instances of the active environment.
    pub fn count(&self) -> Option<usize> {
        self.active.as_ref().map(|a| a.env.count())
    }

    fn active(&self, method: &'static str) -> Result<&ActiveEnv, ServerError> {
        self.active
            .as_ref()
            .ok_or(ServerError::NotInitialized { method })
    }

    fn active_mut(&mut self, method: &'static str) -> Result<&mut ActiveEnv, ServerError> {
        self.active
            .as_mut()
            .ok_or(ServerError::NotInitialized { method })
    }

    /// Makes `num_envs` instances of `env_name` and installs them.
    ///
    /// `num_envs` must be in `1..=max_num_envs`. The previous environment is
    /// dropped only once the new one is built. On failure the session is unchanged.
    pub fn make(&mut self, env_name: &str, num_envs: usize) -> Result<(), ServerError> {
        if num_envs == 0 || num_envs > self.config.max_num_envs {
            return Err(ServerError::InvalidParam(format!(
                "num_envs must be in 1..={}, got {}",
                self.config.max_num_envs, num_envs
            )));
        }
        let mut env = VecEnv::build(&self.registry, env_name, self.config.seed, num_envs)?;
        if self.config.normalize_reward {
            env = env.with_reward_normalizer(RewardNormalizer::new(self.config.gamma));
        }
        let prev = self.active.replace(ActiveEnv {
            name: env_name.to_string(),
            env,
        });
        if let Some(prev) = prev {
            info!("Replaced {}", prev.name);
        }
        Ok(())
    }

    /// Descriptors of the spaces of the active environment.
    pub fn info(&self) -> Result<SpaceInfo, ServerError> {
        let active = self.active("info")?;
        Ok(SpaceInfo {
            action_space: active.env.action_space().clone(),
            observation_space: active.env.observation_space().clone(),
        })
    }

    /// Resets all instances.
    pub fn reset(&mut self) -> Result<ArrayD<f32>, ServerError> {
        Ok(self.active_mut("reset")?.env.reset()?)
    }

    /// Steps all instances.
    ///
    /// For discrete action spaces a trailing axis of length one is dropped and
    /// the values are truncated to integers, so `[count]` and `[count, 1]`
    /// batches are both accepted. Continuous batches keep their shape.
    pub fn step(&mut self, actions: ArrayD<f64>, render: bool) -> Result<StepResult, ServerError> {
        let env = &mut self.active_mut("step")?.env;
        let act = match env.action_space().kind() {
            SpaceKind::Discrete => VecAct::Discrete(discrete_actions(actions)?),
            SpaceKind::Continuous => VecAct::Continuous(actions.mapv(|a| a as f32)),
        };
        trace!("Session::step(): {:?}", act);

        let step = env.step(&act)?;
        if render {
            env.render()?;
        }
        Ok(StepResult {
            obs: step.obs,
            reward: step.reward.insert_axis(Axis(1)),
            done: step.is_done.insert_axis(Axis(1)),
            info: step.info,
        })
    }

    /// Outcomes of taking `action` in `state`, from the transition table of
    /// the active environment.
    pub fn dynamics(&self, state: usize, action: usize) -> Result<Dynamics, ServerError> {
        let active = self.active("dynamics")?;
        let table = active
            .env
            .transitions()
            .ok_or_else(|| ServerError::NoTransitionTable(active.name.clone()))?;
        let outcomes = table
            .get(state, action)
            .ok_or(ServerError::NoTransition { state, action })?;
        Ok(Dynamics {
            probability: outcomes.iter().map(|t| t.probability).collect(),
            next_state: outcomes.iter().map(|t| t.next_state).collect(),
            reward: outcomes.iter().map(|t| t.reward).collect(),
            done: outcomes.iter().map(|t| t.done).collect(),
        })
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("env_name", &self.env_name())
            .field("count", &self.count())
            .finish()
    }
}

/// Drops a trailing singleton axis and casts to integers.
fn discrete_actions(actions: ArrayD<f64>) -> Result<ndarray::Array1<i64>, ServerError> {
    let ndim = actions.ndim();
    let actions = if ndim >= 2 && actions.shape()[ndim - 1] == 1 {
        actions.index_axis_move(Axis(ndim - 1), 0)
    } else {
        actions
    };
    let shape = actions.shape().to_vec();
    let actions = actions.into_dimensionality::<Ix1>().map_err(|_| {
        ServerError::InvalidParam(format!(
            "discrete actions must have shape [count] or [count, 1], got {:?}",
            shape
        ))
    })?;
    Ok(actions.mapv(|a| a as i64))
}

#[cfg(test)]
mod test {
    use super::*;
    use gym_bridge_core::{Env, Transition};
    use gym_bridge_envs::DiscreteEnv;
    use ndarray::{arr1, arr2, arr3, IxDyn};

    fn session() -> Session {
        Session::new(gym_bridge_envs::registry(), SessionConfig::default())
    }

    #[test]
    fn test_discrete_actions_squeeze() {
        let a = discrete_actions(arr2(&[[0.0], [3.0]]).into_dyn()).unwrap();
        assert_eq!(a, arr1(&[0, 3]));

        let a = discrete_actions(arr1(&[1.9, 2.0]).into_dyn()).unwrap();
        assert_eq!(a, arr1(&[1, 2]));

        assert!(discrete_actions(arr2(&[[0.0, 1.0]]).into_dyn()).is_err());
        assert!(discrete_actions(arr3(&[[[0.0]], [[1.0]]]).into_dyn()).is_err());
        assert!(discrete_actions(ArrayD::zeros(IxDyn(&[]))).is_err());
    }

    #[test]
    fn test_verbs_before_make() {
        let mut s = session();
        assert!(!s.is_active());
        assert!(matches!(
            s.info(),
            Err(ServerError::NotInitialized { method: "info" })
        ));
        assert!(matches!(
            s.reset(),
            Err(ServerError::NotInitialized { method: "reset" })
        ));
        assert!(matches!(
            s.step(arr1(&[0.0]).into_dyn(), false),
            Err(ServerError::NotInitialized { method: "step" })
        ));
        assert!(matches!(
            s.dynamics(0, 0),
            Err(ServerError::NotInitialized { method: "dynamics" })
        ));
    }

    #[test]
    fn test_failed_make_keeps_session() {
        let mut s = session();
        s.make("GridWorld-v0", 2).unwrap();
        assert!(s.make("Nope-v0", 2).is_err());
        assert!(matches!(
            s.make("CartPole-v1", 0),
            Err(ServerError::InvalidParam(_))
        ));
        assert_eq!(s.env_name(), Some("GridWorld-v0"));
        assert_eq!(s.count(), Some(2));
    }

    #[test]
    fn test_make_rejects_too_many_instances() {
        let config = SessionConfig::default().max_num_envs(4);
        let mut s = Session::new(gym_bridge_envs::registry(), config);
        s.make("GridWorld-v0", 4).unwrap();
        assert!(matches!(
            s.make("CartPole-v1", 5),
            Err(ServerError::InvalidParam(_))
        ));
        assert!(matches!(
            s.make("CartPole-v1", usize::MAX),
            Err(ServerError::InvalidParam(_))
        ));
        assert_eq!(s.env_name(), Some("GridWorld-v0"));
        assert_eq!(s.count(), Some(4));
    }

    #[test]
    fn test_info_of_box_spaces() {
        let mut s = session();
        s.make("Pendulum-v1", 1).unwrap();
        let msg = InfoMessage::from(s.info().unwrap());
        assert_eq!(msg.action_space_type, "Box");
        assert_eq!(msg.action_space_shape, vec![1]);
        assert_eq!(msg.observation_space_type, "Box");
        assert_eq!(msg.observation_space_shape, vec![3]);
        assert_eq!(msg.observation_space_size, 3);
    }

    #[test]
    fn test_continuous_step_keeps_shape() {
        let mut s = session();
        s.make("Pendulum-v1", 2).unwrap();
        s.reset().unwrap();
        let r = s.step(arr2(&[[0.5], [-0.5]]).into_dyn(), false).unwrap();
        assert_eq!(r.obs.shape(), &[2, 3]);
        assert_eq!(r.reward.shape(), &[2, 1]);
        assert_eq!(r.done.shape(), &[2, 1]);

        assert!(s.step(arr1(&[0.5, -0.5]).into_dyn(), false).is_err());
    }

    #[test]
    fn test_step_with_render() {
        let mut s = session();
        s.make("FrozenLake-v1", 1).unwrap();
        s.reset().unwrap();
        let r = s.step(arr2(&[[1.0]]).into_dyn(), true).unwrap();
        assert_eq!(r.obs.shape(), &[1, 1]);
    }

    #[test]
    fn test_dynamics() {
        let table = gym_bridge_core::TransitionTable::new(3, 2).with_entry(
            2,
            1,
            vec![
                Transition::new(0.5, 5, -1.0, false),
                Transition::new(0.5, 6, 10.0, true),
            ],
        );
        let registry = EnvRegistry::new().register("Table-v0", move |seed| {
            Ok(Box::new(DiscreteEnv::new(table.clone(), vec![1.0, 0.0, 0.0], seed)?) as Box<dyn Env>)
        });
        let mut s = Session::new(registry, SessionConfig::default());
        s.make("Table-v0", 1).unwrap();

        let d = s.dynamics(2, 1).unwrap();
        assert_eq!(d.probability, vec![0.5, 0.5]);
        assert_eq!(d.next_state, vec![5, 6]);
        assert_eq!(d.reward, vec![-1.0, 10.0]);
        assert_eq!(d.done, vec![false, true]);

        // In range without outcomes.
        let d = s.dynamics(1, 1).unwrap();
        assert!(d.probability.is_empty());
        assert!(d.next_state.is_empty());
        assert!(d.reward.is_empty());
        assert!(d.done.is_empty());

        assert!(matches!(
            s.dynamics(9, 0),
            Err(ServerError::NoTransition { state: 9, action: 0 })
        ));
        assert!(matches!(
            s.dynamics(0, 2),
            Err(ServerError::NoTransition { .. })
        ));
    }

    #[test]
    fn test_dynamics_without_table() {
        let mut s = session();
        s.make("CartPole-v1", 1).unwrap();
        assert!(matches!(
            s.dynamics(0, 0),
            Err(ServerError::NoTransitionTable(name)) if name == "CartPole-v1"
        ));
    }

    #[test]
    fn test_normalized_reward() {
        let config = SessionConfig::default().normalize_reward(true);
        let mut s = Session::new(gym_bridge_envs::registry(), config);
        s.make("GridWorld-v0", 2).unwrap();
        s.reset().unwrap();
        let r = s.step(arr1(&[2.0, 2.0]).into_dyn(), false).unwrap();
        assert_eq!(r.info.reward, arr1(&[-1.0f32, -1.0]));
        assert_ne!(r.reward.column(0), r.info.reward);
    }
}
